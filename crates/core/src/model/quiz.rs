use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::{CategoryId, QuestionId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("category name cannot be empty")]
    EmptyCategoryName,

    #[error("required level must be at least 1")]
    InvalidRequiredLevel,

    #[error("question text cannot be empty")]
    EmptyQuestion,

    #[error("question needs at least two options, got {0}")]
    TooFewOptions(usize),

    #[error("correct answer index {index} is out of range for {len} options")]
    CorrectAnswerOutOfRange { index: usize, len: usize },

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

/// Difficulty tier of a quiz category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Beginner => "beginner",
            Difficulty::Intermediate => "intermediate",
            Difficulty::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(QuizError::UnknownDifficulty(other.to_owned())),
        }
    }
}

//
// ─── CATEGORY ──────────────────────────────────────────────────────────────────
//

/// Thematic grouping of questions with an unlock level.
///
/// `icon` and `color` are opaque presentation tags owned by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizCategory {
    pub id: CategoryId,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub difficulty: Difficulty,
    pub is_locked: bool,
    pub required_level: u32,
}

impl QuizCategory {
    /// Validates a category definition.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptyCategoryName` for a blank name and
    /// `QuizError::InvalidRequiredLevel` for a zero unlock level.
    pub fn validate(self) -> Result<Self, QuizError> {
        if self.name.trim().is_empty() {
            return Err(QuizError::EmptyCategoryName);
        }
        if self.required_level == 0 {
            return Err(QuizError::InvalidRequiredLevel);
        }
        Ok(self)
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Multiple-choice question with a single correct option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    id: QuestionId,
    category_id: CategoryId,
    question: String,
    options: Vec<String>,
    correct_answer: usize,
    explanation: String,
    points: u32,
}

impl QuizQuestion {
    /// Points paid for a correct answer when none is specified.
    pub const DEFAULT_POINTS: u32 = 10;

    /// Creates a validated question.
    ///
    /// # Errors
    ///
    /// Returns `QuizError` when the prompt is blank, fewer than two options
    /// are given, or `correct_answer` does not index into `options`.
    pub fn new(
        id: QuestionId,
        category_id: CategoryId,
        question: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
        explanation: impl Into<String>,
        points: u32,
    ) -> Result<Self, QuizError> {
        let question = question.into();
        if question.trim().is_empty() {
            return Err(QuizError::EmptyQuestion);
        }
        if options.len() < 2 {
            return Err(QuizError::TooFewOptions(options.len()));
        }
        if correct_answer >= options.len() {
            return Err(QuizError::CorrectAnswerOutOfRange {
                index: correct_answer,
                len: options.len(),
            });
        }

        Ok(Self {
            id,
            category_id,
            question,
            options,
            correct_answer,
            explanation: explanation.into(),
            points,
        })
    }

    #[must_use]
    pub fn id(&self) -> QuestionId {
        self.id
    }

    #[must_use]
    pub fn category_id(&self) -> CategoryId {
        self.category_id
    }

    #[must_use]
    pub fn question(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    /// Checks a submitted option index.
    ///
    /// Negative and out-of-range selections are wrong answers, not errors.
    #[must_use]
    pub fn is_correct(&self, selected: i64) -> bool {
        usize::try_from(selected).is_ok_and(|index| index == self.correct_answer)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn water_question() -> QuizQuestion {
        QuizQuestion::new(
            QuestionId::new(4),
            CategoryId::new(1),
            "How many litres of water does a person need per day?",
            vec!["20".into(), "50".into(), "100".into(), "200".into()],
            2,
            "Modern daily needs are around 100 litres.",
            QuizQuestion::DEFAULT_POINTS,
        )
        .unwrap()
    }

    #[test]
    fn only_the_matching_index_is_correct() {
        let q = water_question();
        assert!(q.is_correct(2));
        assert!(!q.is_correct(0));
        assert!(!q.is_correct(3));
    }

    #[test]
    fn out_of_range_selection_is_just_wrong() {
        let q = water_question();
        assert!(!q.is_correct(-1));
        assert!(!q.is_correct(99));
        assert!(!q.is_correct(i64::MAX));
    }

    #[test]
    fn correct_answer_must_index_options() {
        let err = QuizQuestion::new(
            QuestionId::new(1),
            CategoryId::new(1),
            "Q",
            vec!["a".into(), "b".into()],
            2,
            "",
            10,
        )
        .unwrap_err();
        assert_eq!(err, QuizError::CorrectAnswerOutOfRange { index: 2, len: 2 });
    }

    #[test]
    fn single_option_questions_are_rejected() {
        let err = QuizQuestion::new(
            QuestionId::new(1),
            CategoryId::new(1),
            "Q",
            vec!["only".into()],
            0,
            "",
            10,
        )
        .unwrap_err();
        assert_eq!(err, QuizError::TooFewOptions(1));
    }

    #[test]
    fn difficulty_parses_storage_strings() {
        assert_eq!("advanced".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert!("expert".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Intermediate.to_string(), "intermediate");
    }

    #[test]
    fn category_requires_a_name_and_level() {
        let category = QuizCategory {
            id: CategoryId::new(1),
            name: " ".into(),
            description: String::new(),
            icon: "droplets".into(),
            color: "blue".into(),
            difficulty: Difficulty::Beginner,
            is_locked: false,
            required_level: 1,
        };
        assert_eq!(
            category.clone().validate().unwrap_err(),
            QuizError::EmptyCategoryName
        );
        let zero_level = QuizCategory {
            name: "Water".into(),
            required_level: 0,
            ..category
        };
        assert_eq!(
            zero_level.validate().unwrap_err(),
            QuizError::InvalidRequiredLevel
        );
    }

    #[test]
    fn question_serializes_for_clients() {
        let value = serde_json::to_value(water_question()).unwrap();
        assert_eq!(value["categoryId"], 1);
        assert_eq!(value["correctAnswer"], 2);
        assert_eq!(value["options"].as_array().unwrap().len(), 4);
    }
}
