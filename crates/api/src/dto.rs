//! Request and response payloads that are not plain domain records.

use serde::{Deserialize, Serialize};

use leaf_core::model::{QuestionId, RewardId, UserProgress};
use services::AnswerResult;

/// Questions served when the client sends no limit (or zero).
pub const DEFAULT_QUESTION_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerRequest {
    pub question_id: QuestionId,
    /// Index of the chosen option; anything out of range is graded wrong.
    pub selected_answer: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResponse {
    pub correct: bool,
    pub explanation: String,
    pub points: u32,
    pub progress: UserProgress,
    pub total_points: u32,
}

impl From<AnswerResult> for AnswerResponse {
    fn from(result: AnswerResult) -> Self {
        Self {
            correct: result.correct,
            explanation: result.explanation,
            points: result.points_awarded,
            progress: result.progress,
            total_points: result.total_points,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub reward_id: RewardId,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct QuestionsQuery {
    pub limit: Option<usize>,
}

impl QuestionsQuery {
    #[must_use]
    pub fn effective_limit(self) -> usize {
        match self.limit {
            None | Some(0) => DEFAULT_QUESTION_LIMIT,
            Some(n) => n,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_defaults_to_five() {
        assert_eq!(QuestionsQuery { limit: None }.effective_limit(), 5);
        assert_eq!(QuestionsQuery { limit: Some(0) }.effective_limit(), 5);
        assert_eq!(QuestionsQuery { limit: Some(2) }.effective_limit(), 2);
    }

    #[test]
    fn answer_request_reads_camel_case() {
        let req: AnswerRequest =
            serde_json::from_str(r#"{"questionId": 4, "selectedAnswer": -1}"#).unwrap();
        assert_eq!(req.question_id, QuestionId::new(4));
        assert_eq!(req.selected_answer, -1);
    }
}
