use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::ids::{CategoryId, ProgressId, UserId};

/// Placeholder size of a category used when a progress row is first created.
pub const DEFAULT_TOTAL_QUESTIONS: u32 = 20;

/// Per-user, per-category completion counters.
///
/// There is at most one row per `(user_id, category_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub id: ProgressId,
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub completed_questions: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub last_completed_at: Option<DateTime<Utc>>,
}

impl UserProgress {
    /// Empty row created lazily on a user's first answer in a category.
    #[must_use]
    pub fn first_attempt(id: ProgressId, user_id: UserId, category_id: CategoryId) -> Self {
        Self {
            id,
            user_id,
            category_id,
            completed_questions: 0,
            total_questions: DEFAULT_TOTAL_QUESTIONS,
            correct_answers: 0,
            last_completed_at: None,
        }
    }

    /// Counts one answered question.
    pub fn record_answer(&mut self, correct: bool, answered_at: DateTime<Utc>) {
        self.completed_questions = self.completed_questions.saturating_add(1);
        if correct {
            self.correct_answers = self.correct_answers.saturating_add(1);
        }
        self.last_completed_at = Some(answered_at);
    }

    #[must_use]
    pub fn key(&self) -> (UserId, CategoryId) {
        (self.user_id, self.category_id)
    }
}
