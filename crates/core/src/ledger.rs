//! Pure balance rules shared by the storage adapters and the ledger services.
//!
//! Nothing here touches storage; callers apply the results inside their own
//! atomic commit.

use thiserror::Error;

use crate::model::{CategoryId, QuestionId, QuizQuestion, Reward, RewardId, User};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RedemptionError {
    #[error("reward {0} is not available")]
    Unavailable(RewardId),

    #[error("insufficient points: balance {balance}, cost {cost}")]
    InsufficientPoints { balance: u32, cost: u32 },
}

//
// ─── ANSWERS ───────────────────────────────────────────────────────────────────
//

/// Result of grading one submission, before anything is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GradedAnswer {
    pub question_id: QuestionId,
    pub category_id: CategoryId,
    pub correct: bool,
    pub points_awarded: u32,
}

/// Grades `selected` against `question`.
///
/// A correct answer pays the question's full value every time; repeated
/// submissions are not deduplicated.
#[must_use]
pub fn grade_answer(question: &QuizQuestion, selected: i64) -> GradedAnswer {
    let correct = question.is_correct(selected);
    GradedAnswer {
        question_id: question.id(),
        category_id: question.category_id(),
        correct,
        points_awarded: if correct { question.points() } else { 0 },
    }
}

//
// ─── REDEMPTIONS ───────────────────────────────────────────────────────────────
//

/// Checks that `user` may redeem `reward` and returns the balance after the debit.
///
/// # Errors
///
/// Returns `RedemptionError::Unavailable` for withdrawn rewards and
/// `RedemptionError::InsufficientPoints` when the balance is below the cost.
pub fn check_redemption(user: &User, reward: &Reward) -> Result<u32, RedemptionError> {
    if !reward.is_available() {
        return Err(RedemptionError::Unavailable(reward.id()));
    }
    user.total_points()
        .checked_sub(reward.points_cost())
        .ok_or(RedemptionError::InsufficientPoints {
            balance: user.total_points(),
            cost: reward.points_cost(),
        })
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
