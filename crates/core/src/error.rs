use thiserror::Error;

use crate::model::{AchievementError, QuizError, RewardError, UserError};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Quiz(#[from] QuizError),
    #[error(transparent)]
    Reward(#[from] RewardError),
    #[error(transparent)]
    Achievement(#[from] AchievementError),
}
