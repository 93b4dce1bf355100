use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{UserAchievementId, UserId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AchievementError {
    #[error("achievement id cannot be empty")]
    EmptyId,
}

/// Achievement a user has unlocked, keyed by a client-defined slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAchievement {
    pub id: UserAchievementId,
    pub user_id: UserId,
    pub achievement_id: String,
    pub unlocked_at: DateTime<Utc>,
}

/// Trims an achievement slug and rejects blank values.
///
/// # Errors
///
/// Returns `AchievementError::EmptyId` when nothing remains after trimming.
pub fn normalize_achievement_id(raw: &str) -> Result<String, AchievementError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AchievementError::EmptyId);
    }
    Ok(trimmed.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugs_are_trimmed() {
        assert_eq!(normalize_achievement_id(" first-quiz ").unwrap(), "first-quiz");
        assert_eq!(normalize_achievement_id("  "), Err(AchievementError::EmptyId));
    }
}
