use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::UserId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("username cannot be empty")]
    EmptyUsername,

    #[error("display name cannot be empty")]
    EmptyDisplayName,

    #[error("level must be at least 1")]
    InvalidLevel,

    #[error("insufficient points: balance {balance}, cost {cost}")]
    InsufficientPoints { balance: u32, cost: u32 },

    #[error("points overflow: balance {balance}, credit {credit}")]
    PointsOverflow { balance: u32, credit: u32 },
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// A learner and their leaf balance.
///
/// `total_points` is unsigned, so the balance can never go negative; the
/// only way to lower it is [`User::debit`], which refuses to overdraw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    username: String,
    display_name: String,
    level: u32,
    total_points: u32,
    experience: u32,
    created_at: DateTime<Utc>,
}

impl User {
    /// Starting level for freshly registered users.
    pub const STARTING_LEVEL: u32 = 1;

    /// Creates a freshly registered user with level 1 and an empty balance.
    ///
    /// Username and display name are trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmptyUsername` or `UserError::EmptyDisplayName`
    /// when either field is blank.
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        display_name: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let username = normalize_username(username.into())?;
        let display_name = normalize_display_name(display_name.into())?;

        Ok(Self {
            id,
            username,
            display_name,
            level: Self::STARTING_LEVEL,
            total_points: 0,
            experience: 0,
            created_at,
        })
    }

    /// Rehydrates a user loaded from storage.
    ///
    /// # Errors
    ///
    /// Returns `UserError` when the persisted username, display name, or level
    /// is invalid.
    pub fn from_persisted(
        id: UserId,
        username: String,
        display_name: String,
        level: u32,
        total_points: u32,
        experience: u32,
        created_at: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let mut user = Self::new(id, username, display_name, created_at)?;
        user.set_level(level, experience)?;
        user.total_points = total_points;
        Ok(user)
    }

    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    #[must_use]
    pub fn experience(&self) -> u32 {
        self.experience
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns true when the balance covers `cost`.
    #[must_use]
    pub fn can_afford(&self, cost: u32) -> bool {
        self.total_points >= cost
    }

    /// Adds `points` to the balance and returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns `UserError::PointsOverflow` if the balance would exceed `u32::MAX`.
    pub fn credit(&mut self, points: u32) -> Result<u32, UserError> {
        self.total_points =
            self.total_points
                .checked_add(points)
                .ok_or(UserError::PointsOverflow {
                    balance: self.total_points,
                    credit: points,
                })?;
        Ok(self.total_points)
    }

    /// Removes `cost` from the balance and returns the new balance.
    ///
    /// The balance is left untouched on failure.
    ///
    /// # Errors
    ///
    /// Returns `UserError::InsufficientPoints` if the balance is below `cost`.
    pub fn debit(&mut self, cost: u32) -> Result<u32, UserError> {
        self.total_points =
            self.total_points
                .checked_sub(cost)
                .ok_or(UserError::InsufficientPoints {
                    balance: self.total_points,
                    cost,
                })?;
        Ok(self.total_points)
    }

    /// Replaces level and experience.
    ///
    /// # Errors
    ///
    /// Returns `UserError::InvalidLevel` when `level` is zero.
    pub fn set_level(&mut self, level: u32, experience: u32) -> Result<(), UserError> {
        if level < Self::STARTING_LEVEL {
            return Err(UserError::InvalidLevel);
        }
        self.level = level;
        self.experience = experience;
        Ok(())
    }
}

/// Trims a username and rejects blank values.
///
/// # Errors
///
/// Returns `UserError::EmptyUsername` when nothing remains after trimming.
pub fn normalize_username(raw: String) -> Result<String, UserError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserError::EmptyUsername);
    }
    Ok(trimmed.to_owned())
}

fn normalize_display_name(raw: String) -> Result<String, UserError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UserError::EmptyDisplayName);
    }
    Ok(trimmed.to_owned())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn user_with(points: u32) -> User {
        User::from_persisted(
            UserId::new(1),
            "default_user".into(),
            "Leafy".into(),
            1,
            points,
            0,
            fixed_now(),
        )
        .unwrap()
    }

    #[test]
    fn new_user_starts_at_level_one_with_no_points() {
        let user = User::new(UserId::new(3), "  sprout ", "Sprout", fixed_now()).unwrap();
        assert_eq!(user.username(), "sprout");
        assert_eq!(user.level(), 1);
        assert_eq!(user.total_points(), 0);
        assert_eq!(user.experience(), 0);
    }

    #[test]
    fn blank_names_are_rejected() {
        assert_eq!(
            User::new(UserId::new(1), "   ", "x", fixed_now()).unwrap_err(),
            UserError::EmptyUsername
        );
        assert_eq!(
            User::new(UserId::new(1), "x", "", fixed_now()).unwrap_err(),
            UserError::EmptyDisplayName
        );
    }

    #[test]
    fn debit_to_exactly_zero_is_allowed() {
        let mut user = user_with(800);
        assert_eq!(user.debit(800).unwrap(), 0);
        assert_eq!(user.total_points(), 0);
    }

    #[test]
    fn overdraw_leaves_balance_untouched() {
        let mut user = user_with(50);
        let err = user.debit(100).unwrap_err();
        assert_eq!(
            err,
            UserError::InsufficientPoints {
                balance: 50,
                cost: 100
            }
        );
        assert_eq!(user.total_points(), 50);
    }

    #[test]
    fn credit_rejects_overflow() {
        let mut user = user_with(u32::MAX - 1);
        assert!(matches!(
            user.credit(5),
            Err(UserError::PointsOverflow { .. })
        ));
        assert_eq!(user.total_points(), u32::MAX - 1);
    }

    #[test]
    fn zero_level_is_invalid() {
        let mut user = user_with(0);
        assert_eq!(user.set_level(0, 10), Err(UserError::InvalidLevel));
        user.set_level(5, 750).unwrap();
        assert_eq!((user.level(), user.experience()), (5, 750));
    }

    #[test]
    fn serializes_in_camel_case() {
        let value = serde_json::to_value(user_with(150)).unwrap();
        assert_eq!(value["totalPoints"], 150);
        assert_eq!(value["displayName"], "Leafy");
    }
}
