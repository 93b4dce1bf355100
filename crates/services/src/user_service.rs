use std::sync::Arc;

use tracing::info;

use leaf_core::model::{User, UserAchievement, UserId, normalize_achievement_id};
use storage::repository::{AchievementRepository, NewUserRecord, StorageError, UserRepository};

use crate::Clock;
use crate::error::UserServiceError;

/// Registration, lookup and level bookkeeping for users.
#[derive(Clone)]
pub struct UserService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
    achievements: Arc<dyn AchievementRepository>,
}

impl UserService {
    #[must_use]
    pub fn new(
        clock: Clock,
        users: Arc<dyn UserRepository>,
        achievements: Arc<dyn AchievementRepository>,
    ) -> Self {
        Self {
            clock,
            users,
            achievements,
        }
    }

    /// Register a user at level 1 with an empty balance.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::User` for blank names,
    /// `UserServiceError::UsernameTaken` when the username exists, and
    /// `UserServiceError::Storage` on backend failures.
    pub async fn register(
        &self,
        username: String,
        display_name: String,
    ) -> Result<User, UserServiceError> {
        let draft = User::new(UserId::new(0), username, display_name, self.clock.now())?;
        let user = self
            .users
            .insert_new_user(NewUserRecord::from_user(&draft))
            .await
            .map_err(|err| match err {
                StorageError::Conflict => UserServiceError::UsernameTaken,
                other => UserServiceError::Storage(other),
            })?;
        info!(user_id = %user.id(), username = user.username(), "user registered");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `UserServiceError::NotFound` if the user does not exist.
    pub async fn get(&self, user_id: UserId) -> Result<User, UserServiceError> {
        self.users
            .get_user(user_id)
            .await?
            .ok_or(UserServiceError::NotFound(user_id))
    }

    /// # Errors
    ///
    /// Returns `UserServiceError::UsernameNotFound` if nobody has that username.
    pub async fn get_by_username(&self, username: &str) -> Result<User, UserServiceError> {
        let username = username.trim();
        self.users
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| UserServiceError::UsernameNotFound(username.to_owned()))
    }

    /// Replace a user's level and experience.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::User` if `level` is zero and
    /// `UserServiceError::NotFound` if the user does not exist.
    pub async fn update_level(
        &self,
        user_id: UserId,
        level: u32,
        experience: u32,
    ) -> Result<User, UserServiceError> {
        let mut user = self.get(user_id).await?;
        user.set_level(level, experience)?;
        let updated = self
            .users
            .update_level(user_id, user.level(), user.experience())
            .await
            .map_err(|err| match err {
                StorageError::NotFound => UserServiceError::NotFound(user_id),
                other => UserServiceError::Storage(other),
            })?;
        info!(%user_id, level, experience, "level updated");
        Ok(updated)
    }

    /// Record an achievement unlock; repeats return the original record.
    ///
    /// # Errors
    ///
    /// Returns `UserServiceError::Achievement` for a blank id and
    /// `UserServiceError::NotFound` if the user does not exist.
    pub async fn unlock_achievement(
        &self,
        user_id: UserId,
        achievement_id: &str,
    ) -> Result<UserAchievement, UserServiceError> {
        let achievement_id = normalize_achievement_id(achievement_id)?;
        self.achievements
            .unlock_achievement(user_id, &achievement_id, self.clock.now())
            .await
            .map_err(|err| match err {
                StorageError::NotFound => UserServiceError::NotFound(user_id),
                other => UserServiceError::Storage(other),
            })
    }
}
