use std::sync::Arc;

use rand::rng;
use rand::seq::SliceRandom;

use leaf_core::model::{
    CategoryId, DailyTip, QuizCategory, QuizQuestion, Reward, UserAchievement, UserId,
    UserProgress, UserReward,
};
use storage::repository::{
    AchievementRepository, ProgressRepository, QuizRepository, RewardRepository, Storage,
    TipRepository, UserRepository,
};

use crate::Clock;
use crate::error::QueryError;

/// Read-only views over the catalog and a user's ledger history.
#[derive(Clone)]
pub struct QueryService {
    clock: Clock,
    users: Arc<dyn UserRepository>,
    quiz: Arc<dyn QuizRepository>,
    progress: Arc<dyn ProgressRepository>,
    rewards: Arc<dyn RewardRepository>,
    tips: Arc<dyn TipRepository>,
    achievements: Arc<dyn AchievementRepository>,
}

impl QueryService {
    #[must_use]
    pub fn new(clock: Clock, storage: &Storage) -> Self {
        Self {
            clock,
            users: Arc::clone(&storage.users),
            quiz: Arc::clone(&storage.quiz),
            progress: Arc::clone(&storage.progress),
            rewards: Arc::clone(&storage.rewards),
            tips: Arc::clone(&storage.tips),
            achievements: Arc::clone(&storage.achievements),
        }
    }

    /// # Errors
    ///
    /// Returns `QueryError::Storage` if repository access fails.
    pub async fn categories(&self) -> Result<Vec<QuizCategory>, QueryError> {
        Ok(self.quiz.list_categories().await?)
    }

    /// Questions of a category ordered by ID; empty for unknown categories.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Storage` if repository access fails.
    pub async fn questions(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<QuizQuestion>, QueryError> {
        Ok(self.quiz.questions_for_category(category_id).await?)
    }

    /// Up to `limit` distinct questions of a category in random order.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Storage` if repository access fails.
    pub async fn random_questions(
        &self,
        category_id: CategoryId,
        limit: usize,
    ) -> Result<Vec<QuizQuestion>, QueryError> {
        let mut questions = self.quiz.questions_for_category(category_id).await?;
        let mut rng = rng();
        questions.as_mut_slice().shuffle(&mut rng);
        questions.truncate(limit);
        Ok(questions)
    }

    /// # Errors
    ///
    /// Returns `QueryError::UserNotFound` for unknown users and
    /// `QueryError::Storage` if repository access fails.
    pub async fn user_progress(&self, user_id: UserId) -> Result<Vec<UserProgress>, QueryError> {
        self.ensure_user(user_id).await?;
        Ok(self.progress.progress_for_user(user_id).await?)
    }

    /// Catalog entries that can currently be redeemed.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Storage` if repository access fails.
    pub async fn available_rewards(&self) -> Result<Vec<Reward>, QueryError> {
        let mut rewards = self.rewards.list_rewards().await?;
        rewards.retain(Reward::is_available);
        Ok(rewards)
    }

    /// Redemption history, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::UserNotFound` for unknown users and
    /// `QueryError::Storage` if repository access fails.
    pub async fn user_rewards(&self, user_id: UserId) -> Result<Vec<UserReward>, QueryError> {
        self.ensure_user(user_id).await?;
        Ok(self.rewards.rewards_for_user(user_id).await?)
    }

    /// Tip for the clock's current UTC day, falling back to the latest earlier tip.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::Storage` if repository access fails.
    pub async fn todays_tip(&self) -> Result<Option<DailyTip>, QueryError> {
        Ok(self.tips.tip_for_day(self.clock.today()).await?)
    }

    /// # Errors
    ///
    /// Returns `QueryError::UserNotFound` for unknown users and
    /// `QueryError::Storage` if repository access fails.
    pub async fn achievements(&self, user_id: UserId) -> Result<Vec<UserAchievement>, QueryError> {
        self.ensure_user(user_id).await?;
        Ok(self.achievements.achievements_for_user(user_id).await?)
    }

    async fn ensure_user(&self, user_id: UserId) -> Result<(), QueryError> {
        match self.users.get_user(user_id).await? {
            Some(_) => Ok(()),
            None => Err(QueryError::UserNotFound(user_id)),
        }
    }
}
