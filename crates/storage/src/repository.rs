use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use leaf_core::ledger::GradedAnswer;
use leaf_core::model::{
    CategoryId, DailyTip, Difficulty, ProgressId, QuestionId, QuizCategory, QuizQuestion, Reward,
    RewardId, TipId, User, UserAchievement, UserId, UserProgress, UserReward,
};
use thiserror::Error;

use crate::memory::InMemoryRepository;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("insufficient points: balance {balance}, cost {cost}")]
    InsufficientPoints { balance: u32, cost: u32 },

    #[error("points overflow")]
    PointsOverflow,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

//
// ─── RECORDS ───────────────────────────────────────────────────────────────────
//

/// Insert shape for a user; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub username: String,
    pub display_name: String,
    pub level: u32,
    pub total_points: u32,
    pub experience: u32,
    pub created_at: DateTime<Utc>,
}

impl NewUserRecord {
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            username: user.username().to_owned(),
            display_name: user.display_name().to_owned(),
            level: user.level(),
            total_points: user.total_points(),
            experience: user.experience(),
            created_at: user.created_at(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewCategoryRecord {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: String,
    pub difficulty: Difficulty,
    pub is_locked: bool,
    pub required_level: u32,
}

impl NewCategoryRecord {
    #[must_use]
    pub fn from_category(category: &QuizCategory) -> Self {
        Self {
            name: category.name.clone(),
            description: category.description.clone(),
            icon: category.icon.clone(),
            color: category.color.clone(),
            difficulty: category.difficulty,
            is_locked: category.is_locked,
            required_level: category.required_level,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewQuestionRecord {
    pub category_id: CategoryId,
    pub question: String,
    pub options: Vec<String>,
    pub correct_answer: usize,
    pub explanation: String,
    pub points: u32,
}

impl NewQuestionRecord {
    #[must_use]
    pub fn from_question(question: &QuizQuestion) -> Self {
        Self {
            category_id: question.category_id(),
            question: question.question().to_owned(),
            options: question.options().to_vec(),
            correct_answer: question.correct_answer(),
            explanation: question.explanation().to_owned(),
            points: question.points(),
        }
    }
}

/// Pre-existing progress imported directly (seed data, migrations).
#[derive(Debug, Clone)]
pub struct NewProgressRecord {
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub completed_questions: u32,
    pub total_questions: u32,
    pub correct_answers: u32,
    pub last_completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct NewRewardRecord {
    pub name: String,
    pub description: String,
    pub icon: String,
    pub points_cost: u32,
    pub is_available: bool,
}

impl NewRewardRecord {
    #[must_use]
    pub fn from_reward(reward: &Reward) -> Self {
        Self {
            name: reward.name().to_owned(),
            description: reward.description().to_owned(),
            icon: reward.icon().to_owned(),
            points_cost: reward.points_cost(),
            is_available: reward.is_available(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTipRecord {
    pub title: String,
    pub content: String,
    pub icon: String,
    pub date: DateTime<Utc>,
}

//
// ─── LEDGER COMMITS ────────────────────────────────────────────────────────────
//

/// A graded answer ready to be committed for one user.
#[derive(Debug, Clone, Copy)]
pub struct AnswerEntry {
    pub user_id: UserId,
    pub graded: GradedAnswer,
    pub answered_at: DateTime<Utc>,
}

/// State after an answer commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedAnswer {
    pub progress: UserProgress,
    pub total_points: u32,
}

/// A redemption ready to be committed; the store debits the reward's own cost.
#[derive(Debug, Clone, Copy)]
pub struct RedemptionEntry {
    pub user_id: UserId,
    pub reward_id: RewardId,
    pub redeemed_at: DateTime<Utc>,
}

/// State after a redemption commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedRedemption {
    pub user_reward: UserReward,
    /// Cost read from the reward row inside the commit.
    pub cost: u32,
    pub total_points: u32,
}

//
// ─── CONTRACTS ─────────────────────────────────────────────────────────────────
//

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the username is taken.
    async fn insert_new_user(&self, user: NewUserRecord) -> Result<User, StorageError>;

    /// Fetch a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError>;

    /// Fetch a user by exact username.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError>;

    /// Replace level and experience.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user is missing.
    async fn update_level(
        &self,
        id: UserId,
        level: u32,
        experience: u32,
    ) -> Result<User, StorageError>;
}

#[async_trait]
pub trait QuizRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the category cannot be stored.
    async fn insert_category(&self, category: NewCategoryRecord)
    -> Result<CategoryId, StorageError>;

    /// All categories ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_categories(&self) -> Result<Vec<QuizCategory>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the category does not exist.
    async fn insert_question(&self, question: NewQuestionRecord)
    -> Result<QuestionId, StorageError>;

    /// Primary-key lookup of a question.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_question(&self, id: QuestionId) -> Result<Option<QuizQuestion>, StorageError>;

    /// Questions of one category ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn questions_for_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<QuizQuestion>, StorageError>;
}

#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Import a progress row.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if the (user, category) row exists and
    /// `StorageError::NotFound` if the user is missing.
    async fn insert_progress(&self, progress: NewProgressRecord)
    -> Result<ProgressId, StorageError>;

    /// All progress rows of a user ordered by category.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn progress_for_user(&self, user_id: UserId) -> Result<Vec<UserProgress>, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn progress_for_category(
        &self,
        user_id: UserId,
        category_id: CategoryId,
    ) -> Result<Option<UserProgress>, StorageError>;
}

#[async_trait]
pub trait RewardRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the reward cannot be stored.
    async fn insert_reward(&self, reward: NewRewardRecord) -> Result<RewardId, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn get_reward(&self, id: RewardId) -> Result<Option<Reward>, StorageError>;

    /// The whole catalog, available or not, ordered by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_rewards(&self) -> Result<Vec<Reward>, StorageError>;

    /// Redemptions of a user, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn rewards_for_user(&self, user_id: UserId) -> Result<Vec<UserReward>, StorageError>;
}

#[async_trait]
pub trait TipRepository: Send + Sync {
    /// # Errors
    ///
    /// Returns `StorageError` if the tip cannot be stored.
    async fn insert_tip(&self, tip: NewTipRecord) -> Result<TipId, StorageError>;

    /// The tip for `day`, or the latest one dated before it.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn tip_for_day(&self, day: NaiveDate) -> Result<Option<DailyTip>, StorageError>;
}

#[async_trait]
pub trait AchievementRepository: Send + Sync {
    /// Record an unlock; unlocking the same slug twice returns the first record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user is missing.
    async fn unlock_achievement(
        &self,
        user_id: UserId,
        achievement_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> Result<UserAchievement, StorageError>;

    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn achievements_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UserAchievement>, StorageError>;
}

/// Atomic balance-affecting commits.
///
/// Each call either applies every write it describes or none of them.
#[async_trait]
pub trait LedgerPersistence: Send + Sync {
    /// Upsert the (user, category) progress row and credit any awarded points.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user is missing and
    /// `StorageError::PointsOverflow` if the credit does not fit.
    async fn apply_answer(&self, entry: AnswerEntry) -> Result<AppliedAnswer, StorageError>;

    /// Debit the reward's current `points_cost` and record the redemption.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the user or an available reward is
    /// missing and `StorageError::InsufficientPoints` if the balance at commit
    /// time does not cover the cost.
    async fn redeem(&self, entry: RedemptionEntry) -> Result<AppliedRedemption, StorageError>;
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub quiz: Arc<dyn QuizRepository>,
    pub progress: Arc<dyn ProgressRepository>,
    pub rewards: Arc<dyn RewardRepository>,
    pub tips: Arc<dyn TipRepository>,
    pub achievements: Arc<dyn AchievementRepository>,
    pub ledger: Arc<dyn LedgerPersistence>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self::from_repository(InMemoryRepository::new())
    }

    /// Wire every repository slot to one backend.
    pub fn from_repository<R>(repo: R) -> Self
    where
        R: UserRepository
            + QuizRepository
            + ProgressRepository
            + RewardRepository
            + TipRepository
            + AchievementRepository
            + LedgerPersistence
            + Clone
            + 'static,
    {
        Self {
            users: Arc::new(repo.clone()),
            quiz: Arc::new(repo.clone()),
            progress: Arc::new(repo.clone()),
            rewards: Arc::new(repo.clone()),
            tips: Arc::new(repo.clone()),
            achievements: Arc::new(repo.clone()),
            ledger: Arc::new(repo),
        }
    }
}
