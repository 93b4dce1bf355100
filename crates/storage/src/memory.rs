//! In-process store for tests, demos, and `--in-memory` runs.
//!
//! All tables live behind one mutex, so every method (including the ledger
//! commits) observes and writes a single consistent snapshot.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use leaf_core::model::{
    CategoryId, DailyTip, ProgressId, QuestionId, QuizCategory, QuizQuestion, Reward, RewardId,
    TipId, User, UserAchievement, UserAchievementId, UserError, UserId, UserProgress, UserReward,
    UserRewardId, pick_tip_for_day,
};

use crate::repository::{
    AchievementRepository, AnswerEntry, AppliedAnswer, AppliedRedemption, LedgerPersistence,
    NewCategoryRecord, NewProgressRecord, NewQuestionRecord, NewRewardRecord, NewTipRecord,
    NewUserRecord, ProgressRepository, QuizRepository, RedemptionEntry, RewardRepository,
    StorageError, TipRepository, UserRepository,
};

fn invalid<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

#[derive(Default)]
struct MemoryState {
    next_id: u64,
    users: BTreeMap<UserId, User>,
    categories: BTreeMap<CategoryId, QuizCategory>,
    questions: BTreeMap<QuestionId, QuizQuestion>,
    progress: BTreeMap<(UserId, CategoryId), UserProgress>,
    rewards: BTreeMap<RewardId, Reward>,
    user_rewards: BTreeMap<UserRewardId, UserReward>,
    tips: BTreeMap<TipId, DailyTip>,
    achievements: BTreeMap<UserAchievementId, UserAchievement>,
}

impl MemoryState {
    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, StorageError> {
        self.state
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_new_user(&self, user: NewUserRecord) -> Result<User, StorageError> {
        let mut guard = self.lock()?;
        if guard
            .users
            .values()
            .any(|existing| existing.username() == user.username)
        {
            return Err(StorageError::Conflict);
        }
        let id = UserId::new(guard.allocate_id());
        let created = User::from_persisted(
            id,
            user.username,
            user.display_name,
            user.level,
            user.total_points,
            user.experience,
            user.created_at,
        )
        .map_err(invalid)?;
        guard.users.insert(id, created.clone());
        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.users.get(&id).cloned())
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .users
            .values()
            .find(|user| user.username() == username)
            .cloned())
    }

    async fn update_level(
        &self,
        id: UserId,
        level: u32,
        experience: u32,
    ) -> Result<User, StorageError> {
        let mut guard = self.lock()?;
        let user = guard.users.get_mut(&id).ok_or(StorageError::NotFound)?;
        user.set_level(level, experience).map_err(invalid)?;
        Ok(user.clone())
    }
}

#[async_trait]
impl QuizRepository for InMemoryRepository {
    async fn insert_category(
        &self,
        category: NewCategoryRecord,
    ) -> Result<CategoryId, StorageError> {
        let mut guard = self.lock()?;
        let id = CategoryId::new(guard.allocate_id());
        let stored = QuizCategory {
            id,
            name: category.name,
            description: category.description,
            icon: category.icon,
            color: category.color,
            difficulty: category.difficulty,
            is_locked: category.is_locked,
            required_level: category.required_level,
        }
        .validate()
        .map_err(invalid)?;
        guard.categories.insert(id, stored);
        Ok(id)
    }

    async fn list_categories(&self) -> Result<Vec<QuizCategory>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.categories.values().cloned().collect())
    }

    async fn insert_question(
        &self,
        question: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.categories.contains_key(&question.category_id) {
            return Err(StorageError::NotFound);
        }
        let id = QuestionId::new(guard.allocate_id());
        let stored = QuizQuestion::new(
            id,
            question.category_id,
            question.question,
            question.options,
            question.correct_answer,
            question.explanation,
            question.points,
        )
        .map_err(invalid)?;
        guard.questions.insert(id, stored);
        Ok(id)
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<QuizQuestion>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.questions.get(&id).cloned())
    }

    async fn questions_for_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<QuizQuestion>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .questions
            .values()
            .filter(|q| q.category_id() == category_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProgressRepository for InMemoryRepository {
    async fn insert_progress(
        &self,
        progress: NewProgressRecord,
    ) -> Result<ProgressId, StorageError> {
        let mut guard = self.lock()?;
        if !guard.users.contains_key(&progress.user_id) {
            return Err(StorageError::NotFound);
        }
        let key = (progress.user_id, progress.category_id);
        if guard.progress.contains_key(&key) {
            return Err(StorageError::Conflict);
        }
        let id = ProgressId::new(guard.allocate_id());
        guard.progress.insert(
            key,
            UserProgress {
                id,
                user_id: progress.user_id,
                category_id: progress.category_id,
                completed_questions: progress.completed_questions,
                total_questions: progress.total_questions,
                correct_answers: progress.correct_answers,
                last_completed_at: progress.last_completed_at,
            },
        );
        Ok(id)
    }

    async fn progress_for_user(&self, user_id: UserId) -> Result<Vec<UserProgress>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .progress
            .range((user_id, CategoryId::new(0))..=(user_id, CategoryId::new(u64::MAX)))
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn progress_for_category(
        &self,
        user_id: UserId,
        category_id: CategoryId,
    ) -> Result<Option<UserProgress>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.progress.get(&(user_id, category_id)).cloned())
    }
}

#[async_trait]
impl RewardRepository for InMemoryRepository {
    async fn insert_reward(&self, reward: NewRewardRecord) -> Result<RewardId, StorageError> {
        let mut guard = self.lock()?;
        let id = RewardId::new(guard.allocate_id());
        let stored = Reward::new(
            id,
            reward.name,
            reward.description,
            reward.icon,
            reward.points_cost,
            reward.is_available,
        )
        .map_err(invalid)?;
        guard.rewards.insert(id, stored);
        Ok(id)
    }

    async fn get_reward(&self, id: RewardId) -> Result<Option<Reward>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.rewards.get(&id).cloned())
    }

    async fn list_rewards(&self) -> Result<Vec<Reward>, StorageError> {
        let guard = self.lock()?;
        Ok(guard.rewards.values().cloned().collect())
    }

    async fn rewards_for_user(&self, user_id: UserId) -> Result<Vec<UserReward>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .user_rewards
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TipRepository for InMemoryRepository {
    async fn insert_tip(&self, tip: NewTipRecord) -> Result<TipId, StorageError> {
        let mut guard = self.lock()?;
        let id = TipId::new(guard.allocate_id());
        guard.tips.insert(
            id,
            DailyTip {
                id,
                title: tip.title,
                content: tip.content,
                icon: tip.icon,
                date: tip.date,
            },
        );
        Ok(id)
    }

    async fn tip_for_day(&self, day: NaiveDate) -> Result<Option<DailyTip>, StorageError> {
        let guard = self.lock()?;
        let tips: Vec<DailyTip> = guard.tips.values().cloned().collect();
        Ok(pick_tip_for_day(&tips, day).cloned())
    }
}

#[async_trait]
impl AchievementRepository for InMemoryRepository {
    async fn unlock_achievement(
        &self,
        user_id: UserId,
        achievement_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> Result<UserAchievement, StorageError> {
        let mut guard = self.lock()?;
        if !guard.users.contains_key(&user_id) {
            return Err(StorageError::NotFound);
        }
        if let Some(existing) = guard
            .achievements
            .values()
            .find(|a| a.user_id == user_id && a.achievement_id == achievement_id)
        {
            return Ok(existing.clone());
        }
        let id = UserAchievementId::new(guard.allocate_id());
        let unlocked = UserAchievement {
            id,
            user_id,
            achievement_id: achievement_id.to_owned(),
            unlocked_at,
        };
        guard.achievements.insert(id, unlocked.clone());
        Ok(unlocked)
    }

    async fn achievements_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UserAchievement>, StorageError> {
        let guard = self.lock()?;
        Ok(guard
            .achievements
            .values()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LedgerPersistence for InMemoryRepository {
    async fn apply_answer(&self, entry: AnswerEntry) -> Result<AppliedAnswer, StorageError> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        // Stage the credit on a copy so a failure leaves nothing applied.
        let mut user = state
            .users
            .get(&entry.user_id)
            .cloned()
            .ok_or(StorageError::NotFound)?;
        user.credit(entry.graded.points_awarded)
            .map_err(|_| StorageError::PointsOverflow)?;

        let key = (entry.user_id, entry.graded.category_id);
        let mut progress = match state.progress.get(&key) {
            Some(existing) => existing.clone(),
            None => UserProgress::first_attempt(
                ProgressId::new(state.allocate_id()),
                entry.user_id,
                entry.graded.category_id,
            ),
        };
        progress.record_answer(entry.graded.correct, entry.answered_at);

        let total_points = user.total_points();
        state.progress.insert(key, progress.clone());
        state.users.insert(entry.user_id, user);

        Ok(AppliedAnswer {
            progress,
            total_points,
        })
    }

    async fn redeem(&self, entry: RedemptionEntry) -> Result<AppliedRedemption, StorageError> {
        let mut guard = self.lock()?;
        let state = &mut *guard;

        let mut user = state
            .users
            .get(&entry.user_id)
            .cloned()
            .ok_or(StorageError::NotFound)?;
        let cost = match state.rewards.get(&entry.reward_id) {
            Some(reward) if reward.is_available() => reward.points_cost(),
            _ => return Err(StorageError::NotFound),
        };
        user.debit(cost).map_err(|err| match err {
            UserError::InsufficientPoints { balance, cost } => {
                StorageError::InsufficientPoints { balance, cost }
            }
            other => invalid(other),
        })?;

        let id = UserRewardId::new(state.allocate_id());
        let user_reward = UserReward::redeemed(id, entry.user_id, entry.reward_id, entry.redeemed_at);
        let total_points = user.total_points();
        state.user_rewards.insert(id, user_reward.clone());
        state.users.insert(entry.user_id, user);

        Ok(AppliedRedemption {
            user_reward,
            cost,
            total_points,
        })
    }
}
