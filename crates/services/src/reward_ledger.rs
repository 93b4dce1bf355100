use std::sync::Arc;

use tracing::{info, warn};

use leaf_core::ledger::{RedemptionError, check_redemption};
use leaf_core::model::{RewardId, UserId, UserReward};
use storage::repository::{
    LedgerPersistence, RedemptionEntry, RewardRepository, StorageError, UserRepository,
};

use crate::Clock;
use crate::error::LedgerError;
use crate::locks::UserLocks;

/// Exchanges points for catalog rewards.
#[derive(Clone)]
pub struct RewardLedger {
    clock: Clock,
    users: Arc<dyn UserRepository>,
    rewards: Arc<dyn RewardRepository>,
    ledger: Arc<dyn LedgerPersistence>,
    locks: UserLocks,
}

impl RewardLedger {
    #[must_use]
    pub fn new(
        clock: Clock,
        users: Arc<dyn UserRepository>,
        rewards: Arc<dyn RewardRepository>,
        ledger: Arc<dyn LedgerPersistence>,
        locks: UserLocks,
    ) -> Self {
        Self {
            clock,
            users,
            rewards,
            ledger,
            locks,
        }
    }

    /// Debit the reward's cost from the user and record the redemption.
    ///
    /// The affordability check and the debit both run under the user's lock,
    /// and the store re-checks the balance inside its own commit.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::UserNotFound`, `LedgerError::RewardNotFound` for
    /// missing or withdrawn rewards, `LedgerError::InsufficientFunds` when the
    /// balance is below the cost, and `LedgerError::Storage` on backend
    /// failures.
    pub async fn redeem(
        &self,
        user_id: UserId,
        reward_id: RewardId,
    ) -> Result<UserReward, LedgerError> {
        let _guard = self.locks.lock(user_id).await;

        let user = self
            .users
            .get_user(user_id)
            .await?
            .ok_or(LedgerError::UserNotFound(user_id))?;
        let reward = self
            .rewards
            .get_reward(reward_id)
            .await?
            .ok_or(LedgerError::RewardNotFound(reward_id))?;

        if let Err(err) = check_redemption(&user, &reward) {
            warn!(%user_id, %reward_id, error = %err, "redemption refused");
            return Err(match err {
                RedemptionError::InsufficientPoints { balance, cost } => {
                    LedgerError::InsufficientFunds { balance, cost }
                }
                _ => LedgerError::RewardNotFound(reward_id),
            });
        }

        let applied = self
            .ledger
            .redeem(RedemptionEntry {
                user_id,
                reward_id,
                redeemed_at: self.clock.now(),
            })
            .await
            .map_err(|err| match err {
                StorageError::InsufficientPoints { balance, cost } => {
                    LedgerError::InsufficientFunds { balance, cost }
                }
                StorageError::NotFound => LedgerError::RewardNotFound(reward_id),
                other => LedgerError::Storage(other),
            })?;

        info!(
            %user_id,
            %reward_id,
            cost = applied.cost,
            balance = applied.total_points,
            "reward redeemed"
        );
        Ok(applied.user_reward)
    }
}
