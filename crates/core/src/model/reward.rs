use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::model::ids::{RewardId, UserId, UserRewardId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RewardError {
    #[error("reward name cannot be empty")]
    EmptyName,

    #[error("reward cost must be > 0")]
    ZeroCost,
}

/// Partner reward offered in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    id: RewardId,
    name: String,
    description: String,
    icon: String,
    points_cost: u32,
    is_available: bool,
}

impl Reward {
    /// # Errors
    ///
    /// Returns `RewardError::EmptyName` for a blank name and
    /// `RewardError::ZeroCost` when `points_cost` is zero.
    pub fn new(
        id: RewardId,
        name: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
        points_cost: u32,
        is_available: bool,
    ) -> Result<Self, RewardError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RewardError::EmptyName);
        }
        if points_cost == 0 {
            return Err(RewardError::ZeroCost);
        }
        Ok(Self {
            id,
            name,
            description: description.into(),
            icon: icon.into(),
            points_cost,
            is_available,
        })
    }

    #[must_use]
    pub fn id(&self) -> RewardId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    #[must_use]
    pub fn points_cost(&self) -> u32 {
        self.points_cost
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.is_available
    }
}

/// Immutable record of a redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserReward {
    pub id: UserRewardId,
    pub user_id: UserId,
    pub reward_id: RewardId,
    pub redeemed_at: DateTime<Utc>,
    pub is_used: bool,
}

impl UserReward {
    /// A new, unused redemption.
    #[must_use]
    pub fn redeemed(
        id: UserRewardId,
        user_id: UserId,
        reward_id: RewardId,
        redeemed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            reward_id,
            redeemed_at,
            is_used: false,
        }
    }
}
