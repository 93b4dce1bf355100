use leaf_core::model::{Reward, RewardId, UserId, UserReward};

use super::SqliteRepository;
use super::mapping::{
    bool_to_i64, collect_rows, conn, key_id, map_reward_row, map_user_reward_row, returned_id,
    write_err,
};
use crate::repository::{NewRewardRecord, RewardRepository, StorageError};

#[async_trait::async_trait]
impl RewardRepository for SqliteRepository {
    async fn insert_reward(&self, reward: NewRewardRecord) -> Result<RewardId, StorageError> {
        let row = sqlx::query(
            r"
            INSERT INTO rewards (name, description, icon, points_cost, is_available)
            VALUES (?1, ?2, ?3, ?4, ?5)
            RETURNING id
            ",
        )
        .bind(reward.name)
        .bind(reward.description)
        .bind(reward.icon)
        .bind(i64::from(reward.points_cost))
        .bind(bool_to_i64(reward.is_available))
        .fetch_one(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(RewardId::new(returned_id(&row)?))
    }

    async fn get_reward(&self, id: RewardId) -> Result<Option<Reward>, StorageError> {
        let Some(id) = key_id(id.value()) else {
            return Ok(None);
        };
        let row = sqlx::query(
            r"
            SELECT id, name, description, icon, points_cost, is_available
            FROM rewards
            WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_reward_row).transpose()
    }

    async fn list_rewards(&self) -> Result<Vec<Reward>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, icon, points_cost, is_available
            FROM rewards
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        collect_rows(rows, map_reward_row)
    }

    async fn rewards_for_user(&self, user_id: UserId) -> Result<Vec<UserReward>, StorageError> {
        let Some(user_id) = key_id(user_id.value()) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            r"
            SELECT id, user_id, reward_id, redeemed_at, is_used
            FROM user_rewards
            WHERE user_id = ?1
            ORDER BY redeemed_at ASC, id ASC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        collect_rows(rows, map_user_reward_row)
    }
}
