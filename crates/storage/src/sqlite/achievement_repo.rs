use chrono::{DateTime, Utc};
use leaf_core::model::{UserAchievement, UserId};

use super::SqliteRepository;
use super::mapping::{collect_rows, conn, key_id, map_achievement_row, ref_id, write_err};
use crate::repository::{AchievementRepository, StorageError};

#[async_trait::async_trait]
impl AchievementRepository for SqliteRepository {
    async fn unlock_achievement(
        &self,
        user_id: UserId,
        achievement_id: &str,
        unlocked_at: DateTime<Utc>,
    ) -> Result<UserAchievement, StorageError> {
        let user = ref_id(user_id.value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        sqlx::query(
            r"
            INSERT INTO user_achievements (user_id, achievement_id, unlocked_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(user_id, achievement_id) DO NOTHING
            ",
        )
        .bind(user)
        .bind(achievement_id)
        .bind(unlocked_at)
        .execute(&mut *tx)
        .await
        .map_err(write_err)?;

        let row = sqlx::query(
            r"
            SELECT id, user_id, achievement_id, unlocked_at
            FROM user_achievements
            WHERE user_id = ?1 AND achievement_id = ?2
            ",
        )
        .bind(user)
        .bind(achievement_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(conn)?;

        tx.commit().await.map_err(conn)?;

        map_achievement_row(&row)
    }

    async fn achievements_for_user(
        &self,
        user_id: UserId,
    ) -> Result<Vec<UserAchievement>, StorageError> {
        let Some(user_id) = key_id(user_id.value()) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            r"
            SELECT id, user_id, achievement_id, unlocked_at
            FROM user_achievements
            WHERE user_id = ?1
            ORDER BY unlocked_at ASC, id ASC
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        collect_rows(rows, map_achievement_row)
    }
}
