use leaf_core::model::{User, UserId};

use super::SqliteRepository;
use super::mapping::{conn, key_id, map_user_row, ref_id, write_err};
use crate::repository::{NewUserRecord, StorageError, UserRepository};

const USER_COLUMNS: &str =
    "id, username, display_name, level, total_points, experience, created_at";

#[async_trait::async_trait]
impl UserRepository for SqliteRepository {
    async fn insert_new_user(&self, user: NewUserRecord) -> Result<User, StorageError> {
        let row = sqlx::query(&format!(
            r"
            INSERT INTO users (username, display_name, level, total_points, experience, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(user.username)
        .bind(user.display_name)
        .bind(i64::from(user.level))
        .bind(i64::from(user.total_points))
        .bind(i64::from(user.experience))
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(write_err)?;

        map_user_row(&row)
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StorageError> {
        let Some(id) = key_id(id.value()) else {
            return Ok(None);
        };
        let row = sqlx::query(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn get_user_by_username(&self, username: &str) -> Result<Option<User>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = ?1"
        ))
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_user_row).transpose()
    }

    async fn update_level(
        &self,
        id: UserId,
        level: u32,
        experience: u32,
    ) -> Result<User, StorageError> {
        let row = sqlx::query(&format!(
            r"
            UPDATE users SET level = ?1, experience = ?2
            WHERE id = ?3
            RETURNING {USER_COLUMNS}
            "
        ))
        .bind(i64::from(level))
        .bind(i64::from(experience))
        .bind(ref_id(id.value())?)
        .fetch_optional(&self.pool)
        .await
        .map_err(write_err)?;

        match row {
            Some(row) => map_user_row(&row),
            None => Err(StorageError::NotFound),
        }
    }
}
