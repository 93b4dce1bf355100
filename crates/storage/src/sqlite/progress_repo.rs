use leaf_core::model::{CategoryId, ProgressId, UserId, UserProgress};

use super::SqliteRepository;
use super::mapping::{collect_rows, conn, key_id, map_progress_row, ref_id, returned_id, write_err};
use crate::repository::{NewProgressRecord, ProgressRepository, StorageError};

pub(super) const PROGRESS_COLUMNS: &str = "id, user_id, category_id, completed_questions, \
     total_questions, correct_answers, last_completed_at";

#[async_trait::async_trait]
impl ProgressRepository for SqliteRepository {
    async fn insert_progress(
        &self,
        progress: NewProgressRecord,
    ) -> Result<ProgressId, StorageError> {
        let row = sqlx::query(
            r"
            INSERT INTO user_progress
                (user_id, category_id, completed_questions, total_questions,
                 correct_answers, last_completed_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id
            ",
        )
        .bind(ref_id(progress.user_id.value())?)
        .bind(ref_id(progress.category_id.value())?)
        .bind(i64::from(progress.completed_questions))
        .bind(i64::from(progress.total_questions))
        .bind(i64::from(progress.correct_answers))
        .bind(progress.last_completed_at)
        .fetch_one(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(ProgressId::new(returned_id(&row)?))
    }

    async fn progress_for_user(&self, user_id: UserId) -> Result<Vec<UserProgress>, StorageError> {
        let Some(user_id) = key_id(user_id.value()) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(&format!(
            r"
            SELECT {PROGRESS_COLUMNS}
            FROM user_progress
            WHERE user_id = ?1
            ORDER BY category_id ASC
            "
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        collect_rows(rows, map_progress_row)
    }

    async fn progress_for_category(
        &self,
        user_id: UserId,
        category_id: CategoryId,
    ) -> Result<Option<UserProgress>, StorageError> {
        let (Some(user_id), Some(category_id)) =
            (key_id(user_id.value()), key_id(category_id.value()))
        else {
            return Ok(None);
        };
        let row = sqlx::query(&format!(
            r"
            SELECT {PROGRESS_COLUMNS}
            FROM user_progress
            WHERE user_id = ?1 AND category_id = ?2
            "
        ))
        .bind(user_id)
        .bind(category_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_progress_row).transpose()
    }
}
