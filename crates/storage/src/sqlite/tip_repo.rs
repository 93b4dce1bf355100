use chrono::{Days, NaiveDate};
use leaf_core::model::{DailyTip, TipId};

use super::SqliteRepository;
use super::mapping::{conn, map_tip_row, returned_id, ser, write_err};
use crate::repository::{NewTipRecord, StorageError, TipRepository};

#[async_trait::async_trait]
impl TipRepository for SqliteRepository {
    async fn insert_tip(&self, tip: NewTipRecord) -> Result<TipId, StorageError> {
        let row = sqlx::query(
            r"
            INSERT INTO daily_tips (title, content, icon, date)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING id
            ",
        )
        .bind(tip.title)
        .bind(tip.content)
        .bind(tip.icon)
        .bind(tip.date)
        .fetch_one(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(TipId::new(returned_id(&row)?))
    }

    async fn tip_for_day(&self, day: NaiveDate) -> Result<Option<DailyTip>, StorageError> {
        // Tips dated any time before the next midnight (UTC) belong to `day` or earlier.
        let next_midnight = day
            .checked_add_days(Days::new(1))
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|dt| dt.and_utc())
            .ok_or_else(|| ser(format!("day out of range: {day}")))?;

        let row = sqlx::query(
            r"
            SELECT id, title, content, icon, date
            FROM daily_tips
            WHERE julianday(date) < julianday(?1)
            ORDER BY julianday(date) DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(next_midnight)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_tip_row).transpose()
    }
}
