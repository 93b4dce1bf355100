use leaf_core::model::{DEFAULT_TOTAL_QUESTIONS, UserReward, UserRewardId};
use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, i64_to_u32, map_progress_row, ref_id, returned_id, ser, write_err};
use super::progress_repo::PROGRESS_COLUMNS;
use crate::repository::{
    AnswerEntry, AppliedAnswer, AppliedRedemption, LedgerPersistence, RedemptionEntry,
    StorageError,
};

// Both commits open with a write so the transaction takes the write lock
// before it reads anything.

#[async_trait::async_trait]
impl LedgerPersistence for SqliteRepository {
    async fn apply_answer(&self, entry: AnswerEntry) -> Result<AppliedAnswer, StorageError> {
        let user_id = ref_id(entry.user_id.value())?;
        let category_id = ref_id(entry.graded.category_id.value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let balance = sqlx::query(
            r"
            UPDATE users SET total_points = total_points + ?1
            WHERE id = ?2
            RETURNING total_points
            ",
        )
        .bind(i64::from(entry.graded.points_awarded))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(write_err)?
        .ok_or(StorageError::NotFound)?;

        // Dropping `tx` on any early return rolls the credit back.
        let total_points: i64 = balance.try_get("total_points").map_err(ser)?;
        let total_points =
            u32::try_from(total_points).map_err(|_| StorageError::PointsOverflow)?;

        let row = sqlx::query(&format!(
            r"
            INSERT INTO user_progress
                (user_id, category_id, completed_questions, total_questions,
                 correct_answers, last_completed_at)
            VALUES (?1, ?2, 1, ?3, ?4, ?5)
            ON CONFLICT(user_id, category_id) DO UPDATE SET
                completed_questions = completed_questions + 1,
                correct_answers = correct_answers + excluded.correct_answers,
                last_completed_at = excluded.last_completed_at
            RETURNING {PROGRESS_COLUMNS}
            "
        ))
        .bind(user_id)
        .bind(category_id)
        .bind(i64::from(DEFAULT_TOTAL_QUESTIONS))
        .bind(i64::from(entry.graded.correct))
        .bind(entry.answered_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_err)?;
        let progress = map_progress_row(&row)?;

        tx.commit().await.map_err(conn)?;

        Ok(AppliedAnswer {
            progress,
            total_points,
        })
    }

    async fn redeem(&self, entry: RedemptionEntry) -> Result<AppliedRedemption, StorageError> {
        let user_id = ref_id(entry.user_id.value())?;
        let reward_id = ref_id(entry.reward_id.value())?;
        let mut tx = self.pool.begin().await.map_err(conn)?;

        // A missing or withdrawn reward makes the cost NULL, which matches no row.
        let debited = sqlx::query(
            r"
            WITH reward AS (
                SELECT points_cost FROM rewards WHERE id = ?2 AND is_available = 1
            )
            UPDATE users
            SET total_points = total_points - (SELECT points_cost FROM reward)
            WHERE id = ?1
              AND total_points >= (SELECT points_cost FROM reward)
            RETURNING total_points
            ",
        )
        .bind(user_id)
        .bind(reward_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(write_err)?;

        let Some(debited) = debited else {
            return Err(diagnose_refused_debit(&mut tx, user_id, reward_id).await);
        };
        let total_points = i64_to_u32(
            "total_points",
            debited.try_get("total_points").map_err(ser)?,
        )?;

        // Same snapshot as the debit: the write lock is held.
        let cost = sqlx::query("SELECT points_cost FROM rewards WHERE id = ?1")
            .bind(reward_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(conn)?;
        let cost = i64_to_u32("points_cost", cost.try_get("points_cost").map_err(ser)?)?;

        let row = sqlx::query(
            r"
            INSERT INTO user_rewards (user_id, reward_id, redeemed_at, is_used)
            VALUES (?1, ?2, ?3, 0)
            RETURNING id
            ",
        )
        .bind(user_id)
        .bind(reward_id)
        .bind(entry.redeemed_at)
        .fetch_one(&mut *tx)
        .await
        .map_err(write_err)?;
        let id = UserRewardId::new(returned_id(&row)?);

        tx.commit().await.map_err(conn)?;

        Ok(AppliedRedemption {
            user_reward: UserReward::redeemed(id, entry.user_id, entry.reward_id, entry.redeemed_at),
            cost,
            total_points,
        })
    }
}

/// Works out why the conditional debit matched no row.
async fn diagnose_refused_debit(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user_id: i64,
    reward_id: i64,
) -> StorageError {
    let balance = sqlx::query("SELECT total_points FROM users WHERE id = ?1")
        .bind(user_id)
        .fetch_optional(&mut **tx)
        .await;
    let balance = match balance {
        Ok(Some(row)) => match row
            .try_get::<i64, _>("total_points")
            .map_err(ser)
            .and_then(|v| i64_to_u32("total_points", v))
        {
            Ok(balance) => balance,
            Err(e) => return e,
        },
        Ok(None) => return StorageError::NotFound,
        Err(e) => return conn(e),
    };

    let cost = sqlx::query("SELECT points_cost FROM rewards WHERE id = ?1 AND is_available = 1")
        .bind(reward_id)
        .fetch_optional(&mut **tx)
        .await;
    match cost {
        Ok(Some(row)) => match row
            .try_get::<i64, _>("points_cost")
            .map_err(ser)
            .and_then(|v| i64_to_u32("points_cost", v))
        {
            Ok(cost) => StorageError::InsufficientPoints { balance, cost },
            Err(e) => e,
        },
        Ok(None) => StorageError::NotFound,
        Err(e) => conn(e),
    }
}
