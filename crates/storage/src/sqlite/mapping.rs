use chrono::{DateTime, Utc};
use leaf_core::model::{
    CategoryId, DailyTip, Difficulty, ProgressId, QuestionId, QuizCategory, QuizQuestion, Reward,
    RewardId, TipId, User, UserAchievement, UserAchievementId, UserId, UserProgress, UserReward,
    UserRewardId,
};
use sqlx::Row;
use sqlx::sqlite::SqliteRow;

use crate::repository::StorageError;

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn conn(e: sqlx::Error) -> StorageError {
    StorageError::Connection(e.to_string())
}

/// Maps unique-key violations to `Conflict` and FK violations to `NotFound`.
pub(crate) fn write_err(e: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &e {
        if db.is_unique_violation() {
            return StorageError::Conflict;
        }
        if db.is_foreign_key_violation() {
            return StorageError::NotFound;
        }
    }
    conn(e)
}

/// SQLite rowids are `i64`; an id past `i64::MAX` names no row.
pub(crate) fn key_id(v: u64) -> Option<i64> {
    i64::try_from(v).ok()
}

/// `key_id` for writes and commits, where an id that names no row is `NotFound`.
pub(crate) fn ref_id(v: u64) -> Result<i64, StorageError> {
    key_id(v).ok_or(StorageError::NotFound)
}

fn i64_to_u64(field: &'static str, v: i64) -> Result<u64, StorageError> {
    u64::try_from(v).map_err(|_| StorageError::Serialization(format!("{field} sign overflow")))
}

pub(crate) fn i64_to_u32(field: &'static str, v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid {field}: {v}")))
}

fn get_u32(row: &SqliteRow, field: &'static str) -> Result<u32, StorageError> {
    i64_to_u32(field, row.try_get::<i64, _>(field).map_err(ser)?)
}

fn get_u64(row: &SqliteRow, field: &'static str) -> Result<u64, StorageError> {
    i64_to_u64(field, row.try_get::<i64, _>(field).map_err(ser)?)
}

fn get_bool(row: &SqliteRow, field: &'static str) -> Result<bool, StorageError> {
    Ok(row.try_get::<i64, _>(field).map_err(ser)? != 0)
}

/// Reads the `id` column of a `RETURNING id` row.
pub(crate) fn returned_id(row: &SqliteRow) -> Result<u64, StorageError> {
    get_u64(row, "id")
}

pub(crate) fn bool_to_i64(v: bool) -> i64 {
    i64::from(v)
}

pub(crate) fn map_user_row(row: &SqliteRow) -> Result<User, StorageError> {
    User::from_persisted(
        UserId::new(get_u64(row, "id")?),
        row.try_get("username").map_err(ser)?,
        row.try_get("display_name").map_err(ser)?,
        get_u32(row, "level")?,
        get_u32(row, "total_points")?,
        get_u32(row, "experience")?,
        row.try_get("created_at").map_err(ser)?,
    )
    .map_err(ser)
}

pub(crate) fn map_category_row(row: &SqliteRow) -> Result<QuizCategory, StorageError> {
    let difficulty: String = row.try_get("difficulty").map_err(ser)?;
    QuizCategory {
        id: CategoryId::new(get_u64(row, "id")?),
        name: row.try_get("name").map_err(ser)?,
        description: row.try_get("description").map_err(ser)?,
        icon: row.try_get("icon").map_err(ser)?,
        color: row.try_get("color").map_err(ser)?,
        difficulty: difficulty.parse::<Difficulty>().map_err(ser)?,
        is_locked: get_bool(row, "is_locked")?,
        required_level: get_u32(row, "required_level")?,
    }
    .validate()
    .map_err(ser)
}

/// Options are stored as a JSON array of strings.
pub(crate) fn options_to_json(options: &[String]) -> Result<String, StorageError> {
    serde_json::to_string(options).map_err(ser)
}

pub(crate) fn map_question_row(row: &SqliteRow) -> Result<QuizQuestion, StorageError> {
    let options_json: String = row.try_get("options").map_err(ser)?;
    let options: Vec<String> = serde_json::from_str(&options_json).map_err(ser)?;
    let correct_answer = usize::try_from(get_u64(row, "correct_answer")?).map_err(ser)?;

    QuizQuestion::new(
        QuestionId::new(get_u64(row, "id")?),
        CategoryId::new(get_u64(row, "category_id")?),
        row.try_get::<String, _>("question").map_err(ser)?,
        options,
        correct_answer,
        row.try_get::<String, _>("explanation").map_err(ser)?,
        get_u32(row, "points")?,
    )
    .map_err(ser)
}

pub(crate) fn map_progress_row(row: &SqliteRow) -> Result<UserProgress, StorageError> {
    Ok(UserProgress {
        id: ProgressId::new(get_u64(row, "id")?),
        user_id: UserId::new(get_u64(row, "user_id")?),
        category_id: CategoryId::new(get_u64(row, "category_id")?),
        completed_questions: get_u32(row, "completed_questions")?,
        total_questions: get_u32(row, "total_questions")?,
        correct_answers: get_u32(row, "correct_answers")?,
        last_completed_at: row
            .try_get::<Option<DateTime<Utc>>, _>("last_completed_at")
            .map_err(ser)?,
    })
}

pub(crate) fn map_reward_row(row: &SqliteRow) -> Result<Reward, StorageError> {
    Reward::new(
        RewardId::new(get_u64(row, "id")?),
        row.try_get::<String, _>("name").map_err(ser)?,
        row.try_get::<String, _>("description").map_err(ser)?,
        row.try_get::<String, _>("icon").map_err(ser)?,
        get_u32(row, "points_cost")?,
        get_bool(row, "is_available")?,
    )
    .map_err(ser)
}

pub(crate) fn map_user_reward_row(row: &SqliteRow) -> Result<UserReward, StorageError> {
    Ok(UserReward {
        id: UserRewardId::new(get_u64(row, "id")?),
        user_id: UserId::new(get_u64(row, "user_id")?),
        reward_id: RewardId::new(get_u64(row, "reward_id")?),
        redeemed_at: row.try_get("redeemed_at").map_err(ser)?,
        is_used: get_bool(row, "is_used")?,
    })
}

pub(crate) fn map_tip_row(row: &SqliteRow) -> Result<DailyTip, StorageError> {
    Ok(DailyTip {
        id: TipId::new(get_u64(row, "id")?),
        title: row.try_get("title").map_err(ser)?,
        content: row.try_get("content").map_err(ser)?,
        icon: row.try_get("icon").map_err(ser)?,
        date: row.try_get("date").map_err(ser)?,
    })
}

pub(crate) fn map_achievement_row(row: &SqliteRow) -> Result<UserAchievement, StorageError> {
    Ok(UserAchievement {
        id: UserAchievementId::new(get_u64(row, "id")?),
        user_id: UserId::new(get_u64(row, "user_id")?),
        achievement_id: row.try_get("achievement_id").map_err(ser)?,
        unlocked_at: row.try_get("unlocked_at").map_err(ser)?,
    })
}

pub(crate) fn collect_rows<T>(
    rows: Vec<SqliteRow>,
    map: fn(&SqliteRow) -> Result<T, StorageError>,
) -> Result<Vec<T>, StorageError> {
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        out.push(map(&row)?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_counters_are_rejected() {
        assert!(i64_to_u32("total_points", -1).is_err());
        assert_eq!(i64_to_u32("total_points", 1250).unwrap(), 1250);
    }

    #[test]
    fn options_round_trip_as_json_array() {
        let json = options_to_json(&["10 years".to_owned(), "25 years".to_owned()]).unwrap();
        assert_eq!(json, r#"["10 years","25 years"]"#);
    }

    #[test]
    fn ids_above_i64_max_name_no_row() {
        assert_eq!(key_id(u64::MAX), None);
        assert_eq!(key_id(7), Some(7));
        assert!(matches!(ref_id(u64::MAX), Err(StorageError::NotFound)));
    }
}
