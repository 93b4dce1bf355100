use chrono::Utc;
use sqlx::SqlitePool;

use super::SqliteInitError;

const SCHEMA_V1: &[&str] = &[
    r"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            display_name TEXT NOT NULL,
            level INTEGER NOT NULL CHECK (level >= 1),
            total_points INTEGER NOT NULL CHECK (total_points >= 0),
            experience INTEGER NOT NULL CHECK (experience >= 0),
            created_at TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS quiz_categories (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            icon TEXT NOT NULL,
            color TEXT NOT NULL,
            difficulty TEXT NOT NULL
                CHECK (difficulty IN ('beginner', 'intermediate', 'advanced')),
            is_locked INTEGER NOT NULL DEFAULT 0,
            required_level INTEGER NOT NULL DEFAULT 1 CHECK (required_level >= 1)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS quiz_questions (
            id INTEGER PRIMARY KEY,
            category_id INTEGER NOT NULL,
            question TEXT NOT NULL,
            options TEXT NOT NULL,
            correct_answer INTEGER NOT NULL CHECK (correct_answer >= 0),
            explanation TEXT NOT NULL,
            points INTEGER NOT NULL DEFAULT 10 CHECK (points >= 0),
            FOREIGN KEY (category_id) REFERENCES quiz_categories(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS user_progress (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            category_id INTEGER NOT NULL,
            completed_questions INTEGER NOT NULL DEFAULT 0 CHECK (completed_questions >= 0),
            total_questions INTEGER NOT NULL DEFAULT 0 CHECK (total_questions >= 0),
            correct_answers INTEGER NOT NULL DEFAULT 0 CHECK (correct_answers >= 0),
            last_completed_at TEXT,
            UNIQUE (user_id, category_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (category_id) REFERENCES quiz_categories(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS rewards (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL,
            icon TEXT NOT NULL,
            points_cost INTEGER NOT NULL CHECK (points_cost > 0),
            is_available INTEGER NOT NULL DEFAULT 1
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS user_rewards (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            reward_id INTEGER NOT NULL,
            redeemed_at TEXT NOT NULL,
            is_used INTEGER NOT NULL DEFAULT 0,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
            FOREIGN KEY (reward_id) REFERENCES rewards(id)
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS daily_tips (
            id INTEGER PRIMARY KEY,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            icon TEXT NOT NULL,
            date TEXT NOT NULL
        );
    ",
    r"
        CREATE TABLE IF NOT EXISTS user_achievements (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            achievement_id TEXT NOT NULL,
            unlocked_at TEXT NOT NULL,
            UNIQUE (user_id, achievement_id),
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        );
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_quiz_questions_category
            ON quiz_questions (category_id, id);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_user_rewards_user_redeemed
            ON user_rewards (user_id, redeemed_at, id);
    ",
    r"
        CREATE INDEX IF NOT EXISTS idx_daily_tips_date
            ON daily_tips (date);
    ",
];

/// Runs the schema migrations that have not been applied yet.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), SqliteInitError> {
    async fn is_applied(pool: &SqlitePool, version: i64) -> Result<bool, sqlx::Error> {
        let row = sqlx::query("SELECT 1 FROM schema_migrations WHERE version = ?1")
            .bind(version)
            .fetch_optional(pool)
            .await?;
        Ok(row.is_some())
    }

    sqlx::query(
        r"
            CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );
            ",
    )
    .execute(pool)
    .await?;

    // Version 1: users, quiz catalog, progress, rewards, tips, achievements.
    if !is_applied(pool, 1).await? {
        let mut tx = pool.begin().await?;

        for statement in SCHEMA_V1 {
            sqlx::query(*statement).execute(&mut *tx).await?;
        }

        sqlx::query(
            r"
                INSERT INTO schema_migrations (version, applied_at)
                VALUES (?1, ?2)
                ON CONFLICT(version) DO NOTHING
            ",
        )
        .bind(1_i64)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
    }

    Ok(())
}
