//! Route handlers grouped by resource.
//!
//! ```text
//! GET  /api/user/current | /api/user/{id}
//! GET  /api/quiz/categories
//! GET  /api/quiz/questions/{categoryId}?limit=N
//! POST /api/quiz/answer
//! GET  /api/progress/current | /api/progress/{userId}
//! GET  /api/achievements/{userId}
//! GET  /api/rewards
//! GET  /api/rewards/user/current | /api/rewards/user/{userId}
//! POST /api/rewards/redeem
//! GET  /api/daily-tip
//! GET  /health
//! ```

pub mod health;
pub mod progress;
pub mod quiz;
pub mod rewards;
pub mod tips;
pub mod users;
