mod achievement;
mod ids;
mod progress;
mod quiz;
mod reward;
mod tip;
mod user;

pub use ids::{
    CategoryId, ParseIdError, ProgressId, QuestionId, RewardId, TipId, UserAchievementId, UserId,
    UserRewardId,
};

pub use achievement::{AchievementError, UserAchievement, normalize_achievement_id};
pub use progress::{DEFAULT_TOTAL_QUESTIONS, UserProgress};
pub use quiz::{Difficulty, QuizCategory, QuizError, QuizQuestion};
pub use reward::{Reward, RewardError, UserReward};
pub use tip::{DailyTip, pick_tip_for_day};
pub use user::{User, UserError, normalize_username};
