//! Demo dataset for a fresh database.

use chrono::{DateTime, Utc};
use tracing::info;

use leaf_core::model::{
    CategoryId, Difficulty, QuestionId, QuizCategory, QuizQuestion, Reward, RewardId, User, UserId,
};
use storage::repository::{
    NewCategoryRecord, NewProgressRecord, NewQuestionRecord, NewRewardRecord, NewTipRecord,
    NewUserRecord, Storage,
};

use crate::error::AppServicesError;

/// Username of the seeded demo learner.
pub const DEMO_USERNAME: &str = "default_user";

/// What `seed_demo` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    Seeded { user_id: UserId },
    AlreadySeeded { user_id: UserId },
}

impl SeedOutcome {
    #[must_use]
    pub fn user_id(self) -> UserId {
        match self {
            Self::Seeded { user_id } | Self::AlreadySeeded { user_id } => user_id,
        }
    }
}

struct CategorySeed {
    name: &'static str,
    description: &'static str,
    icon: &'static str,
    color: &'static str,
    difficulty: Difficulty,
    is_locked: bool,
    required_level: u32,
}

const CATEGORIES: [CategorySeed; 3] = [
    CategorySeed {
        name: "水資源保護",
        description: "學習水資源保護相關知識",
        icon: "droplets",
        color: "blue",
        difficulty: Difficulty::Beginner,
        is_locked: false,
        required_level: 1,
    },
    CategorySeed {
        name: "再生能源",
        description: "了解再生能源的重要性",
        icon: "sun",
        color: "yellow",
        difficulty: Difficulty::Intermediate,
        is_locked: false,
        required_level: 2,
    },
    CategorySeed {
        name: "循環經濟",
        description: "探索循環經濟概念",
        icon: "recycle",
        color: "green",
        difficulty: Difficulty::Advanced,
        is_locked: true,
        required_level: 5,
    },
];

struct QuestionSeed {
    /// Index into `CATEGORIES`.
    category: usize,
    question: &'static str,
    options: [&'static str; 4],
    correct_answer: usize,
    explanation: &'static str,
    points: u32,
}

const QUESTIONS: [QuestionSeed; 3] = [
    QuestionSeed {
        category: 0,
        question: "每天平均一個人需要多少公升的水？",
        options: ["20公升", "50公升", "100公升", "200公升"],
        correct_answer: 2,
        explanation: "聯合國建議每人每天至少需要20-50公升水用於飲用、烹飪和個人衛生，但現代生活實際需求約100公升。",
        points: 10,
    },
    QuestionSeed {
        category: 0,
        question: "以下哪個是最有效的節水方法？",
        options: ["縮短淋浴時間", "修理漏水龍頭", "使用節水器具", "以上皆是"],
        correct_answer: 3,
        explanation: "所有這些方法都能有效節水，結合使用效果最佳。",
        points: 10,
    },
    QuestionSeed {
        category: 1,
        question: "太陽能板的使用壽命大約是多少年？",
        options: ["10年", "15年", "25年", "50年"],
        correct_answer: 2,
        explanation: "現代太陽能板的使用壽命通常為25-30年，是非常耐用的再生能源設備。",
        points: 15,
    },
];

const REWARDS: [(&str, &str, &str, u32); 3] = [
    ("星巴克咖啡券", "中杯飲品任選一杯", "coffee", 800),
    ("環保購物袋", "100%有機棉材質", "shopping-bag", 600),
    ("捷運一日票", "台北捷運全線通用", "ticket", 1500),
];

/// (category index, completed, total, correct)
const PROGRESS: [(usize, u32, u32, u32); 2] = [(0, 15, 15, 15), (1, 12, 20, 10)];

const TIP_TITLE: &str = "今日永續小知識";
const TIP_CONTENT: &str =
    "使用大眾運輸可以減少約60%的碳排放量。每次搭捷運，你都在為環保盡一份力！";

/// Insert whatever part of the demo dataset is missing.
///
/// Every record is matched by its natural key (username, category name,
/// question text, reward name, tip title, progress category) and inserted
/// only when absent, so a run that failed halfway is completed by the next
/// one. The user goes first so a fresh store assigns it id 1.
///
/// # Errors
///
/// Returns `AppServicesError::Storage` if any insert fails and
/// `AppServicesError::Domain` if a seed record fails validation.
pub async fn seed_demo(
    storage: &Storage,
    now: DateTime<Utc>,
) -> Result<SeedOutcome, AppServicesError> {
    let mut inserted = 0_usize;

    let user = match storage.users.get_user_by_username(DEMO_USERNAME).await? {
        Some(user) => user,
        None => {
            let user = User::from_persisted(
                UserId::new(0),
                DEMO_USERNAME.into(),
                "小綠".into(),
                5,
                1250,
                750,
                now,
            )
            .map_err(leaf_core::Error::from)?;
            inserted += 1;
            storage
                .users
                .insert_new_user(NewUserRecord::from_user(&user))
                .await?
        }
    };

    let existing = storage.quiz.list_categories().await?;
    let mut category_ids: Vec<CategoryId> = Vec::with_capacity(CATEGORIES.len());
    for seed in &CATEGORIES {
        if let Some(found) = existing.iter().find(|c| c.name == seed.name) {
            category_ids.push(found.id);
            continue;
        }
        let category = QuizCategory {
            id: CategoryId::new(0),
            name: seed.name.into(),
            description: seed.description.into(),
            icon: seed.icon.into(),
            color: seed.color.into(),
            difficulty: seed.difficulty,
            is_locked: seed.is_locked,
            required_level: seed.required_level,
        }
        .validate()
        .map_err(leaf_core::Error::from)?;
        let id = storage
            .quiz
            .insert_category(NewCategoryRecord::from_category(&category))
            .await?;
        inserted += 1;
        category_ids.push(id);
    }

    for seed in &QUESTIONS {
        let category_id = category_ids[seed.category];
        let present = storage.quiz.questions_for_category(category_id).await?;
        if present.iter().any(|q| q.question() == seed.question) {
            continue;
        }
        let question = QuizQuestion::new(
            QuestionId::new(0),
            category_id,
            seed.question,
            seed.options.iter().map(|o| (*o).to_owned()).collect(),
            seed.correct_answer,
            seed.explanation,
            seed.points,
        )
        .map_err(leaf_core::Error::from)?;
        storage
            .quiz
            .insert_question(NewQuestionRecord::from_question(&question))
            .await?;
        inserted += 1;
    }

    let catalog = storage.rewards.list_rewards().await?;
    for (name, description, icon, cost) in REWARDS {
        if catalog.iter().any(|r| r.name() == name) {
            continue;
        }
        let reward = Reward::new(RewardId::new(0), name, description, icon, cost, true)
            .map_err(leaf_core::Error::from)?;
        storage
            .rewards
            .insert_reward(NewRewardRecord::from_reward(&reward))
            .await?;
        inserted += 1;
    }

    let tip = storage.tips.tip_for_day(now.date_naive()).await?;
    if !tip.is_some_and(|t| t.title == TIP_TITLE) {
        storage
            .tips
            .insert_tip(NewTipRecord {
                title: TIP_TITLE.into(),
                content: TIP_CONTENT.into(),
                icon: "lightbulb".into(),
                date: now,
            })
            .await?;
        inserted += 1;
    }

    for (category, completed, total, correct) in PROGRESS {
        let category_id = category_ids[category];
        if storage
            .progress
            .progress_for_category(user.id(), category_id)
            .await?
            .is_some()
        {
            continue;
        }
        storage
            .progress
            .insert_progress(NewProgressRecord {
                user_id: user.id(),
                category_id,
                completed_questions: completed,
                total_questions: total,
                correct_answers: correct,
                last_completed_at: Some(now),
            })
            .await?;
        inserted += 1;
    }

    if inserted == 0 {
        info!(user_id = %user.id(), "demo data already present");
        return Ok(SeedOutcome::AlreadySeeded { user_id: user.id() });
    }
    info!(user_id = %user.id(), inserted, "demo data seeded");
    Ok(SeedOutcome::Seeded { user_id: user.id() })
}
