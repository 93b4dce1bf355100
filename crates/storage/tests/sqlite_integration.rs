use chrono::Duration;
use leaf_core::ledger::GradedAnswer;
use leaf_core::model::{CategoryId, Difficulty, QuestionId, RewardId, UserId};
use leaf_core::time::fixed_now;
use storage::StorageError;
use storage::repository::{
    AchievementRepository, AnswerEntry, LedgerPersistence, NewCategoryRecord, NewProgressRecord,
    NewQuestionRecord, NewRewardRecord, NewTipRecord, NewUserRecord, ProgressRepository,
    QuizRepository, RedemptionEntry, RewardRepository, TipRepository, UserRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

async fn seed_user(repo: &SqliteRepository, username: &str, points: u32) -> UserId {
    let user = repo
        .insert_new_user(NewUserRecord {
            username: username.into(),
            display_name: "Leaf".into(),
            level: 1,
            total_points: points,
            experience: 0,
            created_at: fixed_now(),
        })
        .await
        .expect("insert user");
    user.id()
}

async fn seed_category(repo: &SqliteRepository) -> CategoryId {
    repo.insert_category(NewCategoryRecord {
        name: "Water".into(),
        description: "Saving water".into(),
        icon: "droplets".into(),
        color: "blue".into(),
        difficulty: Difficulty::Beginner,
        is_locked: false,
        required_level: 1,
    })
    .await
    .expect("insert category")
}

fn answer(user_id: UserId, category_id: CategoryId, correct: bool) -> AnswerEntry {
    AnswerEntry {
        user_id,
        graded: GradedAnswer {
            question_id: QuestionId::new(1),
            category_id,
            correct,
            points_awarded: if correct { 10 } else { 0 },
        },
        answered_at: fixed_now(),
    }
}

#[tokio::test]
async fn migrate_is_idempotent() {
    let repo = connect("memdb_migrate_twice").await;
    repo.migrate().await.expect("second migrate");
    assert!(repo.list_categories().await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_username_conflicts() {
    let repo = connect("memdb_dup_username").await;
    seed_user(&repo, "default_user", 0).await;

    let err = repo
        .insert_new_user(NewUserRecord {
            username: "default_user".into(),
            display_name: "Other".into(),
            level: 1,
            total_points: 0,
            experience: 0,
            created_at: fixed_now(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    let found = repo.get_user_by_username("default_user").await.unwrap();
    assert_eq!(found.unwrap().display_name(), "Leaf");
}

#[tokio::test]
async fn questions_round_trip_with_their_options() {
    let repo = connect("memdb_questions").await;
    let category = seed_category(&repo).await;

    let id = repo
        .insert_question(NewQuestionRecord {
            category_id: category,
            question: "How long do solar panels last?".into(),
            options: vec!["10".into(), "15".into(), "25".into(), "50".into()],
            correct_answer: 2,
            explanation: "Around 25 years.".into(),
            points: 15,
        })
        .await
        .unwrap();

    let question = repo.get_question(id).await.unwrap().expect("question");
    assert_eq!(question.options().len(), 4);
    assert_eq!(question.correct_answer(), 2);
    assert_eq!(question.points(), 15);

    let listed = repo.questions_for_category(category).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(repo.questions_for_category(CategoryId::new(99)).await.unwrap().is_empty());
}

#[tokio::test]
async fn question_for_missing_category_is_not_found() {
    let repo = connect("memdb_orphan_question").await;
    let err = repo
        .insert_question(NewQuestionRecord {
            category_id: CategoryId::new(42),
            question: "Orphan?".into(),
            options: vec!["yes".into(), "no".into()],
            correct_answer: 0,
            explanation: String::new(),
            points: 10,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}

#[tokio::test]
async fn answers_upsert_a_single_progress_row() {
    let repo = connect("memdb_answer_upsert").await;
    let user = seed_user(&repo, "learner", 150).await;
    let category = seed_category(&repo).await;

    let first = repo.apply_answer(answer(user, category, true)).await.unwrap();
    assert_eq!(first.total_points, 160);
    assert_eq!(first.progress.completed_questions, 1);
    assert_eq!(first.progress.correct_answers, 1);
    assert_eq!(first.progress.total_questions, 20);

    let second = repo.apply_answer(answer(user, category, false)).await.unwrap();
    assert_eq!(second.total_points, 160);
    assert_eq!(second.progress.id, first.progress.id);
    assert_eq!(second.progress.completed_questions, 2);
    assert_eq!(second.progress.correct_answers, 1);

    let rows = repo.progress_for_user(user).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(
        repo.progress_for_category(user, category).await.unwrap(),
        Some(second.progress)
    );
}

#[tokio::test]
async fn answer_for_missing_user_writes_nothing() {
    let repo = connect("memdb_answer_missing_user").await;
    let category = seed_category(&repo).await;

    let err = repo
        .apply_answer(answer(UserId::new(77), category, true))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
    assert!(repo.progress_for_user(UserId::new(77)).await.unwrap().is_empty());
}

#[tokio::test]
async fn overflowing_credit_rolls_back() {
    let repo = connect("memdb_answer_overflow").await;
    let user = seed_user(&repo, "rich", u32::MAX - 5).await;
    let category = seed_category(&repo).await;

    let err = repo.apply_answer(answer(user, category, true)).await.unwrap_err();
    assert!(matches!(err, StorageError::PointsOverflow));

    let stored = repo.get_user(user).await.unwrap().unwrap();
    assert_eq!(stored.total_points(), u32::MAX - 5);
    assert!(repo.progress_for_user(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn imported_progress_conflicts_on_same_category() {
    let repo = connect("memdb_progress_import").await;
    let user = seed_user(&repo, "importer", 0).await;
    let category = seed_category(&repo).await;
    let record = NewProgressRecord {
        user_id: user,
        category_id: category,
        completed_questions: 12,
        total_questions: 20,
        correct_answers: 10,
        last_completed_at: None,
    };

    repo.insert_progress(record.clone()).await.unwrap();
    let err = repo.insert_progress(record).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));
}

#[tokio::test]
async fn redeem_debits_exact_balance_to_zero() {
    let repo = connect("memdb_redeem_exact").await;
    let user = seed_user(&repo, "saver", 800).await;
    let reward = repo
        .insert_reward(NewRewardRecord {
            name: "Coffee voucher".into(),
            description: "One coffee".into(),
            icon: "coffee".into(),
            points_cost: 800,
            is_available: true,
        })
        .await
        .unwrap();

    let applied = repo
        .redeem(RedemptionEntry {
            user_id: user,
            reward_id: reward,
            redeemed_at: fixed_now(),
        })
        .await
        .unwrap();
    assert_eq!((applied.cost, applied.total_points), (800, 0));
    assert!(!applied.user_reward.is_used);

    let history = repo.rewards_for_user(user).await.unwrap();
    assert_eq!(history, vec![applied.user_reward]);
}

#[tokio::test]
async fn overdraft_is_refused_and_rolled_back() {
    let repo = connect("memdb_redeem_overdraft").await;
    let user = seed_user(&repo, "spender", 50).await;
    let reward = repo
        .insert_reward(NewRewardRecord {
            name: "Tote bag".into(),
            description: "Reusable bag".into(),
            icon: "shopping-bag".into(),
            points_cost: 100,
            is_available: true,
        })
        .await
        .unwrap();

    let err = repo
        .redeem(RedemptionEntry {
            user_id: user,
            reward_id: reward,
            redeemed_at: fixed_now(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::InsufficientPoints {
            balance: 50,
            cost: 100
        }
    ));

    assert_eq!(repo.get_user(user).await.unwrap().unwrap().total_points(), 50);
    assert!(repo.rewards_for_user(user).await.unwrap().is_empty());
}

#[tokio::test]
async fn withdrawn_reward_is_not_found() {
    let repo = connect("memdb_redeem_withdrawn").await;
    let user = seed_user(&repo, "late", 5000).await;
    let reward = repo
        .insert_reward(NewRewardRecord {
            name: "Metro day pass".into(),
            description: "One day".into(),
            icon: "ticket".into(),
            points_cost: 1500,
            is_available: false,
        })
        .await
        .unwrap();

    let err = repo
        .redeem(RedemptionEntry {
            user_id: user,
            reward_id: reward,
            redeemed_at: fixed_now(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
    assert_eq!(repo.list_rewards().await.unwrap().len(), 1);
    assert_eq!(repo.get_user(user).await.unwrap().unwrap().total_points(), 5000);
}

#[tokio::test]
async fn redeem_charges_the_catalog_cost() {
    let repo = connect("memdb_redeem_catalog_cost").await;
    let user = seed_user(&repo, "shopper", 1000).await;
    let reward = repo
        .insert_reward(NewRewardRecord {
            name: "Tote bag".into(),
            description: "Reusable bag".into(),
            icon: "shopping-bag".into(),
            points_cost: 600,
            is_available: true,
        })
        .await
        .unwrap();

    let applied = repo
        .redeem(RedemptionEntry {
            user_id: user,
            reward_id: reward,
            redeemed_at: fixed_now(),
        })
        .await
        .unwrap();
    assert_eq!((applied.cost, applied.total_points), (600, 400));

    let err = repo
        .redeem(RedemptionEntry {
            user_id: user,
            reward_id: reward,
            redeemed_at: fixed_now(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StorageError::InsufficientPoints {
            balance: 400,
            cost: 600
        }
    ));
}

#[tokio::test]
async fn ids_past_i64_max_name_no_row() {
    let repo = connect("memdb_huge_ids").await;
    let user = seed_user(&repo, "real", 100).await;
    let category = seed_category(&repo).await;
    let huge = u64::MAX;

    assert!(repo.get_user(UserId::new(huge)).await.unwrap().is_none());
    assert!(repo.get_question(QuestionId::new(huge)).await.unwrap().is_none());
    assert!(repo.get_reward(RewardId::new(huge)).await.unwrap().is_none());
    assert!(
        repo.questions_for_category(CategoryId::new(huge))
            .await
            .unwrap()
            .is_empty()
    );
    assert!(repo.progress_for_user(UserId::new(huge)).await.unwrap().is_empty());
    assert!(
        repo.progress_for_category(user, CategoryId::new(huge))
            .await
            .unwrap()
            .is_none()
    );
    assert!(repo.rewards_for_user(UserId::new(huge)).await.unwrap().is_empty());
    assert!(
        repo.achievements_for_user(UserId::new(huge))
            .await
            .unwrap()
            .is_empty()
    );

    let err = repo
        .apply_answer(answer(UserId::new(huge), category, true))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    let err = repo
        .redeem(RedemptionEntry {
            user_id: user,
            reward_id: RewardId::new(huge),
            redeemed_at: fixed_now(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    let err = repo.update_level(UserId::new(huge), 2, 0).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    assert_eq!(repo.get_user(user).await.unwrap().unwrap().total_points(), 100);
}

#[tokio::test]
async fn tip_lookup_falls_back_to_latest_past_tip() {
    let repo = connect("memdb_tips").await;
    let now = fixed_now();
    let tip = |title: &str, date| NewTipRecord {
        title: title.into(),
        content: "Take the metro.".into(),
        icon: "lightbulb".into(),
        date,
    };

    assert!(repo.tip_for_day(now.date_naive()).await.unwrap().is_none());

    repo.insert_tip(tip("old", now - Duration::days(3))).await.unwrap();
    repo.insert_tip(tip("future", now + Duration::days(2))).await.unwrap();

    let fallback = repo.tip_for_day(now.date_naive()).await.unwrap().unwrap();
    assert_eq!(fallback.title, "old");

    repo.insert_tip(tip("today", now)).await.unwrap();
    let today = repo.tip_for_day(now.date_naive()).await.unwrap().unwrap();
    assert_eq!(today.title, "today");
}

#[tokio::test]
async fn achievements_unlock_once() {
    let repo = connect("memdb_achievements").await;
    let user = seed_user(&repo, "achiever", 0).await;

    let first = repo
        .unlock_achievement(user, "first-quiz", fixed_now())
        .await
        .unwrap();
    let again = repo
        .unlock_achievement(user, "first-quiz", fixed_now() + Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(first, again);
    assert_eq!(repo.achievements_for_user(user).await.unwrap().len(), 1);

    let err = repo
        .unlock_achievement(UserId::new(404), "first-quiz", fixed_now())
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::NotFound));
}
