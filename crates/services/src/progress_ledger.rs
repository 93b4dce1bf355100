use std::sync::Arc;

use tracing::{debug, info};

use leaf_core::ledger::grade_answer;
use leaf_core::model::{QuestionId, UserId, UserProgress};
use storage::repository::{AnswerEntry, LedgerPersistence, QuizRepository, StorageError};

use crate::Clock;
use crate::error::LedgerError;
use crate::locks::UserLocks;

//
// ─── ANSWER RESULT ─────────────────────────────────────────────────────────────
//

/// Outcome of one submitted answer, after it has been committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerResult {
    pub correct: bool,
    pub explanation: String,
    pub points_awarded: u32,
    pub progress: UserProgress,
    pub total_points: u32,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Grades answers and commits progress plus any earned points.
#[derive(Clone)]
pub struct ProgressLedger {
    clock: Clock,
    quiz: Arc<dyn QuizRepository>,
    ledger: Arc<dyn LedgerPersistence>,
    locks: UserLocks,
}

impl ProgressLedger {
    #[must_use]
    pub fn new(
        clock: Clock,
        quiz: Arc<dyn QuizRepository>,
        ledger: Arc<dyn LedgerPersistence>,
        locks: UserLocks,
    ) -> Self {
        Self {
            clock,
            quiz,
            ledger,
            locks,
        }
    }

    /// Grade `selected` against the question and commit the result.
    ///
    /// An out-of-range or negative `selected` is graded as incorrect. The
    /// progress upsert and the credit land together or not at all.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::QuestionNotFound` or `LedgerError::UserNotFound`
    /// when either id does not resolve, `LedgerError::PointsOverflow` when the
    /// credit would not fit the balance, and `LedgerError::Storage` on
    /// backend failures.
    pub async fn submit_answer(
        &self,
        user_id: UserId,
        question_id: QuestionId,
        selected: i64,
    ) -> Result<AnswerResult, LedgerError> {
        let question = self
            .quiz
            .get_question(question_id)
            .await?
            .ok_or(LedgerError::QuestionNotFound(question_id))?;
        let graded = grade_answer(&question, selected);
        debug!(%user_id, %question_id, selected, correct = graded.correct, "graded answer");

        let _guard = self.locks.lock(user_id).await;
        let applied = self
            .ledger
            .apply_answer(AnswerEntry {
                user_id,
                graded,
                answered_at: self.clock.now(),
            })
            .await
            .map_err(|err| match err {
                StorageError::NotFound => LedgerError::UserNotFound(user_id),
                StorageError::PointsOverflow => LedgerError::PointsOverflow,
                other => LedgerError::Storage(other),
            })?;

        info!(
            %user_id,
            %question_id,
            category_id = %graded.category_id,
            points = graded.points_awarded,
            balance = applied.total_points,
            "answer committed"
        );

        Ok(AnswerResult {
            correct: graded.correct,
            explanation: question.explanation().to_owned(),
            points_awarded: graded.points_awarded,
            progress: applied.progress,
            total_points: applied.total_points,
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use leaf_core::model::{CategoryId, Difficulty};
    use leaf_core::time::{fixed_clock, fixed_now};
    use storage::Storage;
    use storage::repository::{NewCategoryRecord, NewQuestionRecord, NewUserRecord};

    struct Fixture {
        storage: Storage,
        ledger: ProgressLedger,
        user_id: UserId,
        category_id: CategoryId,
        question_id: QuestionId,
    }

    async fn fixture(points: u32) -> Fixture {
        let storage = Storage::in_memory();
        let user = storage
            .users
            .insert_new_user(NewUserRecord {
                username: "learner".into(),
                display_name: "Learner".into(),
                level: 1,
                total_points: points,
                experience: 0,
                created_at: fixed_now(),
            })
            .await
            .unwrap();
        let category_id = storage
            .quiz
            .insert_category(NewCategoryRecord {
                name: "Water".into(),
                description: "Saving water".into(),
                icon: "droplets".into(),
                color: "blue".into(),
                difficulty: Difficulty::Beginner,
                is_locked: false,
                required_level: 1,
            })
            .await
            .unwrap();
        let question_id = storage
            .quiz
            .insert_question(NewQuestionRecord {
                category_id,
                question: "Best way to save water?".into(),
                options: vec!["Shorter showers".into(), "All of the above".into()],
                correct_answer: 1,
                explanation: "Every habit helps.".into(),
                points: 10,
            })
            .await
            .unwrap();
        let ledger = ProgressLedger::new(
            fixed_clock(),
            Arc::clone(&storage.quiz),
            Arc::clone(&storage.ledger),
            UserLocks::new(),
        );

        Fixture {
            storage,
            ledger,
            user_id: user.id(),
            category_id,
            question_id,
        }
    }

    #[tokio::test]
    async fn first_correct_answer_creates_progress_and_credits() {
        let fx = fixture(150).await;

        let result = fx
            .ledger
            .submit_answer(fx.user_id, fx.question_id, 1)
            .await
            .unwrap();

        assert!(result.correct);
        assert_eq!(result.points_awarded, 10);
        assert_eq!(result.total_points, 160);
        assert_eq!(result.explanation, "Every habit helps.");
        assert_eq!(result.progress.category_id, fx.category_id);
        assert_eq!(result.progress.completed_questions, 1);
        assert_eq!(result.progress.correct_answers, 1);
        assert_eq!(result.progress.last_completed_at, Some(fixed_now()));

        let user = fx.storage.users.get_user(fx.user_id).await.unwrap().unwrap();
        assert_eq!(user.total_points(), 160);
    }

    #[tokio::test]
    async fn wrong_and_out_of_range_answers_pay_nothing() {
        let fx = fixture(150).await;

        for selected in [0, 7, -1] {
            let result = fx
                .ledger
                .submit_answer(fx.user_id, fx.question_id, selected)
                .await
                .unwrap();
            assert!(!result.correct);
            assert_eq!(result.points_awarded, 0);
            assert_eq!(result.total_points, 150);
        }

        let progress = fx
            .storage
            .progress
            .progress_for_category(fx.user_id, fx.category_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(progress.completed_questions, 3);
        assert_eq!(progress.correct_answers, 0);
    }

    #[tokio::test]
    async fn repeated_correct_answers_pay_each_time() {
        let fx = fixture(0).await;

        fx.ledger.submit_answer(fx.user_id, fx.question_id, 1).await.unwrap();
        let second = fx
            .ledger
            .submit_answer(fx.user_id, fx.question_id, 1)
            .await
            .unwrap();

        assert_eq!(second.total_points, 20);
        assert_eq!(second.progress.completed_questions, 2);
        assert_eq!(second.progress.correct_answers, 2);
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let fx = fixture(0).await;

        let err = fx
            .ledger
            .submit_answer(fx.user_id, QuestionId::new(999), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::QuestionNotFound(_)));

        let err = fx
            .ledger
            .submit_answer(UserId::new(999), fx.question_id, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::UserNotFound(_)));
        assert!(
            fx.storage
                .progress
                .progress_for_user(UserId::new(999))
                .await
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn overflowing_credit_is_rejected() {
        let fx = fixture(u32::MAX).await;

        let err = fx
            .ledger
            .submit_answer(fx.user_id, fx.question_id, 1)
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::PointsOverflow));
        assert!(
            fx.storage
                .progress
                .progress_for_user(fx.user_id)
                .await
                .unwrap()
                .is_empty()
        );
    }
}
