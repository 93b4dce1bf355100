use leaf_core::model::{CategoryId, QuestionId, QuizCategory, QuizQuestion};

use super::SqliteRepository;
use super::mapping::{
    bool_to_i64, collect_rows, conn, key_id, map_category_row, map_question_row, options_to_json,
    ref_id, returned_id, ser, write_err,
};
use crate::repository::{NewCategoryRecord, NewQuestionRecord, QuizRepository, StorageError};

#[async_trait::async_trait]
impl QuizRepository for SqliteRepository {
    async fn insert_category(
        &self,
        category: NewCategoryRecord,
    ) -> Result<CategoryId, StorageError> {
        let row = sqlx::query(
            r"
            INSERT INTO quiz_categories
                (name, description, icon, color, difficulty, is_locked, required_level)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            RETURNING id
            ",
        )
        .bind(category.name)
        .bind(category.description)
        .bind(category.icon)
        .bind(category.color)
        .bind(category.difficulty.as_str())
        .bind(bool_to_i64(category.is_locked))
        .bind(i64::from(category.required_level))
        .fetch_one(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(CategoryId::new(returned_id(&row)?))
    }

    async fn list_categories(&self) -> Result<Vec<QuizCategory>, StorageError> {
        let rows = sqlx::query(
            r"
            SELECT id, name, description, icon, color, difficulty, is_locked, required_level
            FROM quiz_categories
            ORDER BY id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        collect_rows(rows, map_category_row)
    }

    async fn insert_question(
        &self,
        question: NewQuestionRecord,
    ) -> Result<QuestionId, StorageError> {
        let correct_answer = i64::try_from(question.correct_answer).map_err(ser)?;
        let row = sqlx::query(
            r"
            INSERT INTO quiz_questions
                (category_id, question, options, correct_answer, explanation, points)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            RETURNING id
            ",
        )
        .bind(ref_id(question.category_id.value())?)
        .bind(question.question)
        .bind(options_to_json(&question.options)?)
        .bind(correct_answer)
        .bind(question.explanation)
        .bind(i64::from(question.points))
        .fetch_one(&self.pool)
        .await
        .map_err(write_err)?;

        Ok(QuestionId::new(returned_id(&row)?))
    }

    async fn get_question(&self, id: QuestionId) -> Result<Option<QuizQuestion>, StorageError> {
        let Some(id) = key_id(id.value()) else {
            return Ok(None);
        };
        let row = sqlx::query(
            r"
            SELECT id, category_id, question, options, correct_answer, explanation, points
            FROM quiz_questions
            WHERE id = ?1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.as_ref().map(map_question_row).transpose()
    }

    async fn questions_for_category(
        &self,
        category_id: CategoryId,
    ) -> Result<Vec<QuizQuestion>, StorageError> {
        let Some(category_id) = key_id(category_id.value()) else {
            return Ok(Vec::new());
        };
        let rows = sqlx::query(
            r"
            SELECT id, category_id, question, options, correct_answer, explanation, points
            FROM quiz_questions
            WHERE category_id = ?1
            ORDER BY id ASC
            ",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await
        .map_err(conn)?;

        collect_rows(rows, map_question_row)
    }
}
