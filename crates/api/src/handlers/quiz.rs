use actix_web::{get, post, web};
use tracing::debug;

use leaf_core::model::{CategoryId, QuizCategory, QuizQuestion};

use crate::dto::{AnswerRequest, AnswerResponse, QuestionsQuery};
use crate::error::ApiResult;
use crate::state::HttpState;

#[get("/api/quiz/categories")]
pub async fn categories(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<QuizCategory>>> {
    Ok(web::Json(state.services.queries().categories().await?))
}

/// A random selection from the category; `limit` defaults to 5.
#[get("/api/quiz/questions/{category_id}")]
pub async fn random_questions(
    state: web::Data<HttpState>,
    path: web::Path<CategoryId>,
    query: web::Query<QuestionsQuery>,
) -> ApiResult<web::Json<Vec<QuizQuestion>>> {
    let limit = query.into_inner().effective_limit();
    let questions = state
        .services
        .queries()
        .random_questions(path.into_inner(), limit)
        .await?;
    debug!(served = questions.len(), limit, "questions served");
    Ok(web::Json(questions))
}

#[post("/api/quiz/answer")]
pub async fn submit_answer(
    state: web::Data<HttpState>,
    body: web::Json<AnswerRequest>,
) -> ApiResult<web::Json<AnswerResponse>> {
    let AnswerRequest {
        question_id,
        selected_answer,
    } = body.into_inner();
    let result = state
        .services
        .progress_ledger()
        .submit_answer(state.current_user, question_id, selected_answer)
        .await?;
    Ok(web::Json(result.into()))
}
