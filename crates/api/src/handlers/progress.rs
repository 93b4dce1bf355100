use actix_web::{get, web};

use leaf_core::model::{UserId, UserProgress};

use crate::error::ApiResult;
use crate::state::HttpState;

#[get("/api/progress/current")]
pub async fn current_progress(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<UserProgress>>> {
    let progress = state.services.queries().user_progress(state.current_user).await?;
    Ok(web::Json(progress))
}

#[get("/api/progress/{user_id}")]
pub async fn user_progress(
    state: web::Data<HttpState>,
    path: web::Path<UserId>,
) -> ApiResult<web::Json<Vec<UserProgress>>> {
    let progress = state.services.queries().user_progress(path.into_inner()).await?;
    Ok(web::Json(progress))
}
