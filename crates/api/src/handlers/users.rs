use actix_web::{get, web};

use leaf_core::model::{User, UserAchievement, UserId};

use crate::error::ApiResult;
use crate::state::HttpState;

#[get("/api/user/current")]
pub async fn current_user(state: web::Data<HttpState>) -> ApiResult<web::Json<User>> {
    let user = state.services.users().get(state.current_user).await?;
    Ok(web::Json(user))
}

#[get("/api/user/{id}")]
pub async fn user_by_id(
    state: web::Data<HttpState>,
    path: web::Path<UserId>,
) -> ApiResult<web::Json<User>> {
    let user = state.services.users().get(path.into_inner()).await?;
    Ok(web::Json(user))
}

#[get("/api/achievements/{user_id}")]
pub async fn user_achievements(
    state: web::Data<HttpState>,
    path: web::Path<UserId>,
) -> ApiResult<web::Json<Vec<UserAchievement>>> {
    let achievements = state.services.queries().achievements(path.into_inner()).await?;
    Ok(web::Json(achievements))
}
