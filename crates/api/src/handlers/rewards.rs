use actix_web::{get, post, web};

use leaf_core::model::{Reward, UserId, UserReward};

use crate::dto::RedeemRequest;
use crate::error::ApiResult;
use crate::state::HttpState;

/// Catalog entries that can currently be redeemed.
#[get("/api/rewards")]
pub async fn available_rewards(state: web::Data<HttpState>) -> ApiResult<web::Json<Vec<Reward>>> {
    Ok(web::Json(state.services.queries().available_rewards().await?))
}

#[get("/api/rewards/user/current")]
pub async fn current_user_rewards(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<UserReward>>> {
    let rewards = state.services.queries().user_rewards(state.current_user).await?;
    Ok(web::Json(rewards))
}

#[get("/api/rewards/user/{user_id}")]
pub async fn user_rewards(
    state: web::Data<HttpState>,
    path: web::Path<UserId>,
) -> ApiResult<web::Json<Vec<UserReward>>> {
    let rewards = state.services.queries().user_rewards(path.into_inner()).await?;
    Ok(web::Json(rewards))
}

#[post("/api/rewards/redeem")]
pub async fn redeem(
    state: web::Data<HttpState>,
    body: web::Json<RedeemRequest>,
) -> ApiResult<web::Json<UserReward>> {
    let redeemed = state
        .services
        .reward_ledger()
        .redeem(state.current_user, body.reward_id)
        .await?;
    Ok(web::Json(redeemed))
}
