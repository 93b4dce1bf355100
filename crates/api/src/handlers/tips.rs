use actix_web::{get, web};

use leaf_core::model::DailyTip;

use crate::error::ApiResult;
use crate::state::HttpState;

/// Today's tip, or JSON `null` when there is none to show.
#[get("/api/daily-tip")]
pub async fn daily_tip(state: web::Data<HttpState>) -> ApiResult<web::Json<Option<DailyTip>>> {
    Ok(web::Json(state.services.queries().todays_tip().await?))
}
