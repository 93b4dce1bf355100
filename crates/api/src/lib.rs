#![forbid(unsafe_code)]
//! HTTP/JSON surface over the leaf ledger services.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod state;
pub mod trace;

use actix_web::web;

pub use error::{ApiError, ApiResult};
pub use state::HttpState;
pub use trace::RequestTrace;

/// Registers shared state, extractor configs and every route.
///
/// `/current` routes are registered ahead of their `{id}` siblings.
pub fn configure(state: HttpState) -> impl Fn(&mut web::ServiceConfig) + Clone + Send + 'static {
    let state = web::Data::new(state);
    move |cfg: &mut web::ServiceConfig| {
        cfg.app_data(web::Data::clone(&state))
            .app_data(error::json_config())
            .app_data(error::path_config())
            .app_data(error::query_config())
            .service(handlers::health::health)
            .service(handlers::users::current_user)
            .service(handlers::users::user_by_id)
            .service(handlers::users::user_achievements)
            .service(handlers::quiz::categories)
            .service(handlers::quiz::random_questions)
            .service(handlers::quiz::submit_answer)
            .service(handlers::progress::current_progress)
            .service(handlers::progress::user_progress)
            .service(handlers::rewards::available_rewards)
            .service(handlers::rewards::current_user_rewards)
            .service(handlers::rewards::user_rewards)
            .service(handlers::rewards::redeem)
            .service(handlers::tips::daily_tip);
    }
}
