//! Shared HTTP adapter state.

use leaf_core::model::UserId;
use services::AppServices;

/// Dependency bundle handed to handlers through `web::Data`.
#[derive(Clone)]
pub struct HttpState {
    pub services: AppServices,
    /// User that `/current` routes resolve to.
    pub current_user: UserId,
}

impl HttpState {
    #[must_use]
    pub fn new(services: AppServices, current_user: UserId) -> Self {
        Self {
            services,
            current_user,
        }
    }
}
