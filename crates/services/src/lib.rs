#![forbid(unsafe_code)]

pub mod app_services;
pub mod error;
pub mod locks;
pub mod progress_ledger;
pub mod query_service;
pub mod reward_ledger;
pub mod seed;
pub mod user_service;

pub use leaf_core::Clock;

pub use app_services::AppServices;
pub use error::{AppServicesError, ErrorKind, LedgerError, QueryError, UserServiceError};
pub use locks::UserLocks;
pub use progress_ledger::{AnswerResult, ProgressLedger};
pub use query_service::QueryService;
pub use reward_ledger::RewardLedger;
pub use seed::{DEMO_USERNAME, SeedOutcome, seed_demo};
pub use user_service::UserService;
