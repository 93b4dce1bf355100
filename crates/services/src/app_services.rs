use std::sync::Arc;

use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::locks::UserLocks;
use crate::progress_ledger::ProgressLedger;
use crate::query_service::QueryService;
use crate::reward_ledger::RewardLedger;
use crate::seed::{SeedOutcome, seed_demo};
use crate::user_service::UserService;

/// Assembles app-facing services over one storage backend.
///
/// Both ledgers share a single `UserLocks` table.
#[derive(Clone)]
pub struct AppServices {
    clock: Clock,
    storage: Storage,
    progress_ledger: Arc<ProgressLedger>,
    reward_ledger: Arc<RewardLedger>,
    queries: Arc<QueryService>,
    users: Arc<UserService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(db_url: &str, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock))
    }

    /// Build services over a fresh in-memory store.
    #[must_use]
    pub fn in_memory(clock: Clock) -> Self {
        Self::from_storage(Storage::in_memory(), clock)
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock) -> Self {
        let locks = UserLocks::new();

        let progress_ledger = Arc::new(ProgressLedger::new(
            clock,
            Arc::clone(&storage.quiz),
            Arc::clone(&storage.ledger),
            locks.clone(),
        ));
        let reward_ledger = Arc::new(RewardLedger::new(
            clock,
            Arc::clone(&storage.users),
            Arc::clone(&storage.rewards),
            Arc::clone(&storage.ledger),
            locks,
        ));
        let queries = Arc::new(QueryService::new(clock, &storage));
        let users = Arc::new(UserService::new(
            clock,
            Arc::clone(&storage.users),
            Arc::clone(&storage.achievements),
        ));

        Self {
            clock,
            storage,
            progress_ledger,
            reward_ledger,
            queries,
            users,
        }
    }

    /// Seed the demo dataset into this backend if it is not there yet.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if any seed insert fails.
    pub async fn seed_demo(&self) -> Result<SeedOutcome, AppServicesError> {
        seed_demo(&self.storage, self.clock.now()).await
    }

    #[must_use]
    pub fn progress_ledger(&self) -> Arc<ProgressLedger> {
        Arc::clone(&self.progress_ledger)
    }

    #[must_use]
    pub fn reward_ledger(&self) -> Arc<RewardLedger> {
        Arc::clone(&self.reward_ledger)
    }

    #[must_use]
    pub fn queries(&self) -> Arc<QueryService> {
        Arc::clone(&self.queries)
    }

    #[must_use]
    pub fn users(&self) -> Arc<UserService> {
        Arc::clone(&self.users)
    }
}
