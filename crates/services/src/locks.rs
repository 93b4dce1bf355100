use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use leaf_core::model::UserId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slots = Arc<Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>>;

/// Per-user async locks shared by the ledgers.
///
/// Holding a user's guard serialises every balance read-check-commit for that
/// user; other users are unaffected. Cloning shares the same lock table.
/// A slot lives only while someone holds or waits for it.
#[derive(Clone, Default)]
pub struct UserLocks {
    slots: Slots,
}

/// Exclusive access to one user's balance, released on drop.
pub struct UserGuard {
    guard: Option<OwnedMutexGuard<()>>,
    user_id: UserId,
    slots: Slots,
}

fn slots_of(slots: &Slots) -> MutexGuard<'_, HashMap<UserId, Arc<AsyncMutex<()>>>> {
    slots.lock().unwrap_or_else(PoisonError::into_inner)
}

impl UserLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `user_id`'s balance.
    pub async fn lock(&self, user_id: UserId) -> UserGuard {
        let slot = Arc::clone(slots_of(&self.slots).entry(user_id).or_default());
        let guard = slot.lock_owned().await;
        UserGuard {
            guard: Some(guard),
            user_id,
            slots: Arc::clone(&self.slots),
        }
    }

    /// Number of users that currently have a slot.
    #[must_use]
    pub fn tracked_users(&self) -> usize {
        slots_of(&self.slots).len()
    }
}

impl Drop for UserGuard {
    fn drop(&mut self) {
        // Under the table lock nobody can clone the slot, so a count of one
        // means the table holds the only reference.
        let mut slots = slots_of(&self.slots);
        drop(self.guard.take());
        if slots
            .get(&self.user_id)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            slots.remove(&self.user_id);
        }
    }
}
