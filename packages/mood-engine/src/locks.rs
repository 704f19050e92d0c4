//! Per-user serialisation of session read-modify-write cycles

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::models::UserId;

/// Lock table keyed by user id.
///
/// Requests for the same user queue behind each other; different users never
/// contend. Entries are created lazily and kept for the life of the table.
#[derive(Debug, Default)]
pub struct UserLocks {
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the user's session
    pub async fn acquire(&self, user_id: UserId) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the shard lock is released before awaiting
        let lock = self
            .locks
            .entry(user_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }

    /// Number of users that have taken a lock so far
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
