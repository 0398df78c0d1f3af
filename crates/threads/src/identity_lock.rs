//! Serializes assistant turns per chat identity.
//!
//! The backend tolerates only one active run per conversation thread, so
//! when a sender fires a second message while their first turn is still
//! polling, the second turn must queue behind it.  Distinct identities
//! never contend.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

pub struct IdentityLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for IdentityLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Take the turn permit for `identity`, waiting while another turn
    /// holds it.  The permit releases on drop, which ends the turn's
    /// exclusive window over the identity's thread.
    pub async fn acquire(&self, identity: &str) -> Result<OwnedSemaphorePermit, IdentityBusy> {
        let sem = Arc::clone(
            self.locks
                .lock()
                .entry(identity.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1))),
        );

        sem.acquire_owned().await.map_err(|_| IdentityBusy)
    }
}

/// The identity's semaphore was closed out from under a waiter.  Never
/// produced in normal operation; surfaced so callers fail a turn instead
/// of panicking.
#[derive(Debug)]
pub struct IdentityBusy;

impl std::fmt::Display for IdentityBusy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "a turn is already in progress for this identity")
    }
}

impl std::error::Error for IdentityBusy {}
