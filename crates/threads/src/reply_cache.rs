//! Reply deduplication — remembers the last delivered reply per thread.
//!
//! A candidate reply is delivered only when it differs from the previous
//! reply on the same thread.  The cache holds exactly one entry per thread
//! and is recorded only on delivery, so a suppressed or failed turn leaves
//! the gate unchanged.

use std::collections::HashMap;

use parking_lot::RwLock;

pub struct ReplyCache {
    last: RwLock<HashMap<String, String>>,
}

impl Default for ReplyCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplyCache {
    pub fn new() -> Self {
        Self {
            last: RwLock::new(HashMap::new()),
        }
    }

    /// True when `candidate` matches the last delivered reply on `thread_id`.
    ///
    /// An empty cache entry never matches, so the first reply on any thread
    /// is always novel.
    pub fn is_duplicate(&self, thread_id: &str, candidate: &str) -> bool {
        self.last
            .read()
            .get(thread_id)
            .is_some_and(|prev| prev == candidate)
    }

    /// Record `reply` as the last delivered reply on `thread_id`,
    /// replacing any previous entry.
    pub fn record(&self, thread_id: &str, reply: &str) {
        self.last
            .write()
            .insert(thread_id.to_owned(), reply.to_owned());
    }

    /// Last delivered reply on `thread_id`, if any.
    pub fn last_reply(&self, thread_id: &str) -> Option<String> {
        self.last.read().get(thread_id).cloned()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
