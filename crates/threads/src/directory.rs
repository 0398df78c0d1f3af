//! Conversation directory — one assistant thread per chat identity.
//!
//! Threads are created lazily on first contact and kept for the process
//! lifetime.  No deletion operation is exposed.

use std::collections::HashMap;

use parking_lot::RwLock;

use tb_assistant::AssistantBackend;
use tb_domain::error::Result;

/// Maps a chat identity to its assistant conversation thread id.
pub struct ThreadDirectory {
    threads: RwLock<HashMap<String, String>>,
}

impl Default for ThreadDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadDirectory {
    pub fn new() -> Self {
        Self {
            threads: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve the conversation thread for `identity`, creating one
    /// remotely on first contact.
    ///
    /// Lookups are idempotent: once a thread exists for an identity, every
    /// later call returns it without a remote call.  Callers hold the
    /// per-identity lock across a turn, so the check-then-create sequence
    /// cannot race for the same identity; the post-create re-check below
    /// covers unlocked callers as well.
    pub async fn resolve(
        &self,
        identity: &str,
        backend: &dyn AssistantBackend,
    ) -> Result<String> {
        // Fast path: thread already exists.
        {
            let threads = self.threads.read();
            if let Some(thread_id) = threads.get(identity) {
                return Ok(thread_id.clone());
            }
        }

        // Slow path: create the remote thread, then record the mapping.
        let created = backend.create_conversation().await?;

        let mut threads = self.threads.write();
        let thread_id = threads
            .entry(identity.to_owned())
            .or_insert_with(|| created.clone())
            .clone();

        if thread_id != created {
            // A concurrent resolve for the same identity won the insert;
            // the extra remote thread is abandoned.
            tracing::warn!(identity, abandoned = %created, "duplicate thread creation lost the race");
        } else {
            tracing::info!(identity, thread_id = %thread_id, "conversation thread created");
        }

        Ok(thread_id)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use tb_assistant::types::{RunStatus, ThreadMessage};

    /// Backend fake that mints sequential thread ids and counts creations.
    #[derive(Default)]
    struct CountingBackend {
        created: AtomicUsize,
    }

    #[async_trait]
    impl AssistantBackend for CountingBackend {
        async fn create_conversation(&self) -> Result<String> {
            let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(format!("ctx{n}"))
        }

        async fn append_user_message(&self, _: &str, _: &str) -> Result<()> {
            unreachable!("directory never appends")
        }

        async fn start_run(&self, _: &str, _: &str) -> Result<String> {
            unreachable!("directory never starts runs")
        }

        async fn run_status(&self, _: &str, _: &str) -> Result<RunStatus> {
            unreachable!("directory never polls")
        }

        async fn list_messages(&self, _: &str) -> Result<Vec<ThreadMessage>> {
            unreachable!("directory never lists messages")
        }
    }

    #[tokio::test]
    async fn same_identity_always_yields_same_thread() {
        let dir = ThreadDirectory::new();
        let backend = CountingBackend::default();

        let first = dir.resolve("628111", &backend).await.unwrap();
        let second = dir.resolve("628111", &backend).await.unwrap();
        let third = dir.resolve("628111", &backend).await.unwrap();

        assert_eq!(first, "ctx1");
        assert_eq!(second, first);
        assert_eq!(third, first);
        assert_eq!(backend.created.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn distinct_identities_get_distinct_threads() {
        let dir = ThreadDirectory::new();
        let backend = CountingBackend::default();

        let a = dir.resolve("628111", &backend).await.unwrap();
        let b = dir.resolve("628222", &backend).await.unwrap();

        assert_ne!(a, b);
        // Re-resolving keeps both mappings stable.
        assert_eq!(dir.resolve("628111", &backend).await.unwrap(), a);
        assert_eq!(dir.resolve("628222", &backend).await.unwrap(), b);
        assert_eq!(backend.created.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn backend_failure_leaves_no_mapping() {
        struct FailingBackend;

        #[async_trait]
        impl AssistantBackend for FailingBackend {
            async fn create_conversation(&self) -> Result<String> {
                Err(tb_domain::error::Error::Backend("boom".into()))
            }
            async fn append_user_message(&self, _: &str, _: &str) -> Result<()> {
                unreachable!()
            }
            async fn start_run(&self, _: &str, _: &str) -> Result<String> {
                unreachable!()
            }
            async fn run_status(&self, _: &str, _: &str) -> Result<RunStatus> {
                unreachable!()
            }
            async fn list_messages(&self, _: &str) -> Result<Vec<ThreadMessage>> {
                unreachable!()
            }
        }

        let dir = ThreadDirectory::new();
        assert!(dir.resolve("628111", &FailingBackend).await.is_err());

        // The next resolve starts from scratch with a working backend.
        let backend = CountingBackend::default();
        assert_eq!(dir.resolve("628111", &backend).await.unwrap(), "ctx1");
        assert_eq!(backend.created.load(Ordering::SeqCst), 1);
    }
}
