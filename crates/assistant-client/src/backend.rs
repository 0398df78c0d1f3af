//! The `AssistantBackend` trait defines the interface the bridge runtime
//! drives one turn through (REST in production, a scripted fake in tests).

use async_trait::async_trait;
use tb_domain::error::Result;

use crate::types::{RunStatus, ThreadMessage};

/// Abstraction over the assistant backend's thread/run/message surface.
///
/// All methods return `tb_domain::error::Result`; implementations map
/// transport failures to `Error::Http` / `Error::Timeout` / `Error::Auth`.
#[async_trait]
pub trait AssistantBackend: Send + Sync {
    /// Create a fresh conversation thread (POST /threads).
    async fn create_conversation(&self) -> Result<String>;

    /// Append a user-role message to a thread (POST /threads/{id}/messages).
    async fn append_user_message(&self, thread_id: &str, text: &str) -> Result<()>;

    /// Start an asynchronous run bound to an assistant configuration
    /// (POST /threads/{id}/runs).  Returns the run id.
    async fn start_run(&self, thread_id: &str, assistant_id: &str) -> Result<String>;

    /// Retrieve the current status of a run (GET /threads/{id}/runs/{rid}).
    async fn run_status(&self, thread_id: &str, run_id: &str) -> Result<RunStatus>;

    /// List the thread's messages, newest first per the backend's default
    /// ordering (GET /threads/{id}/messages).
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>>;
}
