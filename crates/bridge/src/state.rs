use std::sync::Arc;

use tb_assistant::AssistantBackend;
use tb_domain::config::Config;
use tb_records::RecordSink;
use tb_threads::{IdentityLockMap, ReplyCache, ThreadDirectory};

use crate::transport::ChatTransport;

/// Shared application state passed to all API handlers.
///
/// Fields are grouped by concern:
/// - **Core services** — config, assistant backend, record sink, transport
/// - **Conversation state** — thread directory, reply cache, identity locks
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub assistant: Arc<dyn AssistantBackend>,
    pub records: Arc<dyn RecordSink>,
    pub transport: Arc<dyn ChatTransport>,

    // ── Conversation state ────────────────────────────────────────────
    pub directory: Arc<ThreadDirectory>,
    pub reply_cache: Arc<ReplyCache>,
    pub identity_locks: Arc<IdentityLockMap>,
}
