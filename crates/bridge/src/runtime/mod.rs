//! Ingestion runtime — what happens to each inbound chat message.
//!
//! Entry point: [`handle_inbound`] takes the raw sender id and message
//! body, persists the message, applies the membership gate, and drives
//! one assistant turn whose outcome decides the outbound action.
//!
//! Remote failures never escape this module: they are converted into a
//! [`Disposition`] (and at most one apology send) at the boundary.

pub mod turn;

#[cfg(test)]
pub(crate) mod testutil;

use serde::Serialize;

use tb_records::InboundMessageRecord;

use crate::runtime::turn::{run_turn, TurnOutcome};
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Disposition
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// What the bridge did with one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// A novel reply was delivered to the sender.
    Replied,
    /// The assistant repeated itself; nothing was sent.
    Suppressed,
    /// The run completed without an assistant message; nothing was sent.
    NoResponse,
    /// The membership gate turned the sender away.
    Rejected,
    /// Empty message body; persisted but no turn was run.
    Ignored,
    /// The turn failed; the sender got the fixed apology.
    Failed,
}

/// Bare chat identity: the raw sender id with any channel suffix
/// removed (`"628111@s.whatsapp.net"` becomes `"628111"`).
pub fn chat_identity(raw_sender: &str) -> &str {
    match raw_sender.find('@') {
        Some(at) => &raw_sender[..at],
        None => raw_sender,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// handle_inbound — the ingestion pipeline
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process one inbound message end to end.
///
/// Persistence is spawned off the turn path and can neither block nor
/// abort the turn.  The per-identity lock keeps turns strictly serial
/// within a conversation; distinct identities proceed concurrently.
pub async fn handle_inbound(state: &AppState, raw_sender: &str, body: &str) -> Disposition {
    let identity = chat_identity(raw_sender).to_owned();

    // ── 1. Best-effort persistence ────────────────────────────────
    {
        let records = state.records.clone();
        let record = InboundMessageRecord::now(identity.clone(), body);
        tokio::spawn(async move {
            if let Err(e) = records.append_message(record).await {
                tracing::warn!(error = %e, "message persistence failed");
            }
        });
    }

    // ── 2. Membership gate (disabled by default) ──────────────────
    if state.config.gating.enabled {
        let admitted = match state.records.member_exists(&identity).await {
            Ok(found) => found,
            Err(e) => {
                // Fail closed: an unreachable registry rejects like a miss.
                tracing::warn!(identity = %identity, error = %e, "membership lookup failed");
                false
            }
        };
        if !admitted {
            send_best_effort(state, &identity, &state.config.gating.rejection_reply).await;
            return Disposition::Rejected;
        }
    }

    // ── 3. Empty body: nothing to converse about ──────────────────
    // Exactly empty only; whitespace still gets a turn.
    if body.is_empty() {
        tracing::debug!(identity = %identity, "empty message body, skipping turn");
        return Disposition::Ignored;
    }

    // ── 4. Serialize turns per identity ───────────────────────────
    let _permit = match state.identity_locks.acquire(&identity).await {
        Ok(p) => p,
        Err(e) => {
            tracing::error!(identity = %identity, error = %e, "identity lock unavailable");
            return Disposition::Failed;
        }
    };

    // ── 5. Resolve the conversation thread ────────────────────────
    let thread_id = match state
        .directory
        .resolve(&identity, state.assistant.as_ref())
        .await
    {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(identity = %identity, error = %e, "thread resolution failed");
            send_best_effort(state, &identity, &state.config.connector.apology_reply).await;
            return Disposition::Failed;
        }
    };

    // ── 6. Run the turn and act on the outcome ────────────────────
    match run_turn(
        state.assistant.as_ref(),
        &state.reply_cache,
        &state.config.assistant,
        &thread_id,
        body,
    )
    .await
    {
        Ok(TurnOutcome::Reply(text)) => {
            // The cache mirrors the delivery decision, not the delivery
            // result: a lost send must not cause a resend later.
            state.reply_cache.record(&thread_id, &text);
            if let Err(e) = state.transport.reply(&identity, &text).await {
                tracing::warn!(identity = %identity, error = %e, "reply delivery failed");
            }
            Disposition::Replied
        }
        Ok(TurnOutcome::Suppressed) => Disposition::Suppressed,
        Ok(TurnOutcome::NoResponse) => Disposition::NoResponse,
        Err(e) => {
            tracing::error!(identity = %identity, error = %e, "turn failed");
            send_best_effort(state, &identity, &state.config.connector.apology_reply).await;
            Disposition::Failed
        }
    }
}

async fn send_best_effort(state: &AppState, identity: &str, text: &str) {
    if let Err(e) = state.transport.reply(identity, text).await {
        tracing::warn!(identity = %identity, error = %e, "outbound send failed");
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::time::Duration;

    use tb_assistant::types::RunStatus;
    use tb_domain::config::Config;
    use tb_threads::{IdentityLockMap, ReplyCache, ThreadDirectory};

    use crate::runtime::testutil::{
        assistant_msg, fast_assistant_config, user_msg, RecordingSink, RecordingTransport,
        ScriptedBackend,
    };

    const SENDER: &str = "628111@s.whatsapp.net";

    fn build_state(
        backend: ScriptedBackend,
        sink: RecordingSink,
        transport: RecordingTransport,
        mut config: Config,
    ) -> (
        AppState,
        Arc<ScriptedBackend>,
        Arc<RecordingSink>,
        Arc<RecordingTransport>,
    ) {
        config.assistant = fast_assistant_config();
        let backend = Arc::new(backend);
        let sink = Arc::new(sink);
        let transport = Arc::new(transport);
        let state = AppState {
            config: Arc::new(config),
            assistant: backend.clone(),
            records: sink.clone(),
            transport: transport.clone(),
            directory: Arc::new(ThreadDirectory::new()),
            reply_cache: Arc::new(ReplyCache::new()),
            identity_locks: Arc::new(IdentityLockMap::new()),
        };
        (state, backend, sink, transport)
    }

    /// Let spawned persistence tasks run.
    async fn settle() {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[test]
    fn identity_strips_the_channel_suffix() {
        assert_eq!(chat_identity("628111@s.whatsapp.net"), "628111");
        assert_eq!(chat_identity("628111"), "628111");
        assert_eq!(chat_identity("a@b@c"), "a");
    }

    #[tokio::test]
    async fn novel_reply_is_delivered_and_cached() {
        let backend = ScriptedBackend::new()
            .with_statuses([RunStatus::Queued, RunStatus::Completed])
            .with_messages([assistant_msg("msg_a1", 110, "Hello!")]);
        let (state, _, sink, transport) = build_state(
            backend,
            RecordingSink::new(),
            RecordingTransport::new(),
            Config::default(),
        );

        let disposition = handle_inbound(&state, SENDER, "hi").await;

        assert_eq!(disposition, Disposition::Replied);
        assert_eq!(transport.sent(), vec![("628111".into(), "Hello!".into())]);
        assert_eq!(
            state.reply_cache.last_reply("ctx1").as_deref(),
            Some("Hello!")
        );

        settle().await;
        let appends = sink.appends.lock().clone();
        assert_eq!(appends.len(), 1);
        assert_eq!(appends[0].phone_number, "628111");
        assert_eq!(appends[0].message, "hi");
    }

    #[tokio::test]
    async fn repeated_reply_is_suppressed_without_a_send() {
        let backend = ScriptedBackend::new()
            .with_statuses([RunStatus::Completed, RunStatus::Completed])
            .with_messages([assistant_msg("msg_a1", 110, "Hello!")]);
        let (state, _, _, transport) = build_state(
            backend,
            RecordingSink::new(),
            RecordingTransport::new(),
            Config::default(),
        );

        assert_eq!(handle_inbound(&state, SENDER, "hi").await, Disposition::Replied);
        assert_eq!(
            handle_inbound(&state, SENDER, "hi again").await,
            Disposition::Suppressed
        );

        // One delivery total; the cache still holds the delivered text.
        assert_eq!(transport.sent().len(), 1);
        assert_eq!(
            state.reply_cache.last_reply("ctx1").as_deref(),
            Some("Hello!")
        );
    }

    #[tokio::test]
    async fn persistence_failure_does_not_block_the_reply() {
        let backend = ScriptedBackend::new()
            .with_statuses([RunStatus::Completed])
            .with_messages([assistant_msg("msg_a1", 110, "Hello!")]);
        let mut sink = RecordingSink::new();
        sink.fail_appends = true;
        let (state, _, _, transport) = build_state(
            backend,
            sink,
            RecordingTransport::new(),
            Config::default(),
        );

        let disposition = handle_inbound(&state, SENDER, "hi").await;

        assert_eq!(disposition, Disposition::Replied);
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn empty_body_is_persisted_but_runs_no_turn() {
        let backend = ScriptedBackend::new();
        let (state, backend, sink, transport) = build_state(
            backend,
            RecordingSink::new(),
            RecordingTransport::new(),
            Config::default(),
        );

        let disposition = handle_inbound(&state, SENDER, "").await;

        assert_eq!(disposition, Disposition::Ignored);
        assert_eq!(backend.threads_created(), 0);
        assert!(transport.sent().is_empty());

        settle().await;
        assert_eq!(sink.appends.lock().len(), 1);
    }

    #[tokio::test]
    async fn whitespace_body_still_gets_a_turn() {
        let backend = ScriptedBackend::new()
            .with_statuses([RunStatus::Completed])
            .with_messages([assistant_msg("msg_a1", 110, "Hello!")]);
        let (state, _, _, transport) = build_state(
            backend,
            RecordingSink::new(),
            RecordingTransport::new(),
            Config::default(),
        );

        let disposition = handle_inbound(&state, SENDER, "   ").await;

        assert_eq!(disposition, Disposition::Replied);
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn gate_outranks_the_empty_body_check() {
        let backend = ScriptedBackend::new();
        let mut config = Config::default();
        config.gating.enabled = true;
        let (state, _, _, transport) = build_state(
            backend,
            RecordingSink::new(),
            RecordingTransport::new(),
            config,
        );

        let disposition = handle_inbound(&state, SENDER, "").await;

        assert_eq!(disposition, Disposition::Rejected);
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn missing_assistant_message_sends_nothing() {
        let backend = ScriptedBackend::new()
            .with_statuses([RunStatus::Completed])
            .with_messages([user_msg("msg_u1", 100, "hi")]);
        let (state, _, _, transport) = build_state(
            backend,
            RecordingSink::new(),
            RecordingTransport::new(),
            Config::default(),
        );

        let disposition = handle_inbound(&state, SENDER, "hi").await;

        assert_eq!(disposition, Disposition::NoResponse);
        assert!(transport.sent().is_empty());
        assert!(state.reply_cache.last_reply("ctx1").is_none());
    }

    #[tokio::test]
    async fn failed_turn_sends_exactly_one_apology() {
        let backend = ScriptedBackend::new().failing_start();
        let (state, _, _, transport) = build_state(
            backend,
            RecordingSink::new(),
            RecordingTransport::new(),
            Config::default(),
        );

        let disposition = handle_inbound(&state, SENDER, "hi").await;

        assert_eq!(disposition, Disposition::Failed);
        assert_eq!(
            transport.sent(),
            vec![(
                "628111".into(),
                state.config.connector.apology_reply.clone()
            )]
        );
        assert!(state.reply_cache.last_reply("ctx1").is_none());
    }

    #[tokio::test]
    async fn gate_rejects_an_unknown_sender() {
        let backend = ScriptedBackend::new();
        let mut config = Config::default();
        config.gating.enabled = true;
        let (state, backend, _, transport) = build_state(
            backend,
            RecordingSink::new(),
            RecordingTransport::new(),
            config,
        );

        let disposition = handle_inbound(&state, SENDER, "hi").await;

        assert_eq!(disposition, Disposition::Rejected);
        assert_eq!(backend.threads_created(), 0);
        assert_eq!(
            transport.sent(),
            vec![(
                "628111".into(),
                state.config.gating.rejection_reply.clone()
            )]
        );
    }

    #[tokio::test]
    async fn gate_admits_a_registered_member() {
        let backend = ScriptedBackend::new()
            .with_statuses([RunStatus::Completed])
            .with_messages([assistant_msg("msg_a1", 110, "Hello!")]);
        let mut sink = RecordingSink::new();
        sink.members = vec!["628111".into()];
        let mut config = Config::default();
        config.gating.enabled = true;
        let (state, _, _, transport) =
            build_state(backend, sink, RecordingTransport::new(), config);

        let disposition = handle_inbound(&state, SENDER, "hi").await;

        assert_eq!(disposition, Disposition::Replied);
        assert_eq!(transport.sent().len(), 1);
    }

    #[tokio::test]
    async fn gate_lookup_failure_rejects() {
        let backend = ScriptedBackend::new();
        let mut sink = RecordingSink::new();
        sink.fail_lookups = true;
        let mut config = Config::default();
        config.gating.enabled = true;
        let (state, backend, _, _) =
            build_state(backend, sink, RecordingTransport::new(), config);

        let disposition = handle_inbound(&state, SENDER, "hi").await;

        assert_eq!(disposition, Disposition::Rejected);
        assert_eq!(backend.threads_created(), 0);
    }

    #[tokio::test]
    async fn lost_send_does_not_clear_the_cache() {
        let backend = ScriptedBackend::new()
            .with_statuses([RunStatus::Completed])
            .with_messages([assistant_msg("msg_a1", 110, "Hello!")]);
        let mut transport = RecordingTransport::new();
        transport.fail_sends = true;
        let (state, _, _, _) = build_state(
            backend,
            RecordingSink::new(),
            transport,
            Config::default(),
        );

        let disposition = handle_inbound(&state, SENDER, "hi").await;

        // Delivery was decided; the failed send is logged only.
        assert_eq!(disposition, Disposition::Replied);
        assert_eq!(
            state.reply_cache.last_reply("ctx1").as_deref(),
            Some("Hello!")
        );
    }
}
