//! Run coordinator — one full assistant turn on an existing thread.
//!
//! A turn appends the user message, starts a run, polls until the run
//! leaves the pending family, then picks the newest assistant-authored
//! message and gates it through the reply cache.

use std::time::{Duration, Instant};

use tb_assistant::types::{MessageRole, RunStatus, ThreadMessage};
use tb_assistant::AssistantBackend;
use tb_domain::config::AssistantConfig;
use tb_domain::error::{Error, Result};
use tb_threads::ReplyCache;

/// The result of one assistant turn.
///
/// All three variants are successes; remote failures surface as `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// A reply that differs from the last one delivered on this thread.
    Reply(String),
    /// The assistant produced the same text as last time; do not resend.
    Suppressed,
    /// The run finished but no assistant-authored message exists.
    NoResponse,
}

/// Execute one turn on `thread_id` and classify the result.
///
/// Polling sleeps `poll_interval_ms` between status checks.  When
/// `run_deadline_secs` is unset the loop is unbounded, matching a backend
/// that is trusted to always reach a terminal status; setting it converts
/// a stalled run into a `Timeout` error.
pub async fn run_turn(
    backend: &dyn AssistantBackend,
    reply_cache: &ReplyCache,
    config: &AssistantConfig,
    thread_id: &str,
    text: &str,
) -> Result<TurnOutcome> {
    backend.append_user_message(thread_id, text).await?;
    let run_id = backend.start_run(thread_id, &config.assistant_id).await?;
    tracing::debug!(thread_id, run_id = %run_id, "run started");

    let terminal = poll_until_terminal(backend, config, thread_id, &run_id).await?;
    if terminal != RunStatus::Completed {
        // Still read the thread: it usually holds the previous assistant
        // reply, which the dedup gate suppresses.
        tracing::warn!(thread_id, run_id = %run_id, status = ?terminal, "run ended without completing");
    }

    let messages = backend.list_messages(thread_id).await?;
    let Some(newest) = newest_assistant_message(&messages) else {
        tracing::info!(thread_id, run_id = %run_id, "run ended without an assistant message");
        return Ok(TurnOutcome::NoResponse);
    };

    let reply = newest.joined_text();
    if reply_cache.is_duplicate(thread_id, &reply) {
        tracing::info!(thread_id, run_id = %run_id, "reply identical to last delivered, suppressing");
        return Ok(TurnOutcome::Suppressed);
    }

    Ok(TurnOutcome::Reply(reply))
}

/// Poll the run until it leaves the pending family and return its
/// terminal status.
///
/// The status is checked immediately after the run starts; a run that
/// completes fast pays no interval at all.  Only while the run stays
/// pending does the loop sleep between checks.
async fn poll_until_terminal(
    backend: &dyn AssistantBackend,
    config: &AssistantConfig,
    thread_id: &str,
    run_id: &str,
) -> Result<RunStatus> {
    let interval = Duration::from_millis(config.poll_interval_ms);
    let started = Instant::now();

    loop {
        let status = backend.run_status(thread_id, run_id).await?;
        if !status.is_pending() {
            return Ok(status);
        }

        tracing::debug!(thread_id, run_id, status = ?status, "run pending");

        if let Some(deadline) = config.run_deadline_secs {
            if started.elapsed() >= Duration::from_secs(deadline) {
                return Err(Error::Timeout(format!(
                    "run {run_id} still pending after {deadline}s"
                )));
            }
        }

        tokio::time::sleep(interval).await;
    }
}

/// Newest assistant-authored message by `created_at`.
///
/// Ties keep the earliest entry in list order, so a backend that returns
/// several messages with the same timestamp yields a stable pick.
fn newest_assistant_message(messages: &[ThreadMessage]) -> Option<&ThreadMessage> {
    messages
        .iter()
        .filter(|m| m.role == MessageRole::Assistant)
        .fold(None, |best: Option<&ThreadMessage>, m| match best {
            Some(b) if m.created_at > b.created_at => Some(m),
            None => Some(m),
            keep => keep,
        })
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
