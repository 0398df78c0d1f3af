//! AppState construction extracted from `main.rs`.

use std::sync::Arc;

use anyhow::Context;

use tb_assistant::RestAssistantClient;
use tb_domain::config::{Config, ConfigSeverity};
use tb_records::RestRecordsClient;
use tb_threads::{IdentityLockMap, ReplyCache, ThreadDirectory};

use crate::state::AppState;
use crate::transport::RestConnectorTransport;

/// Validate config, initialize every subsystem and return a fully-wired
/// [`AppState`].
pub fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Warning => tracing::warn!("config: {issue}"),
            ConfigSeverity::Error => tracing::error!("config: {issue}"),
        }
    }
    if issues.iter().any(|i| i.severity == ConfigSeverity::Error) {
        anyhow::bail!(
            "config validation failed with {} error(s)",
            issues
                .iter()
                .filter(|i| i.severity == ConfigSeverity::Error)
                .count()
        );
    }

    // ── Assistant backend ────────────────────────────────────────────
    let assistant_key = resolve_key(
        config.assistant.api_key.as_deref(),
        &config.assistant.api_key_env,
    );
    if assistant_key.is_none() {
        tracing::warn!(
            env = %config.assistant.api_key_env,
            "no assistant API key configured, backend calls will be unauthenticated"
        );
    }
    let assistant = Arc::new(
        RestAssistantClient::new(&config.assistant, assistant_key)
            .context("creating assistant client")?,
    );
    tracing::info!(
        base_url = %config.assistant.base_url,
        assistant_id = %config.assistant.assistant_id,
        poll_interval_ms = config.assistant.poll_interval_ms,
        "assistant backend ready"
    );

    // ── Record sink ──────────────────────────────────────────────────
    let records_key = resolve_key(
        config.records.api_key.as_deref(),
        &config.records.api_key_env,
    );
    let records = Arc::new(
        RestRecordsClient::new(&config.records, records_key)
            .context("creating records client")?,
    );
    tracing::info!(
        base_id = %config.records.base_id,
        messages_table = %config.records.messages_table,
        member_table = %config.records.member_table,
        "record sink ready"
    );

    // ── Outbound transport ───────────────────────────────────────────
    let transport = Arc::new(
        RestConnectorTransport::new(&config.connector)
            .context("creating connector transport")?,
    );
    tracing::info!(send_url = %config.connector.send_url, "connector transport ready");

    // ── Conversation state ───────────────────────────────────────────
    let directory = Arc::new(ThreadDirectory::new());
    let reply_cache = Arc::new(ReplyCache::new());
    let identity_locks = Arc::new(IdentityLockMap::new());

    if config.gating.enabled {
        tracing::info!(member_table = %config.records.member_table, "membership gate enabled");
    }

    Ok(AppState {
        config,
        assistant,
        records,
        transport,
        directory,
        reply_cache,
        identity_locks,
    })
}

/// A key set directly in the config wins; otherwise the named env var
/// is read once at startup.
fn resolve_key(configured: Option<&str>, env_name: &str) -> Option<String> {
    match configured {
        Some(key) if !key.is_empty() => Some(key.to_owned()),
        _ => std::env::var(env_name).ok().filter(|v| !v.is_empty()),
    }
}
