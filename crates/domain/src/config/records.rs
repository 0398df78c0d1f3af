use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Record sink connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// API key. When unset, the env var named by `api_key_env` is read at
    /// startup instead.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// The base (workspace) the tables live in.
    #[serde(default)]
    pub base_id: String,
    #[serde(default = "d_messages_table")]
    pub messages_table: String,
    #[serde(default = "d_member_table")]
    pub member_table: String,
    #[serde(default = "d_8000")]
    pub timeout_ms: u64,
    #[serde(default = "d_3")]
    pub max_retries: u32,
}

impl Default for RecordsConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            api_key: None,
            api_key_env: d_api_key_env(),
            base_id: String::new(),
            messages_table: d_messages_table(),
            member_table: d_member_table(),
            timeout_ms: 8000,
            max_retries: 3,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "https://api.airtable.com/v0".into()
}
fn d_api_key_env() -> String {
    "AIRTABLE_API_KEY".into()
}
fn d_messages_table() -> String {
    "Messages".into()
}
fn d_member_table() -> String {
    "Member".into()
}
fn d_8000() -> u64 {
    8000
}
fn d_3() -> u32 {
    3
}
