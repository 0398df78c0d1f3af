use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Assistant backend connection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    #[serde(default = "d_base_url")]
    pub base_url: String,
    /// API key. When unset, the env var named by `api_key_env` is read at
    /// startup instead.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "d_api_key_env")]
    pub api_key_env: String,
    /// The assistant configuration id every run is bound to (e.g. `asst_…`).
    #[serde(default)]
    pub assistant_id: String,
    /// Cadence of the run-status poll loop.
    #[serde(default = "d_1000")]
    pub poll_interval_ms: u64,
    /// Optional cap on how long a single run may stay pending.  When unset,
    /// polling is unbounded and a backend that never completes a run stalls
    /// that turn (never the process).
    #[serde(default)]
    pub run_deadline_secs: Option<u64>,
    #[serde(default = "d_30000")]
    pub timeout_ms: u64,
    #[serde(default = "d_3")]
    pub max_retries: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            base_url: d_base_url(),
            api_key: None,
            api_key_env: d_api_key_env(),
            assistant_id: String::new(),
            poll_interval_ms: 1000,
            run_deadline_secs: None,
            timeout_ms: 30000,
            max_retries: 3,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_base_url() -> String {
    "https://api.openai.com/v1".into()
}
fn d_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn d_1000() -> u64 {
    1000
}
fn d_30000() -> u64 {
    30000
}
fn d_3() -> u32 {
    3
}
