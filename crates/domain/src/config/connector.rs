use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat connector (outbound sends)
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Endpoint the bridge POSTs outbound replies to
    /// (`{recipient, text}` JSON body).
    #[serde(default = "d_send_url")]
    pub send_url: String,
    /// Fixed reply sent to the user when a turn fails.
    #[serde(default = "d_apology")]
    pub apology_reply: String,
    #[serde(default = "d_10000")]
    pub timeout_ms: u64,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            send_url: d_send_url(),
            apology_reply: d_apology(),
            timeout_ms: 10000,
        }
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_send_url() -> String {
    "http://127.0.0.1:3001/send".into()
}
fn d_apology() -> String {
    "Sorry, I encountered an error.".into()
}
fn d_10000() -> u64 {
    10000
}
