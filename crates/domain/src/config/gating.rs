use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Membership gating
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Optional membership gate: when enabled, only phone numbers present in
/// the member table get an AI turn.  Disabled by default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatingConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Reply sent to non-members when the gate is enabled.
    #[serde(default = "d_rejection")]
    pub rejection_reply: String,
}

impl Default for GatingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            rejection_reply: d_rejection(),
        }
    }
}

fn d_rejection() -> String {
    "You are not registered. Please sign up as a member first.".into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_is_off_by_default() {
        assert!(!GatingConfig::default().enabled);
    }

    #[test]
    fn parses_enabled_gate() {
        let cfg: GatingConfig = toml::from_str("enabled = true").unwrap();
        assert!(cfg.enabled);
        assert!(!cfg.rejection_reply.is_empty());
    }
}
