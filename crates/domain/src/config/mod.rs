mod assistant;
mod connector;
mod gating;
mod records;
mod server;

pub use assistant::*;
pub use connector::*;
pub use gating::*;
pub use records::*;
pub use server::*;

use serde::{Deserialize, Serialize};
use std::fmt;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Top-level config
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub assistant: AssistantConfig,
    #[serde(default)]
    pub records: RecordsConfig,
    #[serde(default)]
    pub connector: ConnectorConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub gating: GatingConfig,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Config validation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Severity level for a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSeverity {
    Error,
    Warning,
}

/// A single configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigError {
    pub severity: ConfigSeverity,
    pub field: String,
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.severity {
            ConfigSeverity::Error => "ERROR",
            ConfigSeverity::Warning => "WARN",
        };
        write!(f, "[{tag}] {}: {}", self.field, self.message)
    }
}

impl Config {
    /// Validate the configuration and return a list of issues.
    ///
    /// Returns an empty vec when everything looks good.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.server.port == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.port".into(),
                message: "port must be greater than 0".into(),
            });
        }

        if self.server.host.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "server.host".into(),
                message: "host must not be empty".into(),
            });
        }

        if self.assistant.base_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "assistant.base_url".into(),
                message: "base_url must not be empty".into(),
            });
        }

        // The bot cannot run a turn without an assistant configuration id.
        if self.assistant.assistant_id.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "assistant.assistant_id".into(),
                message: "assistant_id must be set".into(),
            });
        }

        if self.assistant.poll_interval_ms == 0 {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "assistant.poll_interval_ms".into(),
                message: "poll interval must be greater than 0".into(),
            });
        }

        if self.connector.send_url.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "connector.send_url".into(),
                message: "send_url must not be empty".into(),
            });
        }

        // Persistence is best-effort, so a missing base is a warning only.
        if self.records.base_id.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Warning,
                field: "records.base_id".into(),
                message: "base_id is empty — message persistence will fail".into(),
            });
        }

        if self.gating.enabled && self.records.base_id.is_empty() {
            errors.push(ConfigError {
                severity: ConfigSeverity::Error,
                field: "gating.enabled".into(),
                message: "membership gating requires records.base_id".into(),
            });
        }

        errors
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
