//! Row shapes for the record sink.
//!
//! The wire schema is Airtable-shaped: rows are posted as
//! `{"records": [{"fields": {…}}]}` and field names are PascalCase.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Inbound message record
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// One inbound chat message, written once and never read back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct InboundMessageRecord {
    pub phone_number: String,
    pub message: String,
    /// ISO-8601 / RFC 3339 UTC timestamp.
    pub timestamp: String,
}

impl InboundMessageRecord {
    /// Build a record stamped with the given instant.
    pub fn new(phone_number: impl Into<String>, message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            phone_number: phone_number.into(),
            message: message.into(),
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }

    /// Build a record stamped with the current time.
    pub fn now(phone_number: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(phone_number, message, Utc::now())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Wire envelopes
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// POST /{base}/{table} — request body.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRecordsRequest {
    pub records: Vec<RecordEnvelope>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordEnvelope {
    pub fields: InboundMessageRecord,
}

/// GET /{base}/{table}?filterByFormula=… — response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ListRecordsResponse {
    #[serde(default)]
    pub records: Vec<serde_json::Value>,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Tests
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
