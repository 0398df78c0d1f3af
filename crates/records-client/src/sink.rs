//! The `RecordSink` trait abstracts over the durable message log and the
//! member directory (REST in production, a recording fake in tests).

use async_trait::async_trait;
use tb_domain::error::Result;

use crate::types::InboundMessageRecord;

/// Append-only message log plus the optional member lookup.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Append one inbound-message record to the messages table.
    /// Write-once; the bridge never reads these rows back.
    async fn append_message(&self, record: InboundMessageRecord) -> Result<()>;

    /// Check whether a phone number exists in the member table
    /// (formula-filtered lookup).
    async fn member_exists(&self, phone_number: &str) -> Result<bool>;
}
