//! `tb-records` — record sink client for ThreadBridge.
//!
//! Provides the [`RecordSink`] trait (append an inbound-message record,
//! check membership), the [`InboundMessageRecord`] row shape, and a
//! production REST implementation ([`RestRecordsClient`]) speaking the
//! Airtable-style rows-with-`fields` API.
//!
//! Appends are best-effort from the bridge's perspective: the runtime
//! spawns them off the turn path and only logs failures.

pub mod rest;
pub mod sink;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use rest::RestRecordsClient;
pub use sink::RecordSink;
pub use types::InboundMessageRecord;
