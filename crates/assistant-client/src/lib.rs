//! `tb-assistant` — AI conversation backend client for ThreadBridge.
//!
//! Provides the [`AssistantBackend`] trait that abstracts over the hosted
//! assistant API (conversation threads, asynchronous runs, message lists),
//! a production REST implementation ([`RestAssistantClient`]), and typed
//! DTOs matching the wire schema.
//!
//! The backend protocol is poll-based: a turn appends a user message to a
//! thread, starts a run, polls the run status until it leaves the pending
//! family, then reads the thread's messages back.  The polling loop itself
//! lives in the bridge runtime; this crate only exposes the five calls the
//! loop is made of.

pub mod backend;
pub mod rest;
pub mod types;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use backend::AssistantBackend;
pub use rest::{from_reqwest, RestAssistantClient};
pub use types::{ContentBlock, MessageRole, RunStatus, TextValue, ThreadMessage};
