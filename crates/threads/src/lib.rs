//! `tb-threads` — conversation-thread state for ThreadBridge.
//!
//! Owns the two process-wide maps the bridge mutates: the
//! [`ThreadDirectory`] (chat identity → conversation thread id) and the
//! [`ReplyCache`] (thread id → last delivered reply text), plus the
//! [`IdentityLockMap`] that serializes turns per identity.
//!
//! Both maps populate on demand and never evict; their size is bounded by
//! the number of distinct chat identities the process has seen.

pub mod directory;
pub mod identity_lock;
pub mod reply_cache;

pub use directory::ThreadDirectory;
pub use identity_lock::{IdentityBusy, IdentityLockMap};
pub use reply_cache::ReplyCache;
