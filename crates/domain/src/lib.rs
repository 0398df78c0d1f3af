//! Shared types for the ThreadBridge workspace: the common error enum and
//! the configuration tree.

pub mod config;
pub mod error;
