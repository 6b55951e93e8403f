//! # xauth Domain
//!
//! Domain types for the xauth OAuth client.
//!
//! This crate contains:
//! - Client configuration (`ClientConfig`)
//! - User record, token pair and session change snapshots
//! - The `Session` collaborator trait and an in-memory implementation
//! - Domain error types and Result definitions
//! - Provider constants (endpoints, scopes, profile fields)
//!
//! ## Architecture
//! - No dependencies on other xauth crates
//! - No I/O; pure data and contracts

pub mod config;
pub mod constants;
pub mod errors;
pub mod session;
pub mod types;

// Re-export commonly used items
pub use config::ClientConfig;
pub use errors::*;
pub use session::{MemorySession, Session};
pub use types::*;
