//! Shared primitives for xauth crates.
//!
//! - [`crypto`]: PKCE verifier/challenge, state tokens, Basic credentials
//! - [`error`]: error classification (retryability, severity)

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod crypto;
pub mod error;

pub use crypto::{
    basic_authorization, generate_code_challenge, generate_code_verifier, generate_state,
    validate_state, AuthorizationRequest, PkcePair,
};
pub use error::{ErrorClassification, ErrorSeverity};
