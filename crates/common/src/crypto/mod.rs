//! Cryptographic primitives for the authorization flow
//!
//! - [`pkce`]: code verifier, S256 challenge and state generation
//! - [`basic_authorization`]: HTTP Basic client credentials header

pub mod pkce;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

pub use pkce::{
    generate_code_challenge, generate_code_verifier, generate_state, validate_state,
    AuthorizationRequest, PkcePair, CHALLENGE_METHOD,
};

/// Build the `Authorization` header value for client credentials
///
/// Returns `Basic base64(client_id:client_secret)` using standard (padded)
/// base64, as RFC 7617 requires.
#[must_use]
pub fn basic_authorization(client_id: &str, client_secret: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{client_id}:{client_secret}")))
}
