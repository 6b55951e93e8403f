//! PKCE (Proof Key for Code Exchange) implementation for OAuth 2.0
//!
//! Implements RFC 7636 S256 challenges plus the anti-CSRF state token sent
//! alongside them.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Number of random bytes behind a code verifier (43 chars once encoded)
pub const VERIFIER_BYTES: usize = 32;

/// Number of random bytes behind a state token (22 chars once encoded)
pub const STATE_BYTES: usize = 16;

/// The only challenge method this client sends
pub const CHALLENGE_METHOD: &str = "S256";

fn random_url_safe(len: usize) -> String {
    let mut bytes = vec![0u8; len];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Generate a cryptographically secure code verifier
///
/// Returns 32 random bytes as URL-safe base64 without padding (43
/// characters).
#[must_use]
pub fn generate_code_verifier() -> String {
    random_url_safe(VERIFIER_BYTES)
}

/// Generate code challenge from verifier using SHA256
///
/// Per RFC 7636, the challenge is BASE64URL(SHA256(ASCII(code_verifier))).
#[must_use]
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generate a random state token for CSRF protection
///
/// Returns 16 random bytes as URL-safe base64 without padding (22
/// characters).
#[must_use]
pub fn generate_state() -> String {
    random_url_safe(STATE_BYTES)
}

/// Compare an expected state with the one echoed back by the provider
///
/// Runs in time independent of where the inputs differ.
#[must_use]
pub fn validate_state(expected: &str, actual: &str) -> bool {
    let (a, b) = (expected.as_bytes(), actual.as_bytes());
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }

    result == 0
}

/// PKCE verifier/challenge pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PkcePair {
    /// Kept secret in the session until token exchange
    pub verifier: String,

    /// SHA256 hash of the verifier, sent in the authorization request
    pub challenge: String,
}

impl PkcePair {
    /// Generate a fresh pair
    #[must_use]
    pub fn generate() -> Self {
        let verifier = generate_code_verifier();
        let challenge = generate_code_challenge(&verifier);
        Self { verifier, challenge }
    }

    /// Challenge method (always "S256")
    #[must_use]
    pub fn method(&self) -> &'static str {
        CHALLENGE_METHOD
    }
}

/// Everything a single authorization attempt needs
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub pkce: PkcePair,
    pub state: String,
}

impl AuthorizationRequest {
    /// Allocate a new pair and state; nothing is cached between calls.
    #[must_use]
    pub fn generate() -> Self {
        Self { pkce: PkcePair::generate(), state: generate_state() }
    }
}
