//! OAuth 2.0 (PKCE) client for the X API
//!
//! - [`client`]: token lifecycle (authorize, callback, refresh, logout)
//! - [`authenticated`]: bearer requests with refresh-and-retry on 401
//! - [`notifier`]: session change callback slot
//! - [`profile`]: provider profile payload and avatar normalization

pub mod authenticated;
pub mod client;
pub mod notifier;
pub mod profile;
pub mod types;

pub use authenticated::{AttemptState, RetryDecision};
pub use client::{XAuthClient, XAuthClientBuilder};
pub use notifier::{SessionCallback, SessionNotifier};
pub use profile::{IdentityNormalizer, ProfileImageNormalizer, StripSizeSuffix};
pub use types::{AuthorizationUrl, TokenResponse};
