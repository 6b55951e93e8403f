//! # xauth Infrastructure
//!
//! I/O side of the xauth OAuth client.
//!
//! This crate contains:
//! - The HTTP transport seam and its reqwest implementation
//! - Request building and response classification
//! - `XAuthClient`: token lifecycle and authenticated requests
//! - Configuration loading and logging bootstrap
//!
//! ## Architecture
//! - Depends on `xauth-domain` for data types and `xauth-common` for crypto
//! - All network access goes through [`http::HttpTransport`]

pub mod api;
pub mod auth;
pub mod config;
pub mod http;
pub mod observability;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-export commonly used items
pub use api::{BodyEncoding, RequestExecutor, RequestOptions};
pub use auth::{
    AuthorizationUrl, IdentityNormalizer, ProfileImageNormalizer, StripSizeSuffix, XAuthClient,
    XAuthClientBuilder,
};
pub use http::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport, TransportError};
