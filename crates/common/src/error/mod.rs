//! Error classification shared across xauth crates
//!
//! [`ErrorClassification`] gives callers a uniform way to decide whether an
//! operation is worth retrying and how loudly to report a failure, without
//! matching on every variant of every error type.
//!
//! | Variant | Retryable | Severity |
//! |---------|-----------|----------|
//! | `RateLimited` | yes (60 s) | Warning |
//! | `Transport` | yes (5 s) | Warning |
//! | `ProviderHttp` 5xx | yes (10 s) | Error |
//! | `ProviderHttp` 4xx | no | Error |
//! | `AuthenticationFailed` / `RefreshFailed` | no | Warning |
//! | `RevocationFailed` | no | Info |
//! | `InvalidRequest` / `Decode` | no | Error |
//! | `Config` | no | Critical |

use std::fmt;
use std::time::Duration;

use xauth_domain::AuthError;

/// Standard interface for classifying errors by their characteristics
pub trait ErrorClassification {
    /// Check if this error is retryable
    ///
    /// Retryable errors are transient conditions (rate limiting, network
    /// failures, provider outages) that may succeed if attempted again.
    fn is_retryable(&self) -> bool;

    /// Get the error severity level
    fn severity(&self) -> ErrorSeverity;

    /// Check if this is a critical error requiring immediate attention
    fn is_critical(&self) -> bool;

    /// Get the suggested retry delay if applicable
    fn retry_after(&self) -> Option<Duration>;
}

/// Error severity levels for monitoring and alerting
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    /// Informational, typically for debugging
    Info,
    /// Warning, should be monitored but not critical
    Warning,
    /// Error, requires attention and action
    Error,
    /// Critical, immediate action required
    Critical,
}

impl fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info => write!(f, "INFO"),
            Self::Warning => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
            Self::Critical => write!(f, "CRITICAL"),
        }
    }
}

impl ErrorClassification for AuthError {
    fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited { .. } | Self::Transport(_) => true,
            Self::ProviderHttp { status, .. } => *status >= 500,
            _ => false,
        }
    }

    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::RevocationFailed(_) => ErrorSeverity::Info,
            Self::RateLimited { .. }
            | Self::Transport(_)
            | Self::AuthenticationFailed
            | Self::RefreshFailed => ErrorSeverity::Warning,
            Self::ProviderHttp { .. } | Self::InvalidRequest(_) | Self::Decode(_) => {
                ErrorSeverity::Error
            }
            Self::Config(_) => ErrorSeverity::Critical,
        }
    }

    fn is_critical(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { .. } => Some(Duration::from_secs(60)),
            Self::Transport(_) => Some(Duration::from_secs(5)),
            Self::ProviderHttp { status, .. } if *status >= 500 => Some(Duration::from_secs(10)),
            _ => None,
        }
    }
}
