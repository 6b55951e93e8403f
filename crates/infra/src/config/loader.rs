//! Configuration loader
//!
//! Loads client configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If incomplete, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `XAUTH_CLIENT_ID`: OAuth client ID (required)
//! - `XAUTH_CLIENT_SECRET`: OAuth client secret (required)
//! - `XAUTH_REDIRECT_URI`: Registered redirect URI (required)
//! - `XAUTH_API_BASE_URL`: Override for the API base URL
//! - `XAUTH_AUTH_URL`: Override for the authorization endpoint
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./xauth.toml`, `./xauth.json`, `./config.toml`, `./config.json`
//! 2. The same names in the parent and grandparent directories
//! 3. Relative to executable location

use std::path::{Path, PathBuf};

use serde::Deserialize;
use xauth_domain::constants::{API_BASE_URL, AUTH_URL};
use xauth_domain::{AuthError, ClientConfig, Result};

const CONFIG_FILE_NAMES: &[&str] = &["xauth.toml", "xauth.json", "config.toml", "config.json"];

/// Serialized form of [`ClientConfig`]
///
/// Endpoint overrides are optional and default to the provider's production
/// URLs.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub authorize_url: Option<String>,
}

impl ClientSettings {
    /// Validate and convert into a [`ClientConfig`]
    ///
    /// # Errors
    /// Returns `AuthError::Config` if a field is empty or a URL is invalid.
    pub fn into_config(self) -> Result<ClientConfig> {
        ClientConfig::with_endpoints(
            self.client_id,
            self.client_secret,
            self.redirect_uri,
            self.api_base_url.as_deref().unwrap_or(API_BASE_URL),
            self.authorize_url.as_deref().unwrap_or(AUTH_URL),
        )
    }
}

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If any required
/// variables are missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `AuthError::Config` if configuration cannot be loaded from either
/// source.
pub fn load() -> Result<ClientConfig> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `AuthError::Config` if required variables are missing or invalid.
pub fn load_from_env() -> Result<ClientConfig> {
    ClientSettings {
        client_id: env_var("XAUTH_CLIENT_ID")?,
        client_secret: env_var("XAUTH_CLIENT_SECRET")?,
        redirect_uri: env_var("XAUTH_REDIRECT_URI")?,
        api_base_url: std::env::var("XAUTH_API_BASE_URL").ok(),
        authorize_url: std::env::var("XAUTH_AUTH_URL").ok(),
    }
    .into_config()
}

/// Load configuration from a file
///
/// If `path` is `None`, probes the standard locations.
/// Format is detected by file extension (`.json` or `.toml`).
///
/// # Errors
/// Returns `AuthError::Config` if the file is missing, unreadable or invalid.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(AuthError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            AuthError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| AuthError::Config(format!("Failed to read config file: {e}")))?;

    parse_settings(&contents, &config_path)?.into_config()
}

fn parse_settings(contents: &str, path: &Path) -> Result<ClientSettings> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| AuthError::Config(format!("Invalid TOML format: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| AuthError::Config(format!("Invalid JSON format: {e}"))),
        _ => Err(AuthError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Probe multiple paths for configuration files
///
/// Returns the first existing candidate, or `None`.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.extend([cwd.clone(), cwd.join(".."), cwd.join("../..")]);
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.extend([exe_dir.to_path_buf(), exe_dir.join("..")]);
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| AuthError::Config(format!("Missing required environment variable: {key}")))
}
