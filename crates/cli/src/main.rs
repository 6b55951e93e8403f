//! xauth - print a sign-in URL for the configured X application
//!
//! Usage: `xauth [CONFIG_PATH]`. Without a path, configuration comes from the
//! environment (a `.env` file is honored) or the first config file found.

use std::path::PathBuf;

use anyhow::Context;
use xauth_domain::{MemorySession, Session};
use xauth_infra::{config, observability, XAuthClient};

fn main() -> anyhow::Result<()> {
    // Initialize logging FIRST so we can see .env loading
    observability::init_tracing();

    match dotenvy::dotenv() {
        Ok(path) => tracing::info!(path = %path.display(), "Loaded .env"),
        Err(e) => tracing::debug!(error = %e, "No .env file loaded"),
    }

    let client_config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => config::load_from_file(Some(path)),
        None => config::load(),
    }
    .context("failed to load xauth configuration")?;

    let client = XAuthClient::new(client_config).context("failed to build OAuth client")?;
    let mut session = MemorySession::new();
    let redirect = client.authorization_url(&mut session);

    tracing::info!(session_id = %session.id(), "authorization URL ready");
    println!("Open this URL to sign in:\n\n  {redirect}\n");
    println!("Expected state: {}", redirect.state);

    Ok(())
}
