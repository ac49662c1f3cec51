use crate::AppCore;
use crate::auth::AuthSuccessResponse;
use anyhow::{Context, Result};
use std::sync::Arc;

/// List hosts with remembered credentials
pub async fn list_stored_hosts(core: &Arc<AppCore>) -> Result<Vec<String>> {
    core.storage
        .credentials
        .list_hosts()
        .context("Failed to list stored hosts")
}

/// Check whether credentials are remembered for a URL's host
pub async fn has_stored_credentials(core: &Arc<AppCore>, url: &str) -> Result<bool> {
    core.storage
        .credentials
        .has(url)
        .with_context(|| format!("Failed to check stored credentials for {}", url))
}

/// Forget the credentials for one URL's host, or for every host
pub async fn clear_stored_credentials(
    core: &Arc<AppCore>,
    url: Option<&str>,
) -> Result<AuthSuccessResponse> {
    let removed = core
        .storage
        .credentials
        .delete(url)
        .context("Failed to clear stored credentials")?;

    let message = match url {
        Some(url) => format!("Cleared credentials for {}", url),
        None => format!("Cleared all credentials ({} hosts)", removed),
    };
    Ok(AuthSuccessResponse::ok(message))
}
