//! Path utilities for Launchpad directory resolution.

use anyhow::Result;
use std::path::PathBuf;

const LAUNCHPAD_DIR: &str = ".launchpad";
const CREDENTIALS_DB_FILE: &str = "credentials.db";
const LOGS_DIR: &str = "logs";

/// Environment variable to override the Launchpad directory.
const LAUNCHPAD_DIR_ENV: &str = "LAUNCHPAD_DIR";

/// Resolve the Launchpad data directory.
/// Priority: LAUNCHPAD_DIR env var > ~/.launchpad/
pub fn resolve_launchpad_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(LAUNCHPAD_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Ok(PathBuf::from(dir));
    }
    dirs::home_dir()
        .map(|h| h.join(LAUNCHPAD_DIR))
        .ok_or_else(|| anyhow::anyhow!("Failed to determine home directory"))
}

/// Ensure the Launchpad directory exists and return its path.
pub fn ensure_launchpad_dir() -> Result<PathBuf> {
    let dir = resolve_launchpad_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Credential database path: ~/.launchpad/credentials.db
pub fn ensure_credentials_db_path() -> Result<PathBuf> {
    Ok(ensure_launchpad_dir()?.join(CREDENTIALS_DB_FILE))
}

/// Logs directory: ~/.launchpad/logs/
pub fn logs_dir() -> Result<PathBuf> {
    let dir = resolve_launchpad_dir()?.join(LOGS_DIR);
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
