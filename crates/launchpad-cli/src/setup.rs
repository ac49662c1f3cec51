//! CLI setup module
//!
//! Builds the embedded Launchpad core with a terminal login prompt attached.

use anyhow::Result;
use launchpad_core::auth::ChannelPresenter;
use launchpad_core::{AppCore, paths};
use std::sync::Arc;

use crate::config::LaunchpadConfig;
use crate::prompt;

/// Build the embedded Launchpad core
pub async fn prepare_core(db_path: Option<String>, config: &LaunchpadConfig) -> Result<Arc<AppCore>> {
    let db_path = match db_path {
        Some(path) => path.into(),
        None => paths::ensure_credentials_db_path()?,
    };

    let (presenter, commands) = ChannelPresenter::new();
    let core = Arc::new(AppCore::new(&db_path, config.auth.clone(), Arc::new(presenter)).await?);
    prompt::spawn_prompt_loop(core.clone(), commands);

    Ok(core)
}
