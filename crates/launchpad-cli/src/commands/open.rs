use anyhow::{Result, bail};
use colored::Colorize;
use launchpad_core::services::launcher;
use launchpad_core::{AppCore, Application, LaunchOutcome};
use std::sync::Arc;

use crate::config::LaunchpadConfig;
use crate::output::{OutputFormat, json::print_json};

pub async fn run(
    core: Arc<AppCore>,
    config: &LaunchpadConfig,
    target: &str,
    format: OutputFormat,
) -> Result<()> {
    let app = resolve_target(config, target)?;
    let outcome = launcher::open_application(&core, &app).await;

    if format.is_json() {
        print_json(&outcome)?;
    } else {
        print_outcome(&outcome);
    }

    match outcome {
        LaunchOutcome::Failed { message, .. } => bail!(message),
        _ => Ok(()),
    }
}

/// Catalog id first, then anything that looks like a URL.
fn resolve_target(config: &LaunchpadConfig, target: &str) -> Result<Application> {
    if let Some(app) = config.application(target) {
        return Ok(app.clone());
    }
    if target.contains("://") {
        return Ok(Application::from_url(target));
    }
    bail!("Application not found: {}", target)
}

fn print_outcome(outcome: &LaunchOutcome) {
    match outcome {
        LaunchOutcome::Opened { session } => {
            println!("{} Opened {} ({})", "✓".green(), session.name, session.url);
            println!("  Session:       {}", session.id);
            println!(
                "  Authenticated: {}",
                if session.is_authenticated() { "yes" } else { "not required" }
            );
        }
        LaunchOutcome::Focused { session } => {
            println!("{} {} is already open", "✓".green(), session.name);
            println!("  Session:       {}", session.id);
        }
        LaunchOutcome::Aborted { app_id } => {
            println!("{} Not opening {}", "-".dimmed(), app_id);
        }
        // Reported by handle_error
        LaunchOutcome::Failed { .. } => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_target() {
        let config = LaunchpadConfig::default();

        let app = resolve_target(&config, "local-gama").unwrap();
        assert_eq!(app.url, "http://localhost:3000");

        let adhoc = resolve_target(&config, "https://device.local/app").unwrap();
        assert_eq!(adhoc.id, "https://device.local/app");

        let missing = resolve_target(&config, "nothing").unwrap_err();
        assert!(missing.to_string().contains("Application not found"));
    }
}
