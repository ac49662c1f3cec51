use anyhow::{Result, bail};
use colored::Colorize;
use launchpad_core::AppCore;
use launchpad_core::services::{auth, credentials};
use serde::Serialize;
use std::sync::Arc;

use crate::output::{OutputFormat, json::print_json};

#[derive(Serialize)]
struct ProbeReport {
    url: String,
    connected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    requires_auth: bool,
    has_credentials: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn run_probe(core: Arc<AppCore>, url: &str, format: OutputFormat) -> Result<()> {
    let connectivity = auth::check_connectivity(&core, url).await;
    let anonymous = core.probe.test_basic_auth(url, "", "").await;
    let report = ProbeReport {
        url: url.to_string(),
        connected: connectivity.connected,
        status: connectivity.status,
        requires_auth: anonymous.requires_auth(),
        has_credentials: credentials::has_stored_credentials(&core, url).await?,
        error: connectivity.error,
    };

    if format.is_json() {
        return print_json(&report);
    }

    if !report.connected {
        println!("{} {} is unreachable", "✗".red(), url);
        if let Some(error) = &report.error {
            println!("  {}", error.dimmed());
        }
        return Ok(());
    }

    println!("{} {} is reachable", "✓".green(), url);
    if let Some(status) = report.status {
        println!("  Status:          {}", status);
    }
    println!(
        "  Login required:  {}",
        if report.requires_auth { "yes" } else { "no" }
    );
    println!(
        "  Remembered:      {}",
        if report.has_credentials { "yes" } else { "no" }
    );
    Ok(())
}

pub async fn run_validate(
    core: Arc<AppCore>,
    url: &str,
    username: &str,
    password: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let password = match password {
        Some(password) => password,
        None => rpassword::prompt_password("Password: ")?,
    };

    let result = auth::validate_credentials(&core, url, username, &password).await;

    if format.is_json() {
        print_json(&result)?;
    } else if result.valid {
        println!("{} Credentials accepted by {}", "✓".green(), url);
    }

    if result.valid {
        return Ok(());
    }
    match (result.status, result.error) {
        (Some(status), _) => bail!("Invalid credentials for {} (status {})", url, status),
        (None, error) => bail!(
            "Could not reach {} to validate credentials: {}",
            url,
            error.unwrap_or_else(|| "connection failed".to_string())
        ),
    }
}
