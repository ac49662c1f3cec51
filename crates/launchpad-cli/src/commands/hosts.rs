use anyhow::Result;
use comfy_table::{Cell, Table};
use launchpad_core::AppCore;
use launchpad_core::services::credentials;
use serde_json::json;
use std::sync::Arc;

use crate::cli::HostsCommands;
use crate::output::{OutputFormat, json::print_json, table::print_table};

pub async fn run(core: Arc<AppCore>, command: HostsCommands, format: OutputFormat) -> Result<()> {
    match command {
        HostsCommands::List => list_hosts(&core, format).await,
        HostsCommands::Check { url } => check_host(&core, &url, format).await,
        HostsCommands::Clear { url, all } => {
            let url = if all { None } else { url };
            clear_hosts(&core, url.as_deref(), format).await
        }
    }
}

async fn list_hosts(core: &Arc<AppCore>, format: OutputFormat) -> Result<()> {
    let hosts = credentials::list_stored_hosts(core).await?;

    if format.is_json() {
        return print_json(&json!({ "hosts": hosts }));
    }

    if hosts.is_empty() {
        println!("No remembered credentials.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Host"]);
    for host in &hosts {
        table.add_row(vec![Cell::new(host)]);
    }
    print_table(table)
}

async fn check_host(core: &Arc<AppCore>, url: &str, format: OutputFormat) -> Result<()> {
    let has_credentials = credentials::has_stored_credentials(core, url).await?;

    if format.is_json() {
        return print_json(&json!({ "url": url, "has_credentials": has_credentials }));
    }

    if has_credentials {
        println!("Credentials remembered for {}", url);
    } else {
        println!("No credentials remembered for {}", url);
    }
    Ok(())
}

async fn clear_hosts(core: &Arc<AppCore>, url: Option<&str>, format: OutputFormat) -> Result<()> {
    let response = credentials::clear_stored_credentials(core, url).await?;

    if format.is_json() {
        return print_json(&response);
    }

    println!("{}", response.message);
    Ok(())
}
