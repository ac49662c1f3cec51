use anyhow::Result;
use comfy_table::{Cell, Table};

use crate::cli::AppsCommands;
use crate::config::LaunchpadConfig;
use crate::output::{OutputFormat, json::print_json, table::print_table};

pub fn run(config: &LaunchpadConfig, command: AppsCommands, format: OutputFormat) -> Result<()> {
    match command {
        AppsCommands::List { all } => list_applications(config, all, format),
    }
}

fn list_applications(config: &LaunchpadConfig, all: bool, format: OutputFormat) -> Result<()> {
    let apps: Vec<_> = config
        .applications
        .iter()
        .filter(|app| all || app.enabled)
        .collect();

    if format.is_json() {
        return print_json(&apps);
    }

    if apps.is_empty() {
        println!("No applications configured.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "URL", "Enabled", "Description"]);
    for app in apps {
        table.add_row(vec![
            Cell::new(&app.id),
            Cell::new(&app.name),
            Cell::new(&app.url),
            Cell::new(if app.enabled { "yes" } else { "no" }),
            Cell::new(app.description.as_deref().unwrap_or("-")),
        ]);
    }

    print_table(table)
}
