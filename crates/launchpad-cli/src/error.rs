use colored::Colorize;

pub fn handle_error(err: anyhow::Error) -> ! {
    eprintln!("{} {:#}", "Error:".red().bold(), err);

    let msg = format!("{err:#}").to_lowercase();

    if msg.contains("application not found") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  List configured applications with:");
        eprintln!("  {} launchpad apps list", "$".dimmed());
    }

    if msg.contains("invalid credentials") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Forget the remembered login and try again with:");
        eprintln!("  {} launchpad hosts clear <url>", "$".dimmed());
    }

    if msg.contains("connection refused") || msg.contains("could not reach") {
        eprintln!("\n{}", "Suggestion:".yellow().bold());
        eprintln!("  Check that the device is on the network:");
        eprintln!("  {} launchpad probe <url>", "$".dimmed());
    }

    std::process::exit(1);
}
