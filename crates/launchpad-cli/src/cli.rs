use clap::{Parser, Subcommand};
use clap_complete::Shell;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "launchpad")]
#[command(version, about = "Launchpad - open web applications behind Basic-Auth")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Credential database path (defaults to ~/.launchpad/credentials.db)
    #[arg(long, global = true, env = "LAUNCHPAD_DB_PATH")]
    pub db_path: Option<String>,

    /// Configuration file (defaults to ~/.config/launchpad/config.toml)
    #[arg(long, global = true, env = "LAUNCHPAD_CONFIG")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Open an application by catalog id or URL, logging in if needed
    Open {
        /// Application id from the catalog, or a URL
        target: String,
    },

    /// Application catalog
    Apps {
        #[command(subcommand)]
        command: AppsCommands,
    },

    /// Remembered credentials
    Hosts {
        #[command(subcommand)]
        command: HostsCommands,
    },

    /// Check a username and password against a server without storing them
    Validate {
        url: String,

        #[arg(short, long)]
        username: String,

        /// Password (prompted if omitted)
        #[arg(long, env = "LAUNCHPAD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Check whether a server is reachable and whether it asks for a login
    Probe { url: String },
}

#[derive(Subcommand)]
pub enum AppsCommands {
    /// List configured applications
    List {
        /// Include disabled applications
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
pub enum HostsCommands {
    /// List hosts with remembered credentials
    List,

    /// Check whether credentials are remembered for a URL
    Check { url: String },

    /// Forget credentials for a URL, or for every host with --all
    Clear {
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        url: Option<String>,

        #[arg(long)]
        all: bool,
    },
}
