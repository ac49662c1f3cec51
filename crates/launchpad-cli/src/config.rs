//! CLI configuration file support
//!
//! Loads configuration from ~/.config/launchpad/config.toml

use launchpad_core::Application;
use launchpad_core::auth::AuthConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchpadConfig {
    /// Credential negotiation settings
    #[serde(default)]
    pub auth: AuthConfig,
    /// Application catalog
    #[serde(default = "default_applications")]
    pub applications: Vec<Application>,
}

impl Default for LaunchpadConfig {
    fn default() -> Self {
        Self {
            auth: AuthConfig::default(),
            applications: default_applications(),
        }
    }
}

fn default_applications() -> Vec<Application> {
    [
        ("local-gama", "Local - GAMA", "http://localhost:3000"),
        ("local-lookout", "Local - Lookout+", "http://localhost:4000"),
        ("local-marops", "Local - MarOps", "http://localhost:7000"),
        ("local-missim", "Local - MIS-SIM", "http://localhost:5000"),
    ]
    .into_iter()
    .map(|(id, name, url)| Application::new(id, name, url))
    .collect()
}

impl LaunchpadConfig {
    /// Load configuration from `path`, or the default path when unset
    pub fn load(path: Option<&str>) -> Self {
        match path {
            Some(path) => Self::load_from_path(Some(PathBuf::from(path))),
            None => Self::load_from_path(Self::default_path()),
        }
    }

    /// Load configuration from a specific path
    ///
    /// A missing or malformed file yields the defaults.
    pub fn load_from_path(path: Option<PathBuf>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => Self::parse(&content, &path),
            Err(_) => Self::default(),
        }
    }

    fn parse(content: &str, path: &Path) -> Self {
        toml::from_str(content).unwrap_or_else(|error| {
            warn!(path = %path.display(), error = %error, "Ignoring malformed config file");
            Self::default()
        })
    }

    /// Get the default configuration file path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("launchpad").join("config.toml"))
    }

    /// Find a catalog entry by id
    pub fn application(&self, id: &str) -> Option<&Application> {
        self.applications.iter().find(|app| app.id == id)
    }
}
