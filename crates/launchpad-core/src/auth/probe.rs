//! HTTP probe client for Basic-Auth negotiation.
//!
//! Probes never fail on HTTP status. Transport failures (DNS, refused
//! connection, TLS, timeout) come back as `status: 0` / `connected: false`.

use super::config::AuthConfig;
use super::types::{BasicAuthResult, ConnectivityResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const DISABLE_SYSTEM_PROXY_ENV: &str = "LAUNCHPAD_DISABLE_SYSTEM_PROXY";

/// Classifies whether a URL accepts a given set of credentials.
#[async_trait]
pub trait HttpProbe: Send + Sync {
    /// GET `url` with Basic credentials. Blank credentials probe anonymously.
    async fn test_basic_auth(&self, url: &str, username: &str, password: &str) -> BasicAuthResult;

    /// HEAD `url` and report whether anything answered.
    async fn check_connectivity(&self, url: &str) -> ConnectivityResult;
}

/// reqwest-backed probe client.
pub struct ProbeClient {
    client: Client,
    probe_timeout: Duration,
}

impl ProbeClient {
    pub fn new(config: &AuthConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .timeout(config.request_timeout())
            .user_agent(concat!("Launchpad/", env!("CARGO_PKG_VERSION")));
        if should_disable_system_proxy() {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .context("Failed to build probe HTTP client")?;

        Ok(Self {
            client,
            probe_timeout: config.probe_timeout(),
        })
    }
}

fn should_disable_system_proxy() -> bool {
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() {
        return true;
    }

    cfg!(test)
}

#[async_trait]
impl HttpProbe for ProbeClient {
    async fn test_basic_auth(&self, url: &str, username: &str, password: &str) -> BasicAuthResult {
        let response = self
            .client
            .get(url)
            .basic_auth(username, Some(password))
            .timeout(self.probe_timeout)
            .send()
            .await;

        match response {
            Ok(response) => {
                let status = response.status().as_u16();
                debug!(url, status, "Auth probe answered");
                BasicAuthResult::from_status(status)
            }
            Err(error) => {
                warn!(url, %error, "Auth probe failed");
                BasicAuthResult::transport_failure(error.to_string())
            }
        }
    }

    async fn check_connectivity(&self, url: &str) -> ConnectivityResult {
        match self
            .client
            .head(url)
            .timeout(self.probe_timeout)
            .send()
            .await
        {
            Ok(response) => ConnectivityResult {
                connected: true,
                status: Some(response.status().as_u16()),
                error: None,
            },
            Err(error) => ConnectivityResult {
                connected: false,
                status: None,
                error: Some(error.to_string()),
            },
        }
    }
}
