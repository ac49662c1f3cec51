//! Login prompt boundary
//!
//! Actions a login prompt calls back into: submit, cancel, and the
//! window-closed safety net.

use crate::AppCore;
use crate::auth::{
    AuthCredentials, AuthSuccessResponse, CancelLoginRequest, ConnectivityResult,
    SubmitLoginRequest, ValidationResult,
};
use crate::error::{AuthError, Result};
use std::sync::Arc;
use tracing::info;

/// Validate a login submission with the server, then resolve the pending login.
///
/// Rejected or unverifiable credentials return an error and leave the prompt
/// and its pending login in place for another attempt.
pub async fn submit_login_credentials(
    core: &Arc<AppCore>,
    request: SubmitLoginRequest,
) -> Result<AuthSuccessResponse> {
    let validation = core
        .auth
        .validate_credentials_with_server(&request.url, &request.username, &request.password)
        .await;

    if validation.is_transport_failure() {
        return Err(AuthError::Network {
            url: request.url,
            message: validation
                .error
                .unwrap_or_else(|| "Connection failed".to_string()),
        });
    }
    if !validation.valid {
        return Err(AuthError::ValidationFailed {
            url: request.url,
            status: validation.status.unwrap_or_default(),
        });
    }

    let credentials = AuthCredentials::new(request.username, request.password, request.remember);
    if !core
        .auth
        .resolve_login(&request.url, Some(credentials), true)
        .await
    {
        return Ok(AuthSuccessResponse::rejected(format!(
            "No pending login for {}",
            request.url
        )));
    }

    Ok(AuthSuccessResponse::ok("Authentication successful"))
}

/// Cancel the pending login for a URL.
pub async fn cancel_login(core: &Arc<AppCore>, request: CancelLoginRequest) -> AuthSuccessResponse {
    if core.auth.resolve_login(&request.url, None, false).await {
        AuthSuccessResponse::ok("Login cancelled")
    } else {
        AuthSuccessResponse::rejected(format!("No pending login for {}", request.url))
    }
}

/// The prompt for a URL was dismissed without submit or cancel.
pub fn prompt_closed(core: &Arc<AppCore>, request: CancelLoginRequest) -> bool {
    let resolved = core.auth.prompt_closed(&request.url);
    if !resolved {
        info!(url = %request.url, "Login prompt closed with nothing pending");
    }
    resolved
}

/// Check credentials against the server without touching any pending login.
pub async fn validate_credentials(
    core: &Arc<AppCore>,
    url: &str,
    username: &str,
    password: &str,
) -> ValidationResult {
    core.auth
        .validate_credentials_with_server(url, username, password)
        .await
}

/// Report whether anything answers at `url`.
pub async fn check_connectivity(core: &Arc<AppCore>, url: &str) -> ConnectivityResult {
    core.probe.check_connectivity(url).await
}
