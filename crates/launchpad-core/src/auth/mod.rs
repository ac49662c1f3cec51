//! Basic-Auth negotiation
//!
//! This module decides whether an application URL needs credentials and
//! where they come from:
//! - Remembered credentials, re-validated live before use
//! - An anonymous probe to detect protected servers
//! - A single shared login prompt per URL for concurrent callers

pub mod config;
pub mod orchestrator;
pub mod pending;
pub mod presenter;
pub mod probe;
pub mod types;

pub use config::AuthConfig;
pub use orchestrator::AuthOrchestrator;
pub use pending::{ChallengeOutcome, PendingAuthRegistry, PendingAuthSummary};
pub use presenter::{ChannelPresenter, LoginPresenter, PresenterCommand};
pub use probe::{HttpProbe, ProbeClient};
pub use types::{
    AuthCredentials, AuthSuccessResponse, BasicAuthResult, CancelLoginRequest,
    ConnectivityResult, LoginRequest, SubmitLoginRequest, ValidationResult,
};
