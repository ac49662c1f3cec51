//! Login prompt presenter.
//!
//! The orchestrator never renders anything itself. It tells a presenter to
//! open a prompt for a URL and, once validated credentials arrive, to close
//! it. Submissions and cancellations come back through the auth service.

use super::types::LoginRequest;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Surface that shows login prompts.
///
/// Implement this trait to render the prompt somewhere (a terminal, a
/// window, a test harness).
#[async_trait]
pub trait LoginPresenter: Send + Sync {
    /// Open a modal prompt addressed to `request.url` (and realm if present).
    ///
    /// Returning an error fails the challenge for every waiter.
    async fn open(&self, request: &LoginRequest) -> anyhow::Result<()>;

    /// Close the prompt for `url` after a validated submission.
    async fn close(&self, url: &str) -> anyhow::Result<()>;
}

/// Instruction sent from the orchestrator to a presenter loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresenterCommand {
    Open(LoginRequest),
    Close { url: String },
}

/// Presenter that forwards commands over a channel to whoever renders them.
#[derive(Clone)]
pub struct ChannelPresenter {
    tx: mpsc::UnboundedSender<PresenterCommand>,
}

impl ChannelPresenter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<PresenterCommand>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl LoginPresenter for ChannelPresenter {
    async fn open(&self, request: &LoginRequest) -> anyhow::Result<()> {
        self.tx
            .send(PresenterCommand::Open(request.clone()))
            .map_err(|_| anyhow::anyhow!("Login presenter is not running"))
    }

    async fn close(&self, url: &str) -> anyhow::Result<()> {
        self.tx
            .send(PresenterCommand::Close {
                url: url.to_string(),
            })
            .map_err(|_| anyhow::anyhow!("Login presenter is not running"))
    }
}
