//! Terminal login prompt
//!
//! Renders login requests on the terminal and feeds the answers back
//! through the login prompt boundary. A rejected submission re-prompts with
//! the failure reason; an empty username cancels.

use anyhow::Result;
use colored::Colorize;
use launchpad_core::AppCore;
use launchpad_core::auth::{CancelLoginRequest, LoginRequest, PresenterCommand, SubmitLoginRequest};
use launchpad_core::services::auth;
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Reads one login attempt for a request, given the previous failure if any.
type LoginReader =
    Arc<dyn Fn(&LoginRequest, Option<&str>) -> Result<Option<SubmitLoginRequest>> + Send + Sync>;

/// How a single prompt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptOutcome {
    Submitted,
    Cancelled,
    /// The login was resolved elsewhere or expired while the prompt was shown
    Withdrawn,
    Failed,
}

pub fn spawn_prompt_loop(
    core: Arc<AppCore>,
    mut commands: UnboundedReceiver<PresenterCommand>,
) -> JoinHandle<()> {
    let reader: LoginReader = Arc::new(read_login);
    tokio::spawn(async move {
        let mut backlog = VecDeque::new();
        loop {
            let command = match backlog.pop_front() {
                Some(command) => command,
                None => match commands.recv().await {
                    Some(command) => command,
                    None => break,
                },
            };
            match command {
                PresenterCommand::Open(request) => {
                    run_prompt(&core, request, &mut commands, &mut backlog, reader.clone()).await;
                }
                PresenterCommand::Close { url } => debug!(url = %url, "Login prompt closed"),
            }
        }
    })
}

/// True while `request` is still the URL's pending login.
fn still_pending(core: &AppCore, request: &LoginRequest) -> bool {
    core.auth
        .pending_login(&request.url)
        .is_some_and(|pending| pending.id == request.id)
}

/// Drive one prompt to completion.
///
/// Commands arriving while the terminal read blocks are queued in `backlog`,
/// except a close for this prompt's login, which withdraws it. A terminal read
/// cannot be interrupted, so the user is told to press Enter and the answer is
/// discarded.
async fn run_prompt(
    core: &Arc<AppCore>,
    request: LoginRequest,
    commands: &mut UnboundedReceiver<PresenterCommand>,
    backlog: &mut VecDeque<PresenterCommand>,
    reader: LoginReader,
) -> PromptOutcome {
    let mut failure: Option<String> = None;

    loop {
        let mut read = {
            let request = request.clone();
            let failure = failure.take();
            let reader = reader.clone();
            tokio::task::spawn_blocking(move || reader(&request, failure.as_deref()))
        };

        let mut withdrawn = false;
        let form = loop {
            tokio::select! {
                form = &mut read => break form,
                Some(command) = commands.recv() => match command {
                    PresenterCommand::Close { url }
                        if url == request.url && !withdrawn && !still_pending(core, &request) =>
                    {
                        withdrawn = true;
                        eprintln!(
                            "\n{}",
                            format!("Login for {url} is no longer pending. Press Enter to continue.")
                                .yellow()
                        );
                    }
                    other => backlog.push_back(other),
                },
            }
        };

        if withdrawn || !still_pending(core, &request) {
            info!(url = %request.url, challenge = %request.id, "Login prompt withdrawn");
            return PromptOutcome::Withdrawn;
        }

        let form = match form {
            Ok(Ok(form)) => form,
            Ok(Err(error)) => {
                warn!(url = %request.url, error = %error, "Could not read login from terminal");
                auth::prompt_closed(core, CancelLoginRequest { url: request.url.clone() });
                return PromptOutcome::Failed;
            }
            Err(error) => {
                warn!(url = %request.url, error = %error, "Login prompt task failed");
                auth::prompt_closed(core, CancelLoginRequest { url: request.url.clone() });
                return PromptOutcome::Failed;
            }
        };

        let Some(form) = form else {
            auth::cancel_login(core, CancelLoginRequest { url: request.url.clone() }).await;
            eprintln!("{}", "Login cancelled".yellow());
            return PromptOutcome::Cancelled;
        };

        match auth::submit_login_credentials(core, form).await {
            Ok(response) if response.success => {
                eprintln!("{} {}", "✓".green(), response.message);
                return PromptOutcome::Submitted;
            }
            Ok(response) => {
                eprintln!("{}", response.message.yellow());
                return PromptOutcome::Withdrawn;
            }
            Err(error) => failure = Some(error.to_string()),
        }
    }
}

/// Read one login attempt. `None` means the user cancelled.
fn read_login(request: &LoginRequest, failure: Option<&str>) -> Result<Option<SubmitLoginRequest>> {
    let mut stderr = std::io::stderr();
    match &request.realm {
        Some(realm) => eprintln!("\n{} {} ({})", "Login required:".bold(), request.url, realm),
        None => eprintln!("\n{} {}", "Login required:".bold(), request.url),
    }
    if let Some(failure) = failure {
        eprintln!("{}", failure.red());
    }

    eprint!("Username (empty to cancel): ");
    stderr.flush()?;
    let username = read_line()?;
    if username.is_empty() {
        return Ok(None);
    }

    let password = rpassword::prompt_password("Password: ")?;

    eprint!("Remember on this computer? [Y/n]: ");
    stderr.flush()?;
    let remember = !read_line()?.to_lowercase().starts_with('n');

    Ok(Some(SubmitLoginRequest {
        url: request.url.clone(),
        username,
        password,
        remember,
    }))
}

fn read_line() -> Result<String> {
    let mut line = String::new();
    if std::io::stdin().lock().read_line(&mut line)? == 0 {
        anyhow::bail!("Standard input closed");
    }
    Ok(line.trim().to_string())
}
