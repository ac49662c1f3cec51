//! Registry of in-flight login challenges, one per URL.
//!
//! Each entry owns a single resolve slot. Every caller that asks for the same
//! URL while the entry exists subscribes to that slot and observes the same
//! outcome. Resolving an entry removes it from the registry.

use super::types::AuthCredentials;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::watch;
use uuid::Uuid;

/// How a challenge ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeOutcome {
    /// Validated credentials submitted through the prompt
    Credentials(AuthCredentials),
    /// Cancelled, dismissed, or expired
    Cancelled,
    /// The prompt could not be driven to completion
    Failed(String),
}

type OutcomeSlot = Option<ChallengeOutcome>;

enum ChallengeState {
    Pending(watch::Sender<OutcomeSlot>),
    Resolved,
}

/// One URL's in-flight negotiation.
pub struct PendingAuthRequest {
    pub id: String,
    pub url: String,
    pub realm: Option<String>,
    pub created_at: i64,
    state: ChallengeState,
}

impl PendingAuthRequest {
    fn new(url: &str, realm: Option<&str>) -> (Self, watch::Receiver<OutcomeSlot>) {
        let (tx, rx) = watch::channel(None);
        let request = Self {
            id: Uuid::new_v4().to_string(),
            url: url.to_string(),
            realm: realm.map(str::to_string),
            created_at: chrono::Utc::now().timestamp_millis(),
            state: ChallengeState::Pending(tx),
        };
        (request, rx)
    }

    /// Fire the resolve slot. Returns false if it already fired.
    fn resolve(&mut self, outcome: ChallengeOutcome) -> bool {
        match std::mem::replace(&mut self.state, ChallengeState::Resolved) {
            ChallengeState::Pending(tx) => {
                tx.send_replace(Some(outcome));
                true
            }
            ChallengeState::Resolved => false,
        }
    }

    fn subscribe(&self) -> Option<watch::Receiver<OutcomeSlot>> {
        match &self.state {
            ChallengeState::Pending(tx) => Some(tx.subscribe()),
            ChallengeState::Resolved => None,
        }
    }

    fn summary(&self) -> PendingAuthSummary {
        PendingAuthSummary {
            id: self.id.clone(),
            url: self.url.clone(),
            realm: self.realm.clone(),
            created_at: self.created_at,
            waiters: match &self.state {
                ChallengeState::Pending(tx) => tx.receiver_count(),
                ChallengeState::Resolved => 0,
            },
        }
    }
}

/// Read-only view of a pending challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingAuthSummary {
    pub id: String,
    pub url: String,
    pub realm: Option<String>,
    pub created_at: i64,
    /// Callers currently awaiting the outcome
    pub waiters: usize,
}

/// A caller's handle on a challenge.
pub struct Challenge {
    id: String,
    owner: bool,
    receiver: watch::Receiver<OutcomeSlot>,
}

impl Challenge {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// True for the caller that created the entry and drives the prompt.
    pub fn is_owner(&self) -> bool {
        self.owner
    }

    /// Wait for the challenge to resolve.
    ///
    /// An entry dropped without an outcome reads as cancelled.
    pub async fn outcome(mut self) -> ChallengeOutcome {
        match self.receiver.wait_for(Option::is_some).await {
            Ok(slot) => {
                let outcome: OutcomeSlot = (*slot).clone();
                outcome.unwrap_or(ChallengeOutcome::Cancelled)
            }
            Err(_) => ChallengeOutcome::Cancelled,
        }
    }
}

/// Map of URL to pending challenge.
#[derive(Default)]
pub struct PendingAuthRegistry {
    entries: Mutex<HashMap<String, PendingAuthRequest>>,
}

impl PendingAuthRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the URL's pending challenge, or create one if none exists.
    pub fn join_or_create(&self, url: &str, realm: Option<&str>) -> Challenge {
        let mut entries = self.entries.lock();

        if let Some(existing) = entries.get(url)
            && let Some(receiver) = existing.subscribe()
        {
            return Challenge {
                id: existing.id.clone(),
                owner: false,
                receiver,
            };
        }

        let (request, receiver) = PendingAuthRequest::new(url, realm);
        let id = request.id.clone();
        entries.insert(url.to_string(), request);

        Challenge {
            id,
            owner: true,
            receiver,
        }
    }

    /// Resolve and remove the URL's challenge. Returns its id, or `None` if
    /// nothing was pending for the URL.
    pub fn resolve(&self, url: &str, outcome: ChallengeOutcome) -> Option<String> {
        let mut entries = self.entries.lock();
        let mut request = entries.remove(url)?;
        request.resolve(outcome).then_some(request.id)
    }

    /// Resolve and remove the URL's entry only if it is still the challenge `id`.
    pub fn resolve_if(&self, url: &str, id: &str, outcome: ChallengeOutcome) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(url) {
            Some(request) if request.id == id => {}
            _ => return false,
        }
        entries
            .remove(url)
            .is_some_and(|mut request| request.resolve(outcome))
    }

    /// Resolve every challenge older than `max_age` as cancelled.
    pub fn expire_older_than(&self, max_age: Duration) -> Vec<PendingAuthSummary> {
        let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        let cutoff = chrono::Utc::now().timestamp_millis().saturating_sub(max_age_ms);
        let mut entries = self.entries.lock();

        let stale: Vec<String> = entries
            .values()
            .filter(|request| request.created_at <= cutoff)
            .map(|request| request.url.clone())
            .collect();

        let mut expired = Vec::with_capacity(stale.len());
        for url in stale {
            if let Some(mut request) = entries.remove(&url) {
                request.resolve(ChallengeOutcome::Cancelled);
                expired.push(request.summary());
            }
        }
        expired
    }

    pub fn contains(&self, url: &str) -> bool {
        self.entries.lock().contains_key(url)
    }

    pub fn get(&self, url: &str) -> Option<PendingAuthSummary> {
        self.entries.lock().get(url).map(PendingAuthRequest::summary)
    }

    pub fn list(&self) -> Vec<PendingAuthSummary> {
        self.entries
            .lock()
            .values()
            .map(PendingAuthRequest::summary)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}
