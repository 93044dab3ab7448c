//! Refresh Coordinator: redeems the refresh token, at most once at a time.
//!
//! Concurrent callers that find an attempt in flight await that same attempt
//! instead of starting their own. Most servers invalidate a refresh token on
//! first use, so a second concurrent redemption would fail and log the user
//! out for nothing.
//!
//! The attempt runs on its own task. Dropping every waiter does not cancel
//! it: the new pair still lands in the store for whoever asks next.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dash_core::TokenPair;
use futures::FutureExt as _;
use futures::future::{BoxFuture, Shared};
use tokio::sync::Mutex;

use crate::error::AuthError;
use crate::events::SessionEvents;
use crate::store::CredentialStore;

/// The network operation exchanging a refresh token for a new pair.
#[async_trait]
pub trait Renewer: Send + Sync {
    /// # Errors
    ///
    /// `AuthError::RefreshRejected` when the server refuses the token or
    /// answers without a pair; `AuthError::RenewalTransport` when it cannot
    /// be reached.
    async fn renew(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
}

/// Result of one refresh attempt, shared by every caller that waited on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// Attempt number, starting at 1. Identifies the refresh cycle.
    pub attempt: u64,
    pub pair: Option<TokenPair>,
}

type SharedAttempt = Shared<BoxFuture<'static, RefreshOutcome>>;

enum RefreshSlot {
    Idle,
    InFlight(SharedAttempt),
    Failed {
        outcome: RefreshOutcome,
        at: Instant,
    },
}

pub struct RefreshCoordinator {
    store: Arc<CredentialStore>,
    renewer: Arc<dyn Renewer>,
    events: Arc<SessionEvents>,
    slot: Mutex<RefreshSlot>,
    attempts: AtomicU64,
    failure_cooldown: Duration,
}

impl RefreshCoordinator {
    pub fn new(
        store: Arc<CredentialStore>,
        renewer: Arc<dyn Renewer>,
        events: Arc<SessionEvents>,
        failure_cooldown: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            renewer,
            events,
            slot: Mutex::new(RefreshSlot::Idle),
            attempts: AtomicU64::new(0),
            failure_cooldown,
        })
    }

    /// Redeem the stored refresh token, joining any attempt already running.
    pub async fn refresh(self: &Arc<Self>) -> Option<TokenPair> {
        self.refresh_outcome(None).await.pair
    }

    /// Like [`Self::refresh`], for a caller holding access token `seen`.
    ///
    /// If the store already holds a different pair, someone renewed since
    /// `seen` was read and that pair is returned without a network call.
    pub async fn refresh_stale(self: &Arc<Self>, seen: &str) -> RefreshOutcome {
        self.refresh_outcome(Some(seen)).await
    }

    /// Number of attempts started so far.
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }

    async fn refresh_outcome(self: &Arc<Self>, seen: Option<&str>) -> RefreshOutcome {
        let mut slot = self.slot.lock().await;

        if let RefreshSlot::InFlight(shared) = &*slot {
            let shared = shared.clone();
            drop(slot);
            tracing::debug!("joining in-flight token refresh");
            return shared.await;
        }

        if let Some(seen) = seen {
            if let Some(pair) = self.on_store(CredentialStore::load_pair).await.ok().flatten() {
                if pair.access != seen {
                    tracing::debug!("access token already rotated; skipping refresh");
                    return RefreshOutcome {
                        attempt: self.attempts(),
                        pair: Some(pair),
                    };
                }
            }
        }

        if let RefreshSlot::Failed { outcome, at } = &*slot {
            if at.elapsed() < self.failure_cooldown && self.stored_refresh().await.is_none() {
                tracing::debug!(attempt = outcome.attempt, "reusing recent refresh failure");
                return outcome.clone();
            }
        }

        let shared = self.start_attempt();
        *slot = RefreshSlot::InFlight(shared.clone());
        drop(slot);
        shared.await
    }

    // Called with the slot locked; the spawned task cannot finish before the
    // handle is stored.
    fn start_attempt(self: &Arc<Self>) -> SharedAttempt {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.run_attempt(attempt).await });

        let this = Arc::clone(self);
        async move {
            match handle.await {
                Ok(outcome) => outcome,
                Err(error) => {
                    tracing::error!(attempt, %error, "token refresh task aborted");
                    let outcome = RefreshOutcome {
                        attempt,
                        pair: None,
                    };
                    this.clear_quietly().await;
                    this.finish(&outcome).await;
                    outcome
                }
            }
        }
        .boxed()
        .shared()
    }

    async fn run_attempt(&self, attempt: u64) -> RefreshOutcome {
        let outcome = RefreshOutcome {
            attempt,
            pair: self.renew_once(attempt).await,
        };
        self.finish(&outcome).await;
        outcome
    }

    async fn renew_once(&self, attempt: u64) -> Option<TokenPair> {
        let Some(refresh_token) = self.stored_refresh().await else {
            tracing::debug!(attempt, "no refresh token stored; nothing to renew");
            self.clear_quietly().await;
            return None;
        };

        tracing::debug!(attempt, "renewing access token");
        let pair = match self.renewer.renew(&refresh_token).await {
            Ok(pair) => pair,
            Err(error) => {
                tracing::warn!(attempt, %error, "token renewal failed; clearing stored credentials");
                self.clear_quietly().await;
                return None;
            }
        };

        // The old refresh token is spent; an unsaved pair cannot be recovered later.
        let to_save = pair.clone();
        if let Err(error) = self.on_store(move |store| store.save(&to_save)).await.and_then(|r| r) {
            tracing::warn!(attempt, %error, "failed to persist renewed tokens; clearing stored credentials");
            self.clear_quietly().await;
            return None;
        }

        tracing::info!(attempt, "access token renewed");
        self.events.renewed(attempt);
        Some(pair)
    }

    // A failed attempt ends the session even when nobody is waiting on it.
    async fn finish(&self, outcome: &RefreshOutcome) {
        let mut slot = self.slot.lock().await;
        if outcome.pair.is_some() {
            *slot = RefreshSlot::Idle;
            return;
        }
        *slot = RefreshSlot::Failed {
            outcome: outcome.clone(),
            at: Instant::now(),
        };
        drop(slot);
        self.events.end(outcome.attempt);
    }

    async fn stored_refresh(&self) -> Option<String> {
        self.on_store(CredentialStore::get_refresh).await.ok().flatten()
    }

    async fn clear_quietly(&self) {
        if let Err(error) = self.on_store(CredentialStore::clear).await.and_then(|r| r) {
            tracing::error!(%error, "failed to clear stored credentials");
        }
    }

    /// Run a store operation on the blocking pool; keyring and file backends
    /// make synchronous system calls.
    async fn on_store<T, F>(&self, op: F) -> Result<T, AuthError>
    where
        T: Send + 'static,
        F: FnOnce(&CredentialStore) -> T + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || op(&store))
            .await
            .map_err(|error| AuthError::Storage(format!("store task failed: {error}")))
    }
}
