use std::sync::Arc;
use std::time::Duration;

use dash_core::SessionIdentity;
use tokio::sync::broadcast;

use crate::coordinator::{RefreshCoordinator, Renewer};
use crate::events::{SessionEvent, SessionEvents};
use crate::inspector::{self, DEFAULT_REFRESH_THRESHOLD_SECS};
use crate::store::CredentialStore;

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Proactive refresh window, in seconds.
    pub refresh_threshold_secs: i64,
    /// How long a failed refresh is reused before a new attempt may start.
    pub failure_cooldown: Duration,
    /// Re-authentication entry point announced with [`SessionEvent::Ended`].
    pub login_url: Option<String>,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            refresh_threshold_secs: DEFAULT_REFRESH_THRESHOLD_SECS,
            failure_cooldown: Duration::from_secs(5),
            login_url: None,
        }
    }
}

/// The credential lifecycle shared by every client pipeline in the process.
///
/// Constructed once at the composition root and handed to each pipeline by
/// `Arc`, so a refresh triggered through any endpoint serves all of them.
pub struct Session {
    store: Arc<CredentialStore>,
    coordinator: Arc<RefreshCoordinator>,
    events: Arc<SessionEvents>,
    refresh_threshold_secs: i64,
}

impl Session {
    pub fn new(
        store: Arc<CredentialStore>,
        renewer: Arc<dyn Renewer>,
        options: SessionOptions,
    ) -> Arc<Self> {
        let events = Arc::new(SessionEvents::new(options.login_url));
        let coordinator = RefreshCoordinator::new(
            Arc::clone(&store),
            renewer,
            Arc::clone(&events),
            options.failure_cooldown,
        );
        Arc::new(Self {
            store,
            coordinator,
            events,
            refresh_threshold_secs: options.refresh_threshold_secs,
        })
    }

    pub const fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    pub const fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub const fn refresh_threshold_secs(&self) -> i64 {
        self.refresh_threshold_secs
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Identity claimed by the stored access token, if it decodes.
    pub fn identity(&self) -> Option<SessionIdentity> {
        self.store
            .get_access()
            .and_then(|token| inspector::decode(&token))
            .and_then(|claims| claims.identity())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("store", &self.store)
            .field("refresh_threshold_secs", &self.refresh_threshold_secs)
            .finish_non_exhaustive()
    }
}
