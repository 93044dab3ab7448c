//! Proactive Attachment stage: picks the bearer for an outgoing request,
//! renewing first when the stored token is about to expire.

use std::sync::Arc;

use chrono::Utc;
use dash_auth::{Session, inspector};

pub struct AttachStage {
    session: Arc<Session>,
}

impl AttachStage {
    pub const fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// Bearer token to send, or `None` for an unauthenticated request.
    ///
    /// A failed proactive refresh still returns the stale token; the
    /// recovery stage deals with the server's answer.
    pub async fn bearer(&self) -> Option<String> {
        let store = self.session.store();
        if !store.is_available() {
            return None;
        }

        let token = store.get_access()?;
        if !inspector::should_refresh(&token, self.session.refresh_threshold_secs(), Utc::now()) {
            return Some(token);
        }

        tracing::debug!("access token near expiry; refreshing before send");
        match self.session.coordinator().refresh_stale(&token).await.pair {
            Some(pair) => Some(pair.access),
            None => {
                tracing::debug!("proactive refresh failed; sending current token");
                Some(token)
            }
        }
    }
}
