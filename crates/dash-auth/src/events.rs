//! Session lifecycle notifications.
//!
//! The layer never navigates anywhere itself. It announces that the session
//! ended and the composition root decides what that means (open a login page,
//! print a hint, exit).

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Refresh attempt `attempt` stored a new token pair.
    Renewed { attempt: u64 },
    /// Refresh attempt `attempt` failed; credentials are gone and the user
    /// must authenticate again.
    Ended {
        attempt: u64,
        login_url: Option<String>,
    },
}

#[derive(Debug)]
pub struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
    last_ended: AtomicU64,
    login_url: Option<String>,
}

impl SessionEvents {
    pub fn new(login_url: Option<String>) -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            tx,
            last_ended: AtomicU64::new(0),
            login_url,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn renewed(&self, attempt: u64) {
        let _ = self.tx.send(SessionEvent::Renewed { attempt });
    }

    /// Announce the end of the session caused by failed attempt `attempt`.
    ///
    /// Emits at most once per attempt no matter how many requests were
    /// waiting on it. Returns whether this call emitted.
    pub(crate) fn end(&self, attempt: u64) -> bool {
        if self.last_ended.fetch_max(attempt, Ordering::SeqCst) >= attempt {
            return false;
        }
        tracing::warn!(attempt, "session ended; re-authentication required");
        let _ = self.tx.send(SessionEvent::Ended {
            attempt,
            login_url: self.login_url.clone(),
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_emits_once_per_attempt() {
        let events = SessionEvents::new(Some("https://admin.example.com/login".into()));
        let mut rx = events.subscribe();

        assert!(events.end(1));
        assert!(!events.end(1));
        assert!(!events.end(1));

        assert_eq!(
            rx.try_recv().expect("one event"),
            SessionEvent::Ended {
                attempt: 1,
                login_url: Some("https://admin.example.com/login".into()),
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn later_attempts_emit_again() {
        let events = SessionEvents::new(None);
        assert!(events.end(1));
        assert!(events.end(3));
        assert!(!events.end(2), "older attempts stay suppressed");
    }

    #[test]
    fn sending_without_subscribers_is_fine() {
        let events = SessionEvents::new(None);
        events.renewed(1);
        assert!(events.end(1));
    }
}
