//! Scripted transports and token helpers for pipeline unit tests.

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use dash_auth::{AuthError, CredentialStore, Renewer, Session, SessionOptions};
use dash_core::{GraphqlRequest, GraphqlResponse, TokenPair};
use parking_lot::Mutex;
use serde_json::json;

use crate::error::TransportError;
use crate::transport::Transport;

/// Unsigned JWT expiring `secs` from now.
pub fn jwt_expiring_in(subject: &str, secs: i64) -> String {
    let exp = chrono::Utc::now().timestamp() + secs;
    let header = URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"id":"{subject}","exp":{exp}}}"#));
    format!("{header}.{payload}.c2ln")
}

pub fn ok_response() -> GraphqlResponse {
    GraphqlResponse {
        data: Some(json!({"ok": true})),
        errors: Vec::new(),
    }
}

type Responder = dyn Fn(Option<&str>) -> Result<GraphqlResponse, TransportError> + Send + Sync;

/// Transport answering from a closure over the bearer it was given.
pub struct ScriptedTransport {
    responder: Box<Responder>,
    bearers: Mutex<Vec<Option<String>>>,
}

impl ScriptedTransport {
    pub fn new(
        responder: impl Fn(Option<&str>) -> Result<GraphqlResponse, TransportError>
        + Send
        + Sync
        + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            bearers: Mutex::new(Vec::new()),
        })
    }

    /// Accepts exactly `token`, answers 401 to anything else.
    pub fn accepting(token: &str) -> Arc<Self> {
        let token = token.to_string();
        Self::new(move |bearer| {
            if bearer == Some(token.as_str()) {
                Ok(ok_response())
            } else {
                Err(TransportError::Unauthorized)
            }
        })
    }

    pub fn bearers(&self) -> Vec<Option<String>> {
        self.bearers.lock().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    fn endpoint(&self) -> &str {
        "scripted://graphql"
    }

    async fn send(
        &self,
        _request: &GraphqlRequest,
        bearer: Option<&str>,
    ) -> Result<GraphqlResponse, TransportError> {
        self.bearers.lock().push(bearer.map(str::to_string));
        tokio::task::yield_now().await;
        (self.responder)(bearer)
    }
}

/// Renewer handing out a fixed pair (or failing) after `delay`.
pub struct CountingRenewer {
    calls: AtomicUsize,
    delay: Duration,
    pair: Option<TokenPair>,
}

impl CountingRenewer {
    pub fn returning(pair: TokenPair) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(50),
            pair: Some(pair),
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            delay: Duration::from_millis(50),
            pair: None,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Renewer for CountingRenewer {
    async fn renew(&self, _refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.pair
            .clone()
            .ok_or_else(|| AuthError::RefreshRejected("INVALID_CREDENTIALS".into()))
    }
}

/// Session over an in-memory store seeded with `pair`.
pub fn session_with(pair: Option<TokenPair>, renewer: Arc<CountingRenewer>) -> Arc<Session> {
    let store = CredentialStore::in_memory();
    if let Some(pair) = pair {
        store.save(&pair).expect("seed store");
    }
    Session::new(
        Arc::new(store),
        renewer,
        SessionOptions {
            login_url: Some("https://admin.example.com/login".into()),
            ..SessionOptions::default()
        },
    )
}

/// Log lines written while the returned value is alive, on this thread.
pub struct CapturedLogs {
    buffer: Arc<Mutex<Vec<u8>>>,
    _guard: tracing::subscriber::DefaultGuard,
}

impl CapturedLogs {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.buffer.lock()).into_owned()
    }
}

pub fn capture_logs() -> CapturedLogs {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&buffer);
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .with_writer(move || LogSink(Arc::clone(&sink)))
        .finish();
    CapturedLogs {
        buffer,
        _guard: tracing::subscriber::set_default(subscriber),
    }
}

struct LogSink(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
