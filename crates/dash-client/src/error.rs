use dash_auth::AuthError;
use dash_config::ConfigError;
use dash_core::GraphqlError;
use thiserror::Error;

/// How a single round-trip to one endpoint failed.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("unauthorized (HTTP 401)")]
    Unauthorized,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid response body: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected our credentials. `retried` is true when the
    /// rejection came after a successful refresh.
    #[error("unauthorized (retried after refresh: {retried})")]
    Unauthorized { retried: bool },

    /// Refresh failed and stored credentials were cleared.
    #[error("session ended; run `dash auth login`")]
    SessionEnded,

    #[error(transparent)]
    Transport(TransportError),

    #[error("GraphQL errors in {operation}: {}", messages(.errors))]
    Graphql {
        operation: String,
        errors: Vec<GraphqlError>,
    },

    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("login rejected: {0}")]
    LoginRejected(String),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl From<TransportError> for ClientError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Unauthorized => Self::Unauthorized { retried: false },
            other => Self::Transport(other),
        }
    }
}

fn messages(errors: &[GraphqlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
