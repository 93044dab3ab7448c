use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated; run `dash auth login`")]
    NotAuthenticated,

    #[error("credential storage error: {0}")]
    Storage(String),

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("token renewal rejected: {0}")]
    RefreshRejected(String),

    #[error("token renewal transport error: {0}")]
    RenewalTransport(String),

    #[error("{0}")]
    Other(String),
}
