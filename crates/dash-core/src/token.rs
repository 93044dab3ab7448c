use std::fmt;

use serde::{Deserialize, Serialize};

/// Access and refresh credential, always written and replaced together.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// Short-lived bearer credential (a three-segment JWT).
    pub access: String,
    /// Opaque renewal credential.
    pub refresh: String,
}

impl TokenPair {
    #[must_use]
    pub fn new(access: impl Into<String>, refresh: impl Into<String>) -> Self {
        Self {
            access: access.into(),
            refresh: refresh.into(),
        }
    }
}

// Tokens end up in tracing fields through `?pair`; keep them out of logs.
impl fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &redact(&self.access))
            .field("refresh", &redact(&self.refresh))
            .finish()
    }
}

fn redact(secret: &str) -> String {
    format!("<{} bytes>", secret.len())
}
