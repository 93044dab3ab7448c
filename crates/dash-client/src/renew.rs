//! Token renewal over the system endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use dash_auth::{AuthError, Renewer};
use dash_core::{GraphqlRequest, GraphqlResponse, TokenPair};
use serde::Deserialize;
use serde_json::Value;

use crate::error::TransportError;
use crate::transport::Transport;

pub const REFRESH_MUTATION: &str = "mutation RefreshToken($refresh_token: String!) { \
    auth_refresh(refresh_token: $refresh_token, mode: json) { access_token refresh_token expires } }";

/// Token payload shared by `auth_login` and `auth_refresh`.
#[derive(Debug, Deserialize)]
struct TokenPayload {
    access_token: Option<String>,
    refresh_token: Option<String>,
    /// Access token lifetime in milliseconds.
    expires: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TokenGrant {
    pub pair: TokenPair,
    pub expires_ms: Option<i64>,
}

/// Pull the grant out of `data.<field>`. `None` when either token is
/// missing or empty.
pub(crate) fn parse_token_payload(data: Option<&Value>, field: &str) -> Option<TokenGrant> {
    let payload = data?.get(field)?;
    let payload = TokenPayload::deserialize(payload).ok()?;
    match (payload.access_token, payload.refresh_token) {
        (Some(access), Some(refresh)) if !access.is_empty() && !refresh.is_empty() => {
            Some(TokenGrant {
                pair: TokenPair::new(access, refresh),
                expires_ms: payload.expires,
            })
        }
        _ => None,
    }
}

/// Sends the refresh mutation straight to the system transport, bypassing
/// attachment and recovery: the refresh token is the credential.
pub struct GraphqlRenewer {
    transport: Arc<dyn Transport>,
}

impl GraphqlRenewer {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl Renewer for GraphqlRenewer {
    async fn renew(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let request =
            GraphqlRequest::new(REFRESH_MUTATION).variable("refresh_token", refresh_token);

        let response = self
            .transport
            .send(&request, None)
            .await
            .map_err(renewal_error)?;

        if response.has_errors() {
            return Err(AuthError::RefreshRejected(first_error(&response)));
        }
        let grant = parse_token_payload(response.data.as_ref(), "auth_refresh").ok_or_else(|| {
            AuthError::RefreshRejected("response carried no token pair".to_string())
        })?;
        tracing::debug!(expires_ms = ?grant.expires_ms, "server issued new token pair");
        Ok(grant.pair)
    }
}

fn renewal_error(error: TransportError) -> AuthError {
    match error {
        TransportError::Unauthorized => AuthError::RefreshRejected(error.to_string()),
        TransportError::Status { status, .. } if (400..500).contains(&status) => {
            AuthError::RefreshRejected(error.to_string())
        }
        other => AuthError::RenewalTransport(other.to_string()),
    }
}

pub(crate) fn first_error(response: &GraphqlResponse) -> String {
    response.errors.first().map_or_else(
        || "unknown error".to_string(),
        |e| {
            e.code()
                .map_or_else(|| e.message.clone(), |code| format!("{code}: {}", e.message))
        },
    )
}
