//! Interactive login and logout against the system endpoint.

use std::sync::Arc;

use dash_auth::Session;
use dash_core::{GraphqlRequest, TokenPair};

use crate::error::ClientError;
use crate::renew::{first_error, parse_token_payload};
use crate::transport::Transport;

pub const LOGIN_MUTATION: &str = "mutation Login($email: String!, $password: String!) { \
    auth_login(email: $email, password: $password, mode: json) { access_token refresh_token expires } }";

pub const LOGOUT_MUTATION: &str =
    "mutation Logout($refresh_token: String!) { auth_logout(refresh_token: $refresh_token) }";

pub struct AuthApi {
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
}

impl AuthApi {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<Session>) -> Self {
        Self { transport, session }
    }

    /// Exchange credentials for a token pair and store it.
    ///
    /// # Errors
    ///
    /// `ClientError::LoginRejected` when the server refuses the credentials,
    /// `ClientError::Auth` when the pair cannot be stored.
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenPair, ClientError> {
        let request = GraphqlRequest::new(LOGIN_MUTATION)
            .variable("email", email)
            .variable("password", password);

        let response = self
            .transport
            .send(&request, None)
            .await
            .map_err(|error| match error {
                crate::error::TransportError::Unauthorized => {
                    ClientError::LoginRejected("unauthorized".to_string())
                }
                other => ClientError::Transport(other),
            })?;
        if response.has_errors() {
            return Err(ClientError::LoginRejected(first_error(&response)));
        }
        let grant = parse_token_payload(response.data.as_ref(), "auth_login").ok_or_else(|| {
            ClientError::LoginRejected("response carried no token pair".to_string())
        })?;

        self.session.store().save(&grant.pair)?;
        tracing::info!(
            backend = self.session.store().backend_name(),
            expires_ms = ?grant.expires_ms,
            "logged in"
        );
        Ok(grant.pair)
    }

    /// Revoke the refresh token server-side, then forget local credentials.
    /// The local clear happens even when revocation fails.
    ///
    /// # Errors
    ///
    /// `ClientError::Auth` when the store cannot be cleared.
    pub async fn logout(&self) -> Result<(), ClientError> {
        if let Some(refresh) = self.session.store().get_refresh() {
            let request = GraphqlRequest::new(LOGOUT_MUTATION).variable("refresh_token", refresh);
            match self.transport.send(&request, None).await {
                Ok(response) if response.has_errors() => {
                    tracing::warn!(error = %first_error(&response), "server-side logout failed");
                }
                Ok(_) => tracing::debug!("refresh token revoked"),
                Err(error) => tracing::warn!(%error, "server-side logout failed"),
            }
        }
        self.session.store().clear()?;
        tracing::info!("logged out");
        Ok(())
    }
}
