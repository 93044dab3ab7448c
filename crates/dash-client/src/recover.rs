//! Reactive Recovery stage: runs a request and, on HTTP 401, renews the
//! credentials and re-issues it exactly once.

use std::sync::Arc;

use dash_auth::Session;
use dash_core::{GraphqlRequest, GraphqlResponse};

use crate::attach::AttachStage;
use crate::error::{ClientError, TransportError};
use crate::transport::Transport;

pub struct RecoveryStage {
    session: Arc<Session>,
}

impl RecoveryStage {
    pub const fn new(session: Arc<Session>) -> Self {
        Self { session }
    }

    /// # Errors
    ///
    /// `ClientError::SessionEnded` when renewal fails after a 401,
    /// `ClientError::Unauthorized { retried: true }` when the retry is
    /// rejected too, and any other transport failure unchanged.
    pub async fn run(
        &self,
        transport: &dyn Transport,
        attach: &AttachStage,
        request: &GraphqlRequest,
    ) -> Result<GraphqlResponse, ClientError> {
        let bearer = attach.bearer().await;
        match transport.send(request, bearer.as_deref()).await {
            Err(TransportError::Unauthorized) => {}
            other => return other.map_err(ClientError::from),
        }

        if !self.session.store().is_available() {
            return Err(ClientError::Unauthorized { retried: false });
        }

        tracing::debug!(
            operation = %request.display_name(),
            endpoint = transport.endpoint(),
            "request unauthorized; renewing credentials"
        );
        let outcome = self
            .session
            .coordinator()
            .refresh_stale(bearer.as_deref().unwrap_or_default())
            .await;

        // The coordinator has already cleared the store and announced the end.
        let Some(pair) = outcome.pair else {
            tracing::debug!(attempt = outcome.attempt, "credentials unrecoverable");
            return Err(ClientError::SessionEnded);
        };

        match transport.send(request, Some(&pair.access)).await {
            Err(TransportError::Unauthorized) => {
                tracing::warn!(
                    operation = %request.display_name(),
                    endpoint = transport.endpoint(),
                    "request rejected again after token refresh"
                );
                Err(ClientError::Unauthorized { retried: true })
            }
            other => other.map_err(ClientError::from),
        }
    }
}
