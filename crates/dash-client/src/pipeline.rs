//! A client pipeline: attachment, transport, recovery for one endpoint.

use std::fmt;
use std::sync::Arc;

use dash_auth::Session;
use dash_core::{GraphqlRequest, GraphqlResponse};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::attach::AttachStage;
use crate::error::ClientError;
use crate::recover::RecoveryStage;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Application data.
    Main,
    /// Administrative operations, including token renewal.
    System,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Main => "main",
            Self::System => "system",
        })
    }
}

pub struct ClientPipeline {
    endpoint: Endpoint,
    transport: Arc<dyn Transport>,
    attach: AttachStage,
    recovery: RecoveryStage,
}

impl ClientPipeline {
    pub fn new(endpoint: Endpoint, transport: Arc<dyn Transport>, session: &Arc<Session>) -> Self {
        Self {
            endpoint,
            transport,
            attach: AttachStage::new(Arc::clone(session)),
            recovery: RecoveryStage::new(Arc::clone(session)),
        }
    }

    pub const fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Raw response, GraphQL errors included.
    ///
    /// # Errors
    ///
    /// Authentication and transport failures; see [`RecoveryStage::run`].
    pub async fn send(&self, request: &GraphqlRequest) -> Result<GraphqlResponse, ClientError> {
        tracing::debug!(
            endpoint = %self.endpoint,
            operation = %request.display_name(),
            "sending request"
        );
        let result = self
            .recovery
            .run(self.transport.as_ref(), &self.attach, request)
            .await;
        if let Err(ClientError::Transport(error)) = &result {
            let variables = variables_of(request);
            tracing::warn!(
                endpoint = %self.endpoint,
                operation = %request.display_name(),
                variables = %variables,
                error = %error,
                "request failed"
            );
        }
        result
    }

    /// The `data` member of a successful response.
    ///
    /// GraphQL errors are never retried. They surface as
    /// [`ClientError::Graphql`] after being logged with the operation name
    /// and variables.
    ///
    /// # Errors
    ///
    /// Anything [`Self::send`] returns, plus `ClientError::Graphql`.
    pub async fn execute(&self, request: &GraphqlRequest) -> Result<Value, ClientError> {
        let response = self.send(request).await?;
        if response.has_errors() {
            let operation = request.display_name();
            let variables = variables_of(request);
            tracing::warn!(
                endpoint = %self.endpoint,
                operation = %operation,
                variables = %variables,
                errors = ?response.errors,
                "GraphQL errors in response"
            );
            return Err(ClientError::Graphql {
                operation,
                errors: response.errors,
            });
        }
        Ok(response.data.unwrap_or(Value::Null))
    }

    /// [`Self::execute`], deserializing `data` into `T`.
    ///
    /// # Errors
    ///
    /// Anything [`Self::execute`] returns, plus `ClientError::Decode`.
    pub async fn execute_as<T: DeserializeOwned>(
        &self,
        request: &GraphqlRequest,
    ) -> Result<T, ClientError> {
        let data = self.execute(request).await?;
        serde_json::from_value(data).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn variables_of(request: &GraphqlRequest) -> Value {
    Value::Object(request.variables.clone())
}

impl fmt::Debug for ClientPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientPipeline")
            .field("endpoint", &self.endpoint)
            .field("url", &self.transport.endpoint())
            .finish_non_exhaustive()
    }
}
