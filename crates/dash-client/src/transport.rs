//! One HTTP round-trip to one GraphQL endpoint. No credential logic here.

use async_trait::async_trait;
use dash_config::HttpConfig;
use dash_core::{GraphqlRequest, GraphqlResponse};
use reqwest::StatusCode;

use crate::error::TransportError;

const MAX_ERROR_BODY_CHARS: usize = 512;

#[async_trait]
pub trait Transport: Send + Sync {
    /// Endpoint URL, for logs.
    fn endpoint(&self) -> &str;

    /// POST `request`, attaching `bearer` as `Authorization: Bearer` when given.
    ///
    /// # Errors
    ///
    /// `TransportError::Unauthorized` for HTTP 401, `Status` for any other
    /// non-success without a GraphQL error body, `Network` when the server
    /// cannot be reached, `Decode` for an unparseable success body.
    async fn send(
        &self,
        request: &GraphqlRequest,
        bearer: Option<&str>,
    ) -> Result<GraphqlResponse, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    /// Build a transport with its own `reqwest::Client` configured from `http`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::Network` if the TLS backend cannot initialize.
    pub fn from_config(url: impl Into<String>, http: &HttpConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(http.timeout())
            .user_agent(http.user_agent.clone())
            .build()
            .map_err(|e| TransportError::Network(format!("build http client: {e}")))?;
        Ok(Self::new(url, client))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn endpoint(&self) -> &str {
        &self.url
    }

    async fn send(
        &self,
        request: &GraphqlRequest,
        bearer: Option<&str>,
    ) -> Result<GraphqlResponse, TransportError> {
        let mut builder = self.client.post(&self.url).json(request);
        if let Some(token) = bearer {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(TransportError::Unauthorized);
        }

        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Network(format!("read body: {e}")))?;

        if !status.is_success() {
            // Validation failures often come back as 400 with a proper
            // `errors` array; those belong to the caller as GraphQL errors.
            if let Ok(parsed) = serde_json::from_str::<GraphqlResponse>(&body) {
                if parsed.has_errors() {
                    return Ok(parsed);
                }
            }
            return Err(TransportError::Status {
                status: status.as_u16(),
                body: truncate(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| TransportError::Decode(e.to_string()))
    }
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
    cut.push('…');
    cut
}
