//! GraphQL endpoint configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct EndpointsConfig {
    /// Main data endpoint (e.g., `https://admin.example.com/graphql`).
    #[serde(default)]
    pub main_url: String,

    /// Privileged system endpoint; also serves the auth mutations.
    #[serde(default)]
    pub system_url: String,
}

impl EndpointsConfig {
    /// Derive both endpoints from a server base URL.
    ///
    /// `https://api.example.com/` becomes `https://api.example.com/graphql`
    /// and `https://api.example.com/graphql/system`.
    pub fn from_base_url(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            main_url: format!("{base}/graphql"),
            system_url: format!("{base}/graphql/system"),
        }
    }

    /// Both endpoints are required.
    pub fn is_configured(&self) -> bool {
        !self.main_url.is_empty() && !self.system_url.is_empty()
    }
}
