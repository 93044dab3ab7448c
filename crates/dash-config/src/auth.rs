//! Session lifecycle configuration.

use serde::{Deserialize, Serialize};

/// Default proactive refresh window in seconds.
const fn default_refresh_threshold_secs() -> i64 {
    300
}

/// Default window during which a failed refresh is reused.
const fn default_failure_cooldown_secs() -> u64 {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Refresh the access token when it expires within this many seconds.
    #[serde(default = "default_refresh_threshold_secs")]
    pub refresh_threshold_secs: i64,

    /// After a failed refresh, later callers reuse the failure for this long
    /// instead of starting a new attempt.
    #[serde(default = "default_failure_cooldown_secs")]
    pub failure_cooldown_secs: u64,

    /// Re-authentication entry point announced when the session ends.
    #[serde(default)]
    pub login_url: String,

    /// Open `login_url` in the browser when the session ends.
    #[serde(default)]
    pub open_login_on_expiry: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            refresh_threshold_secs: default_refresh_threshold_secs(),
            failure_cooldown_secs: default_failure_cooldown_secs(),
            login_url: String::new(),
            open_login_on_expiry: false,
        }
    }
}

impl AuthConfig {
    /// `login_url` if one is configured.
    pub fn login_url(&self) -> Option<&str> {
        Some(self.login_url.as_str()).filter(|url| !url.is_empty())
    }
}
