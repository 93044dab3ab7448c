//! # dash-config
//!
//! Layered configuration loading for dash using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`DASH_*` prefix, `__` as separator)
//! 2. Project-level `.dash/config.toml`
//! 3. User-level `~/.config/dash/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `DASH_ENDPOINTS__MAIN_URL` -> `endpoints.main_url`,
//! `DASH_AUTH__REFRESH_THRESHOLD_SECS` -> `auth.refresh_threshold_secs`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use dash_config::DashConfig;
//!
//! let config = DashConfig::load_with_dotenv().expect("config");
//! if config.endpoints.is_configured() {
//!     println!("main endpoint: {}", config.endpoints.main_url);
//! }
//! ```

mod auth;
mod endpoints;
mod error;
mod http;
mod storage;

pub use auth::AuthConfig;
pub use endpoints::EndpointsConfig;
pub use error::ConfigError;
pub use http::HttpConfig;
pub use storage::{StorageBackend, StorageConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DashConfig {
    #[serde(default)]
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

impl DashConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source fails to parse, or
    /// `ConfigError::InvalidValue` if a loaded value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support from the current directory.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".dash/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("DASH_").split("__"))
    }

    /// Reject values no component can work with.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.refresh_threshold_secs < 0 {
            return Err(ConfigError::InvalidValue {
                field: "auth.refresh_threshold_secs".into(),
                reason: "must not be negative".into(),
            });
        }
        // Late waiters share a failed refresh only inside this window.
        if self.auth.failure_cooldown_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "auth.failure_cooldown_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "http.timeout_secs".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Fail unless both GraphQL endpoints are set.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotConfigured` for the `endpoints` section.
    pub fn require_endpoints(&self) -> Result<&EndpointsConfig, ConfigError> {
        if self.endpoints.is_configured() {
            Ok(&self.endpoints)
        } else {
            Err(ConfigError::NotConfigured {
                section: "endpoints".into(),
            })
        }
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("dash").join("config.toml"))
    }
}
