//! Credential storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

const DEFAULT_KEYRING_SERVICE: &str = "dash-admin";

fn default_keyring_service() -> String {
    DEFAULT_KEYRING_SERVICE.to_string()
}

/// Where tokens are persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// OS keychain, falling back to the credentials file.
    #[default]
    Keyring,
    /// JSON credentials file only.
    File,
    /// Process memory; nothing survives exit.
    Memory,
    /// No local session at all (non-interactive use).
    None,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Keyring service name.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    /// Credentials file path. Empty means `~/.dash/credentials.json`.
    #[serde(default)]
    pub credentials_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            keyring_service: default_keyring_service(),
            credentials_path: String::new(),
        }
    }
}

impl StorageConfig {
    /// Resolved credentials file path, `None` if no home directory exists.
    pub fn credentials_path(&self) -> Option<PathBuf> {
        if !self.credentials_path.is_empty() {
            return Some(PathBuf::from(&self.credentials_path));
        }
        dirs::home_dir().map(|home| home.join(".dash").join("credentials.json"))
    }
}
