//! Credential Store: one logical [`TokenPair`] replicated under every key
//! name older sessions may have used.
//!
//! Writers always touch every alias; readers walk the aliases in priority
//! order. The backend only needs to be a string key/value store.

mod file;
mod keychain;
mod memory;

pub use self::file::FileBackend;
pub use self::keychain::KeyringBackend;
pub use self::memory::{DetachedBackend, MemoryBackend};

use dash_core::TokenPair;
use parking_lot::RwLock;

use crate::error::AuthError;

/// Access-token keys, canonical first.
pub const ACCESS_TOKEN_KEYS: [&str; 3] = ["access_token", "accessToken", "auth_token"];
/// Refresh-token keys, canonical first.
pub const REFRESH_TOKEN_KEYS: [&str; 3] = ["refresh_token", "refreshToken", "auth_refresh_token"];

/// Durable string key/value storage underneath the [`CredentialStore`].
pub trait KeyValueBackend: Send + Sync {
    /// Short name for status output and logs.
    fn name(&self) -> &'static str;

    /// # Errors
    ///
    /// Returns `AuthError` if the medium cannot be read.
    fn get(&self, key: &str) -> Result<Option<String>, AuthError>;

    /// Write every entry, or none of them where the medium allows.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the medium cannot be written.
    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), AuthError>;

    /// Remove every key. Missing keys are not an error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the medium cannot be written.
    fn remove_many(&self, keys: &[&str]) -> Result<(), AuthError>;

    /// `false` when there is no local session medium at all.
    fn is_available(&self) -> bool {
        true
    }
}

pub struct CredentialStore {
    backend: Box<dyn KeyValueBackend>,
    // Writers hold it across all aliases so readers never see half a pair.
    lock: RwLock<()>,
}

impl CredentialStore {
    pub fn new(backend: impl KeyValueBackend + 'static) -> Self {
        Self::from_boxed(Box::new(backend))
    }

    pub fn from_boxed(backend: Box<dyn KeyValueBackend>) -> Self {
        Self {
            backend,
            lock: RwLock::new(()),
        }
    }

    /// In-process store, mostly for tests.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::default())
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// First non-empty access token across the aliases.
    #[must_use]
    pub fn get_access(&self) -> Option<String> {
        let _guard = self.lock.read();
        self.first_of(&ACCESS_TOKEN_KEYS)
    }

    /// First non-empty refresh token across the aliases.
    #[must_use]
    pub fn get_refresh(&self) -> Option<String> {
        let _guard = self.lock.read();
        self.first_of(&REFRESH_TOKEN_KEYS)
    }

    /// Both halves under one read lock; `None` unless both exist.
    #[must_use]
    pub fn load_pair(&self) -> Option<TokenPair> {
        let _guard = self.lock.read();
        let access = self.first_of(&ACCESS_TOKEN_KEYS)?;
        let refresh = self.first_of(&REFRESH_TOKEN_KEYS)?;
        Some(TokenPair { access, refresh })
    }

    /// Replace the stored pair under every alias.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the backend rejects the write.
    pub fn save(&self, pair: &TokenPair) -> Result<(), AuthError> {
        let _guard = self.lock.write();
        let entries: Vec<(&str, &str)> = ACCESS_TOKEN_KEYS
            .iter()
            .map(|key| (*key, pair.access.as_str()))
            .chain(
                REFRESH_TOKEN_KEYS
                    .iter()
                    .map(|key| (*key, pair.refresh.as_str())),
            )
            .collect();
        self.backend.set_many(&entries)?;
        tracing::debug!(backend = self.backend.name(), "stored token pair");
        Ok(())
    }

    /// Remove every alias of both tokens. Safe to call on an empty store.
    ///
    /// # Errors
    ///
    /// Returns `AuthError` if the backend rejects the removal.
    pub fn clear(&self) -> Result<(), AuthError> {
        let _guard = self.lock.write();
        let keys: Vec<&str> = ACCESS_TOKEN_KEYS
            .iter()
            .chain(REFRESH_TOKEN_KEYS.iter())
            .copied()
            .collect();
        self.backend.remove_many(&keys)?;
        tracing::debug!(backend = self.backend.name(), "cleared stored credentials");
        Ok(())
    }

    fn first_of(&self, keys: &[&str]) -> Option<String> {
        for key in keys {
            match self.backend.get(key) {
                Ok(Some(value)) if !value.is_empty() => return Some(value),
                Ok(_) => {}
                Err(error) => {
                    tracing::warn!(key, %error, "credential read failed; trying next alias");
                }
            }
        }
        None
    }
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("backend", &self.backend.name())
            .finish_non_exhaustive()
    }
}
