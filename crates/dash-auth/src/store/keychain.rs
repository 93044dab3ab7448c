use super::{FileBackend, KeyValueBackend};
use crate::error::AuthError;

/// OS keychain, one entry per key under a single service name.
///
/// When the keychain is unavailable (headless Linux, locked keychain) writes
/// go to the fallback file instead and reads consult it second.
#[derive(Debug, Clone)]
pub struct KeyringBackend {
    service: String,
    fallback: Option<FileBackend>,
}

impl KeyringBackend {
    pub fn new(service: impl Into<String>, fallback: Option<FileBackend>) -> Self {
        Self {
            service: service.into(),
            fallback,
        }
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, AuthError> {
        keyring::Entry::new(&self.service, key).map_err(|e| AuthError::Keyring(e.to_string()))
    }

    fn set_in_keyring(&self, entries: &[(&str, &str)]) -> Result<(), AuthError> {
        for (key, value) in entries {
            self.entry(key)?
                .set_password(value)
                .map_err(|e| AuthError::Keyring(e.to_string()))?;
        }
        Ok(())
    }

    fn delete_from_keyring(&self, keys: &[&str]) {
        for key in keys {
            let Ok(entry) = self.entry(key) else {
                continue;
            };
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(error) => tracing::debug!(key, %error, "keyring delete failed"),
            }
        }
    }
}

impl KeyValueBackend for KeyringBackend {
    fn name(&self) -> &'static str {
        "keyring"
    }

    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        match self.entry(key).map(|entry| entry.get_password()) {
            Ok(Ok(value)) if !value.is_empty() => return Ok(Some(value)),
            Ok(Ok(_) | Err(keyring::Error::NoEntry)) => {}
            Ok(Err(error)) => tracing::debug!(key, %error, "keyring read failed"),
            Err(error) => tracing::debug!(key, %error, "keyring unavailable"),
        }
        match &self.fallback {
            Some(file) => file.get(key),
            None => Ok(None),
        }
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), AuthError> {
        let error = match self.set_in_keyring(entries) {
            Ok(()) => {
                // Drop copies left behind by an earlier keyring outage.
                if let Some(file) = &self.fallback {
                    let keys: Vec<&str> = entries.iter().map(|(key, _)| *key).collect();
                    if let Err(error) = file.remove_many(&keys) {
                        tracing::warn!(%error, "failed to prune fallback credentials file");
                    }
                }
                return Ok(());
            }
            Err(error) => error,
        };

        // Undo the partial write so readers fall through to one consistent source.
        let keys: Vec<&str> = entries.iter().map(|(key, _)| *key).collect();
        self.delete_from_keyring(&keys);

        match &self.fallback {
            Some(file) => {
                tracing::warn!(%error, "keyring store failed; falling back to file");
                file.set_many(entries)
            }
            None => Err(error),
        }
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), AuthError> {
        self.delete_from_keyring(keys);
        match &self.fallback {
            Some(file) => file.remove_many(keys),
            None => Ok(()),
        }
    }
}
