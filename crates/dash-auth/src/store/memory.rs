use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use super::KeyValueBackend;
use crate::error::AuthError;

/// Process-local storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryBackend {
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), AuthError> {
        let mut map = self.entries.lock();
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        Ok(())
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), AuthError> {
        let mut map = self.entries.lock();
        for key in keys {
            map.remove(*key);
        }
        Ok(())
    }
}

/// No local session medium: nothing is kept, nothing is found.
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedBackend;

impl KeyValueBackend for DetachedBackend {
    fn name(&self) -> &'static str {
        "none"
    }

    fn get(&self, _key: &str) -> Result<Option<String>, AuthError> {
        Ok(None)
    }

    fn set_many(&self, _entries: &[(&str, &str)]) -> Result<(), AuthError> {
        Ok(())
    }

    fn remove_many(&self, _keys: &[&str]) -> Result<(), AuthError> {
        Ok(())
    }

    fn is_available(&self) -> bool {
        false
    }
}
