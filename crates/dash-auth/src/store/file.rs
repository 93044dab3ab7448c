use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};

use super::KeyValueBackend;
use crate::error::AuthError;

/// JSON object file, rewritten atomically on every change.
#[derive(Debug, Clone)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_map(&self) -> Result<BTreeMap<String, String>, AuthError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => {
                return Err(AuthError::Storage(format!(
                    "read {}: {e}",
                    self.path.display()
                )));
            }
        };
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&contents)
            .map_err(|e| AuthError::Storage(format!("parse {}: {e}", self.path.display())))
    }

    /// Write to a unique temp file, then rename over the target.
    fn write_map(&self, map: &BTreeMap<String, String>) -> Result<(), AuthError> {
        static COUNTER: AtomicU32 = AtomicU32::new(0);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| AuthError::Storage(format!("mkdir {}: {e}", parent.display())))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                    tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
                }
            }
        }

        let json = serde_json::to_string_pretty(map)
            .map_err(|e| AuthError::Storage(format!("encode credentials: {e}")))?;
        let seq = COUNTER.fetch_add(1, Ordering::Relaxed);
        let tmp_name = format!(
            "{}.{}.{}.tmp",
            self.path
                .file_name()
                .unwrap_or_default()
                .to_string_lossy(),
            std::process::id(),
            seq,
        );
        let tmp_path = self.path.with_file_name(tmp_name);
        fs::write(&tmp_path, json)
            .map_err(|e| AuthError::Storage(format!("write {}: {e}", tmp_path.display())))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                AuthError::Storage(format!("chmod {}: {e}", tmp_path.display()))
            })?;
        }

        fs::rename(&tmp_path, &self.path)
            .map_err(|e| AuthError::Storage(format!("rename {}: {e}", self.path.display())))
    }
}

impl KeyValueBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        Ok(self.read_map()?.remove(key))
    }

    fn set_many(&self, entries: &[(&str, &str)]) -> Result<(), AuthError> {
        let mut map = self.read_map().unwrap_or_else(|error| {
            tracing::warn!(%error, "unreadable credentials file; starting fresh");
            BTreeMap::new()
        });
        for (key, value) in entries {
            map.insert((*key).to_string(), (*value).to_string());
        }
        self.write_map(&map)
    }

    fn remove_many(&self, keys: &[&str]) -> Result<(), AuthError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut map = self.read_map().unwrap_or_default();
        for key in keys {
            map.remove(*key);
        }
        if map.is_empty() {
            return fs::remove_file(&self.path).or_else(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    Ok(())
                } else {
                    Err(AuthError::Storage(format!(
                        "failed to delete {}: {e}",
                        self.path.display()
                    )))
                }
            });
        }
        self.write_map(&map)
    }
}
