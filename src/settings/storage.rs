//! Key/value backends for the preference record.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;
use crate::utils::{CompressorError, CompressorResult};

/// Client-local string storage, the shape of a browser's `localStorage`.
pub trait PreferenceStorage: Send + Sync {
    fn get(&self, key: &str) -> CompressorResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> CompressorResult<()>;
}

/// Volatile storage, used by tests and hosts that do not persist.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStorage for MemoryStorage {
    fn get(&self, key: &str) -> CompressorResult<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| CompressorError::storage("memory storage poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CompressorResult<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CompressorError::storage("memory storage poisoned"))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<config dir>/image-compressor`, falling back to the temp directory.
    pub fn default_location() -> Self {
        let base = dirs::config_dir().unwrap_or_else(std::env::temp_dir);
        Self::new(base.join("image-compressor"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let sanitized: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{sanitized}.json"))
    }
}

impl PreferenceStorage for FileStorage {
    fn get(&self, key: &str) -> CompressorResult<Option<String>> {
        let path = self.path_for(key);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> CompressorResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);
        std::fs::write(&path, value)?;
        debug!("Preferences written to {}", path.display());
        Ok(())
    }
}
