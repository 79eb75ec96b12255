use serde::{Deserialize, Serialize};

pub const MAX_FILE_SIZE: u64 = 50 * 1024 * 1024;
pub const MAX_RETRY_ATTEMPTS: u32 = 3;
pub const PREFERENCES_KEY: &str = "image-compressor-settings";

/// Application-level limits and names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AppConfig {
    /// Largest accepted input in bytes
    pub max_file_size: u64,
    /// Retries allowed per job before further attempts are refused
    pub max_retry_attempts: u32,
    /// Storage key of the persisted preference record
    pub preferences_key: String,
    pub all_archive_prefix: String,
    pub selected_archive_prefix: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            max_retry_attempts: MAX_RETRY_ATTEMPTS,
            preferences_key: PREFERENCES_KEY.to_string(),
            all_archive_prefix: "compressed-images".to_string(),
            selected_archive_prefix: "selected-images".to_string(),
        }
    }
}
