use crate::core::{AppConfig, SourceFile};
use crate::utils::ValidationError;

/// Checks one incoming file against the ingest rules: an `image/*` MIME type
/// and a size within the configured limit.
pub fn validate_file(file: &SourceFile, config: &AppConfig) -> Result<(), ValidationError> {
    if !file.mime().starts_with("image/") {
        return Err(ValidationError::NotAnImage {
            mime: file.mime().to_string(),
        });
    }

    if file.size() > config.max_file_size {
        return Err(ValidationError::TooLarge {
            size: file.size(),
            max: config.max_file_size,
        });
    }

    Ok(())
}
