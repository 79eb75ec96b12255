pub mod error;
pub mod formats;
pub mod logging;
pub mod size;

pub use error::{CompressorError, CompressorResult, ValidationError};
pub use formats::{ImageFormat, mime_from_file_name};
pub use logging::LogConfig;
pub use size::{compression_ratio, format_bytes, reduction_percent};
