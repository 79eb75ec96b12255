//! The image job registry and its ingest validation.

mod registry;
mod validation;

pub use registry::{IngestReport, JobRegistry, RegistryStats, Rejection};
pub use validation::validate_file;
