pub mod batch;
pub mod driver;
pub mod native;

pub use batch::{BatchCoordinator, BatchOutcome};
pub use driver::{
    CompressedImage, CompressionDriver, Compressor, ProgressSender, estimate_duration,
    probe_dimensions,
};
pub use native::NativeCompressor;
