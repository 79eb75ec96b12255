// Module declarations in dependency order
pub mod utils;
pub mod core;
pub mod registry;
pub mod settings;
pub mod view;
pub mod processing;
pub mod export;

// Public exports for external consumers
pub use core::{
    AppConfig, AppEvent, AppState, ChannelSink, CompressedArtifact, CompressionSettings, EventSink,
    ImageJob, JobId, JobState, JobStatus, Notification, NotificationLevel, SourceFile, TracingSink,
};
pub use export::{DirectorySink, Download, DownloadSink, ExportPackager, MemorySink};
pub use processing::{BatchOutcome, Compressor, NativeCompressor};
pub use registry::{IngestReport, JobRegistry};
pub use settings::{FileStorage, MemoryStorage, PresetMode, SettingsStore};
pub use utils::{CompressorError, CompressorResult, ImageFormat};
pub use view::{SortKey, SortOrder, StatusFilter, ViewMode, ViewPreferences};
