//! Compression settings, presets and their persistence.

mod presets;
mod storage;
mod store;

pub use presets::{Preset, PresetMode, format_recommendation, recommended_format};
pub use storage::{FileStorage, MemoryStorage, PreferenceStorage};
pub use store::{Preferences, SettingsStore};
