//! The settings store: current compression parameters, the active preset
//! and view preferences, persisted as one JSON record.

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use crate::core::{CompressionSettings, DEFAULT_NAMING_PATTERN, PREFERENCES_KEY};
use crate::utils::{CompressorError, CompressorResult, ImageFormat, ValidationError};
use crate::view::ViewPreferences;
use super::presets::PresetMode;
use super::storage::PreferenceStorage;

/// The persisted preference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Preferences {
    pub preset: PresetMode,
    pub quality: u8,
    pub max_dimension: Option<u32>,
    pub output_format: Option<ImageFormat>,
    pub preserve_metadata: bool,
    pub naming_pattern: String,
    pub view: Option<ViewPreferences>,
}

impl Default for Preferences {
    fn default() -> Self {
        let web = PresetMode::Web.preset();
        Self {
            preset: PresetMode::Web,
            quality: web.quality,
            max_dimension: web.max_dimension,
            output_format: web.format,
            preserve_metadata: false,
            naming_pattern: DEFAULT_NAMING_PATTERN.to_string(),
            view: None,
        }
    }
}

pub struct SettingsStore {
    prefs: Preferences,
    storage: Arc<dyn PreferenceStorage>,
    key: String,
}

impl SettingsStore {
    /// Loads preferences from `storage` under the default key.
    pub fn load(storage: Arc<dyn PreferenceStorage>) -> Self {
        Self::load_with_key(storage, PREFERENCES_KEY)
    }

    /// Best-effort load: absent, unreadable, corrupt or invalid records all
    /// fall back to the defaults.
    pub fn load_with_key(storage: Arc<dyn PreferenceStorage>, key: impl Into<String>) -> Self {
        let key = key.into();
        let prefs = match storage.get(&key) {
            Ok(Some(raw)) => match serde_json::from_str::<Preferences>(&raw) {
                Ok(prefs) if Self::settings_of(&prefs).validate().is_ok() => prefs,
                Ok(_) => {
                    debug!("Stored preferences out of range, using defaults");
                    Preferences::default()
                }
                Err(e) => {
                    debug!("Stored preferences unreadable ({e}), using defaults");
                    Preferences::default()
                }
            },
            Ok(None) => Preferences::default(),
            Err(e) => {
                debug!("Preference storage unavailable ({e}), using defaults");
                Preferences::default()
            }
        };

        Self { prefs, storage, key }
    }

    fn settings_of(prefs: &Preferences) -> CompressionSettings {
        CompressionSettings {
            quality: prefs.quality,
            max_dimension: prefs.max_dimension,
            output_format: prefs.output_format,
            preserve_metadata: prefs.preserve_metadata,
            naming_pattern: prefs.naming_pattern.clone(),
        }
    }

    /// Rewrites the record. Failures are logged, never surfaced.
    fn persist(&self) {
        let result = serde_json::to_string(&self.prefs)
            .map_err(CompressorError::from)
            .and_then(|raw| self.storage.set(&self.key, &raw));
        if let Err(e) = result {
            warn!("Failed to persist preferences: {e}");
        }
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    /// A value copy of the current parameters, taken when a batch starts.
    pub fn snapshot(&self) -> CompressionSettings {
        Self::settings_of(&self.prefs)
    }

    pub fn preset(&self) -> PresetMode {
        self.prefs.preset
    }

    pub fn naming_pattern(&self) -> &str {
        &self.prefs.naming_pattern
    }

    pub fn view(&self) -> ViewPreferences {
        self.prefs.view.unwrap_or_default()
    }

    /// Switches the active preset. Non-custom presets overwrite quality, max
    /// dimension and format; `Custom` leaves the current values alone.
    pub fn select_preset(&mut self, mode: PresetMode) {
        self.prefs.preset = mode;
        if mode != PresetMode::Custom {
            let preset = mode.preset();
            self.prefs.quality = preset.quality;
            self.prefs.max_dimension = preset.max_dimension;
            self.prefs.output_format = preset.format;
        }
        debug!("Preset set to {:?}", mode);
        self.persist();
    }

    pub fn set_quality(&mut self, quality: u8) -> CompressorResult<()> {
        if quality == 0 || quality > 100 {
            return Err(ValidationError::settings(format!(
                "Invalid quality value: {quality}. Must be between 1 and 100"
            ))
            .into());
        }
        self.prefs.quality = quality;
        self.prefs.preset = PresetMode::Custom;
        self.persist();
        Ok(())
    }

    pub fn set_max_dimension(&mut self, max_dimension: Option<u32>) -> CompressorResult<()> {
        if max_dimension == Some(0) {
            return Err(ValidationError::settings("Max dimension cannot be 0").into());
        }
        self.prefs.max_dimension = max_dimension;
        self.prefs.preset = PresetMode::Custom;
        self.persist();
        Ok(())
    }

    pub fn set_output_format(&mut self, format: Option<ImageFormat>) {
        self.prefs.output_format = format;
        self.prefs.preset = PresetMode::Custom;
        self.persist();
    }

    /// Does not affect the active preset.
    pub fn set_preserve_metadata(&mut self, preserve: bool) {
        self.prefs.preserve_metadata = preserve;
        self.persist();
    }

    /// Does not affect the active preset.
    pub fn set_naming_pattern(&mut self, pattern: impl Into<String>) -> CompressorResult<()> {
        let pattern = pattern.into();
        if pattern.trim().is_empty() {
            return Err(ValidationError::settings("Naming pattern cannot be empty").into());
        }
        self.prefs.naming_pattern = pattern;
        self.persist();
        Ok(())
    }

    pub fn set_view(&mut self, view: ViewPreferences) {
        self.prefs.view = Some(view);
        self.persist();
    }
}
