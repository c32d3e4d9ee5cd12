//! Factory presets bundled with freqresp.
//!
//! Built-in analysis configurations that are always available without
//! external files. Each one targets a common measurement task.

use std::path::Path;

use crate::{AnalysisConfig, ConfigError};

/// Array of factory preset names for external access.
pub static FACTORY_PRESET_NAMES: &[&str] = &["amplitude", "psd", "drift"];

/// TOML content for factory presets, embedded at compile time.
static FACTORY_PRESETS_TOML: &[(&str, &str)] = &[
    ("amplitude", AMPLITUDE_PRESET),
    ("psd", PSD_PRESET),
    ("drift", DRIFT_PRESET),
];

/// Amplitude-accurate gain readings at discrete frequencies.
const AMPLITUDE_PRESET: &str = r#"
name = "Amplitude"
description = "Flat-top window for amplitude-accurate gain at tonal components"
segment_length = 1024
window = "flat-top"
scaling = "spectrum"
detrend = "constant"
"#;

/// Broadband noise measurements.
const PSD_PRESET: &str = r#"
name = "PSD"
description = "Hann window with density scaling for broadband stimuli"
segment_length = 1024
window = "hann"
scaling = "density"
detrend = "constant"
"#;

/// Recordings with slow baseline wander.
const DRIFT_PRESET: &str = r#"
name = "Drift"
description = "Linear detrend per segment for recordings with baseline drift"
segment_length = 1024
window = "hann"
scaling = "density"
detrend = "linear"
"#;

/// Get all factory presets.
///
/// # Example
///
/// ```rust
/// use freqresp_config::factory_presets;
///
/// for preset in factory_presets() {
///     println!("  - {}: {}", preset.name, preset.description.as_deref().unwrap_or(""));
/// }
/// ```
pub fn factory_presets() -> Vec<AnalysisConfig> {
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(_, toml)| AnalysisConfig::from_toml(toml).ok())
        .collect()
}

/// Get a factory preset by key or display name, case-insensitively.
///
/// ```rust
/// use freqresp_config::get_factory_preset;
///
/// let preset = get_factory_preset("PSD").unwrap();
/// assert_eq!(preset.window, "hann");
/// ```
pub fn get_factory_preset(name: &str) -> Option<AnalysisConfig> {
    let name_lower = name.to_lowercase();
    FACTORY_PRESETS_TOML
        .iter()
        .filter_map(|(key, toml)| Some((*key, AnalysisConfig::from_toml(toml).ok()?)))
        .find(|(key, preset)| *key == name_lower || preset.name.to_lowercase() == name_lower)
        .map(|(_, preset)| preset)
}

/// Check if a name refers to a factory preset.
pub fn is_factory_preset(name: &str) -> bool {
    get_factory_preset(name).is_some()
}

/// Resolve a factory preset name or a path to a TOML file.
///
/// Factory names win over files of the same name.
pub fn resolve_preset(name_or_path: &str) -> Result<AnalysisConfig, ConfigError> {
    if let Some(preset) = get_factory_preset(name_or_path) {
        return Ok(preset);
    }
    let path = Path::new(name_or_path);
    if path.is_file() {
        return AnalysisConfig::load(path);
    }
    Err(ConfigError::PresetNotFound(name_or_path.to_string()))
}
