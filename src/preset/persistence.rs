//! Preset persistence: JSON load/save for the history and single presets.

use std::path::{Path, PathBuf};

use log::info;

use super::{Preset, PresetError, PresetHistory};

/// Default path for the preset history.
pub fn default_history_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".fractune");
    path.push("presets.json");
    path
}

/// Load the history. A missing file is an empty history.
pub fn load_history(path: &Path) -> Result<PresetHistory, PresetError> {
    if !path.exists() {
        return Ok(PresetHistory::new());
    }
    let content = std::fs::read_to_string(path)?;
    let history: PresetHistory = serde_json::from_str(&content)?;
    info!("loaded {} presets from {}", history.len(), path.display());
    Ok(history)
}

/// Save the history, creating parent directories as needed.
pub fn save_history(path: &Path, history: &PresetHistory) -> Result<(), PresetError> {
    write_json(path, &serde_json::to_string_pretty(history)?)?;
    info!("saved {} presets to {}", history.len(), path.display());
    Ok(())
}

/// Load one exported preset.
pub fn load_preset(path: &Path) -> Result<Preset, PresetError> {
    let content = std::fs::read_to_string(path)?;
    let preset = Preset::from_json(&content)?;
    info!("loaded preset {} from {}", preset.id, path.display());
    Ok(preset)
}

/// Write one preset as pretty JSON.
pub fn export_preset(path: &Path, preset: &Preset) -> Result<(), PresetError> {
    write_json(path, &preset.to_json_pretty()?)?;
    info!("exported preset {} to {}", preset.id, path.display());
    Ok(())
}

fn write_json(path: &Path, json: &str) -> Result<(), PresetError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, json)?;
    Ok(())
}
