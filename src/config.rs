//! Engine configuration, loaded from an optional `~/.fractune/config.yaml`.

use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::melody::{Scale, Voice, VoiceConfig, VoiceSet};
use crate::spec::MAX_DEPTH;

/// Pitch lists per voice; any left out keep the built-in scale.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct ScaleConfig {
    #[serde(default)]
    pub melody: Option<Scale>,
    #[serde(default)]
    pub bass: Option<Scale>,
    #[serde(default)]
    pub drums: Option<Scale>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Fixed seed for every random draw; entropy when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Session depth cap, never above the hard cap.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,
    #[serde(default = "default_bpm")]
    pub bpm: f64,
    #[serde(default)]
    pub scales: ScaleConfig,
    /// Overrides the preset history location.
    #[serde(default)]
    pub preset_path: Option<PathBuf>,
}

fn default_max_depth() -> u32 {
    MAX_DEPTH
}

fn default_bpm() -> f64 {
    120.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: None,
            max_depth: default_max_depth(),
            bpm: default_bpm(),
            scales: ScaleConfig::default(),
            preset_path: None,
        }
    }
}

impl EngineConfig {
    /// `max_depth` limited to the hard cap.
    pub fn depth_cap(&self) -> u32 {
        self.max_depth.min(MAX_DEPTH)
    }

    /// Voice settings with any configured scales applied.
    pub fn voices(&self) -> VoiceSet {
        let voice = |v: Voice, scale: &Option<Scale>| {
            let base = VoiceConfig::default_for(v);
            match scale {
                Some(s) => base.with_scale(s.clone()),
                None => base,
            }
        };
        VoiceSet {
            melody: voice(Voice::Melody, &self.scales.melody),
            bass: voice(Voice::Bass, &self.scales.bass),
            drums: voice(Voice::Drums, &self.scales.drums),
        }
    }

    /// Where presets are kept.
    pub fn preset_path(&self) -> PathBuf {
        self.preset_path
            .clone()
            .unwrap_or_else(crate::preset::persistence::default_history_path)
    }
}

/// Get the config file path.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".fractune").join("config.yaml"))
}

/// Read a config file. A missing file is `Ok(None)`.
pub fn read_config(path: &Path) -> Result<Option<EngineConfig>, io::Error> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    serde_yaml::from_str(&content)
        .map(Some)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

/// Load `~/.fractune/config.yaml`, falling back to defaults when it is
/// missing or malformed.
pub fn load_config() -> EngineConfig {
    let Some(path) = config_path() else {
        return EngineConfig::default();
    };
    match read_config(&path) {
        Ok(config) => config.unwrap_or_default(),
        Err(e) => {
            warn!("ignoring {}: {e}", path.display());
            EngineConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.seed, None);
        assert_eq!(config.max_depth, MAX_DEPTH);
        assert_eq!(config.bpm, 120.0);
        assert_eq!(config.voices(), VoiceSet::default());
    }

    #[test]
    fn parse_yaml_config() {
        let yaml = r#"
seed: 42
max_depth: 6
bpm: 90
scales:
  melody: [A3, B3, C4, D4, E4, F4, G4, A4]
preset_path: /tmp/presets.json
"#;
        let config: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.depth_cap(), 6);
        assert_eq!(config.bpm, 90.0);
        assert_eq!(config.voices().melody.scale, Scale::minor());
        assert_eq!(config.voices().bass.scale, Scale::bass());
        assert_eq!(config.preset_path(), PathBuf::from("/tmp/presets.json"));
    }

    #[test]
    fn partial_yaml_config() {
        let config: EngineConfig = serde_yaml::from_str("seed: 7\n").unwrap();
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.max_depth, MAX_DEPTH);
        assert_eq!(config.bpm, 120.0);
    }

    #[test]
    fn depth_cap_never_exceeds_hard_cap() {
        let config: EngineConfig = serde_yaml::from_str("max_depth: 40\n").unwrap();
        assert_eq!(config.depth_cap(), MAX_DEPTH);
    }

    #[test]
    fn bad_scale_is_rejected() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "scales:\n  drums: [Q9]\n").unwrap();
        let err = read_config(file.path()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_config(&dir.path().join("config.yaml")).unwrap().is_none());
    }

    #[test]
    fn load_config_never_panics() {
        let _ = load_config();
    }
}
