//! Presets: the saved `{type, depth, rules}` of all three voices.
//!
//! A preset stores only specs, never generated output, so loading one and
//! regenerating reproduces the same geometry and melody (for the
//! stochastic types, given the same seed).

pub mod persistence;

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::melody::{self, Beat, Note, Voice, VoiceSet};
use crate::spec::FractalSpec;

#[derive(Debug)]
pub enum PresetError {
    Io(std::io::Error),
    Json(serde_json::Error),
    NotFound(u64),
}

impl fmt::Display for PresetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "preset i/o error: {e}"),
            Self::Json(e) => write!(f, "malformed preset: {e}"),
            Self::NotFound(id) => write!(f, "no preset with id {id}"),
        }
    }
}

impl std::error::Error for PresetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::NotFound(_) => None,
        }
    }
}

impl From<std::io::Error> for PresetError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for PresetError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// A snapshot of the three voice specs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: u64,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub melody: FractalSpec,
    pub bass: FractalSpec,
    pub drums: FractalSpec,
}

impl Preset {
    /// A preset stamped with the current time; its id is the timestamp.
    pub fn new(melody: FractalSpec, bass: FractalSpec, drums: FractalSpec) -> Self {
        Self::at(now_millis(), melody, bass, drums)
    }

    pub fn at(timestamp: u64, melody: FractalSpec, bass: FractalSpec, drums: FractalSpec) -> Self {
        Self {
            id: timestamp,
            timestamp,
            melody,
            bass,
            drums,
        }
    }

    pub fn voice(&self, voice: Voice) -> &FractalSpec {
        match voice {
            Voice::Melody => &self.melody,
            Voice::Bass => &self.bass,
            Voice::Drums => &self.drums,
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, PresetError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, PresetError> {
        Ok(serde_json::from_str(json)?)
    }
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// A preset rendered to notes, one sequence per voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Composition {
    pub title: String,
    pub melody: Vec<Note>,
    pub bass: Vec<Note>,
    pub drums: Vec<Note>,
}

impl Composition {
    pub fn render<R: Rng + ?Sized>(
        title: impl Into<String>,
        preset: &Preset,
        voices: &VoiceSet,
        rng: &mut R,
    ) -> Self {
        let mut render = |voice: Voice| melody::notes(preset.voice(voice), voices.get(voice), rng);
        Self {
            title: title.into(),
            melody: render(Voice::Melody),
            bass: render(Voice::Bass),
            drums: render(Voice::Drums),
        }
    }

    pub fn voice(&self, voice: Voice) -> &[Note] {
        match voice {
            Voice::Melody => &self.melody,
            Voice::Bass => &self.bass,
            Voice::Drums => &self.drums,
        }
    }

    /// When the last note of any voice stops sounding.
    pub fn end(&self) -> Beat {
        Voice::ALL
            .iter()
            .flat_map(|&v| self.voice(v).iter().map(Note::end))
            .max()
            .unwrap_or(Beat::ZERO)
    }
}

/// Saved presets, newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresetHistory {
    presets: Vec<Preset>,
}

impl PresetHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend `preset`, bumping its id past any it would collide with.
    /// Returns the id it was stored under.
    pub fn push(&mut self, mut preset: Preset) -> u64 {
        while self.find(preset.id).is_some() {
            preset.id += 1;
        }
        let id = preset.id;
        self.presets.insert(0, preset);
        id
    }

    pub fn find(&self, id: u64) -> Option<&Preset> {
        self.presets.iter().find(|p| p.id == id)
    }

    /// Pretty JSON of a single preset, for download or sharing.
    pub fn export(&self, id: u64) -> Result<String, PresetError> {
        self.find(id)
            .ok_or(PresetError::NotFound(id))?
            .to_json_pretty()
    }

    pub fn latest(&self) -> Option<&Preset> {
        self.presets.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}
