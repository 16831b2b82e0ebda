//! Voices, their timing, and the notes they produce.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::beat::Beat;
use super::scale::Scale;

/// One of the three layers of a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    Melody,
    Bass,
    Drums,
}

impl Voice {
    pub const ALL: [Voice; 3] = [Self::Melody, Self::Bass, Self::Drums];

    pub fn name(self) -> &'static str {
        match self {
            Self::Melody => "melody",
            Self::Bass => "bass",
            Self::Drums => "drums",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Voice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|v| v.name() == s)
            .ok_or_else(|| format!("unknown voice '{s}' (expected melody, bass or drums)"))
    }
}

/// Symbolic note length, in sequencer notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteValue {
    #[serde(rename = "16n")]
    Sixteenth,
    #[serde(rename = "8n")]
    Eighth,
    #[serde(rename = "4n")]
    Quarter,
}

impl NoteValue {
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Sixteenth => "16n",
            Self::Eighth => "8n",
            Self::Quarter => "4n",
        }
    }

    pub fn length(self) -> Beat {
        match self {
            Self::Sixteenth => Beat::from_beats_f64(0.25),
            Self::Eighth => Beat::from_beats_f64(0.5),
            Self::Quarter => Beat::from_beats(1),
        }
    }
}

/// How a voice turns indices into notes.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceConfig {
    pub scale: Scale,
    /// Distance between consecutive note starts.
    pub step: Beat,
    pub duration: NoteValue,
    /// `0.0..=1.0`.
    pub velocity: f64,
}

impl VoiceConfig {
    pub fn default_for(voice: Voice) -> Self {
        match voice {
            Voice::Melody => Self {
                scale: Scale::major(),
                step: Beat::from_beats(1),
                duration: NoteValue::Eighth,
                velocity: 1.0,
            },
            Voice::Bass => Self {
                scale: Scale::bass(),
                step: Beat::from_beats(2),
                duration: NoteValue::Quarter,
                velocity: 1.0,
            },
            Voice::Drums => Self {
                scale: Scale::drum_kit(),
                step: Beat::from_beats_f64(0.5),
                duration: NoteValue::Eighth,
                velocity: 0.5,
            },
        }
    }

    pub fn with_scale(mut self, scale: Scale) -> Self {
        self.scale = scale;
        self
    }
}

/// Configuration for all three voices.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSet {
    pub melody: VoiceConfig,
    pub bass: VoiceConfig,
    pub drums: VoiceConfig,
}

impl VoiceSet {
    pub fn get(&self, voice: Voice) -> &VoiceConfig {
        match voice {
            Voice::Melody => &self.melody,
            Voice::Bass => &self.bass,
            Voice::Drums => &self.drums,
        }
    }
}

impl Default for VoiceSet {
    fn default() -> Self {
        Self {
            melody: VoiceConfig::default_for(Voice::Melody),
            bass: VoiceConfig::default_for(Voice::Bass),
            drums: VoiceConfig::default_for(Voice::Drums),
        }
    }
}

/// One scheduled note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: String,
    pub midi: u8,
    pub duration: NoteValue,
    /// Offset from the start of the sequence.
    pub start: Beat,
    pub velocity: f64,
}

impl Note {
    pub fn end(&self) -> Beat {
        self.start + self.duration.length()
    }
}
