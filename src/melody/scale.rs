//! Ordered pitch lists that scale-degree indices are looked up in.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::pitch::parse_note_name;

/// A scale pitch: its name as given and its MIDI number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pitch {
    pub name: String,
    pub midi: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleError {
    Empty,
    UnknownPitch(String),
}

impl fmt::Display for ScaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "scale has no pitches"),
            Self::UnknownPitch(name) => write!(f, "unknown pitch name '{name}'"),
        }
    }
}

impl std::error::Error for ScaleError {}

/// A non-empty ordered list of pitches. Serialized as its pitch names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Scale {
    pitches: Vec<Pitch>,
}

impl Scale {
    pub fn parse<S: AsRef<str>>(names: &[S]) -> Result<Self, ScaleError> {
        if names.is_empty() {
            return Err(ScaleError::Empty);
        }
        let pitches = names
            .iter()
            .map(|n| {
                let name = n.as_ref();
                parse_note_name(name)
                    .map(|midi| Pitch {
                        name: name.to_string(),
                        midi,
                    })
                    .ok_or_else(|| ScaleError::UnknownPitch(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { pitches })
    }

    /// C major, C4 to C5.
    pub fn major() -> Self {
        Self::from_static(&["C4", "D4", "E4", "F4", "G4", "A4", "B4", "C5"])
    }

    /// A natural minor, A3 to A4.
    pub fn minor() -> Self {
        Self::from_static(&["A3", "B3", "C4", "D4", "E4", "F4", "G4", "A4"])
    }

    pub fn pentatonic() -> Self {
        Self::from_static(&["C4", "D4", "E4", "G4", "A4"])
    }

    /// C major two octaves down, C2 to C3.
    pub fn bass() -> Self {
        Self::from_static(&["C2", "D2", "E2", "F2", "G2", "A2", "B2", "C3"])
    }

    /// Kick, snare, hi-hat.
    pub fn drum_kit() -> Self {
        Self::from_static(&["C2", "C3", "A2"])
    }

    /// Named preset: `major`, `minor`, `pentatonic`, `bass` or `drums`.
    pub fn named(name: &str) -> Option<Self> {
        match name {
            "major" => Some(Self::major()),
            "minor" => Some(Self::minor()),
            "pentatonic" => Some(Self::pentatonic()),
            "bass" => Some(Self::bass()),
            "drums" => Some(Self::drum_kit()),
            _ => None,
        }
    }

    fn from_static(names: &[&str]) -> Self {
        let pitches = names
            .iter()
            .filter_map(|name| {
                parse_note_name(name).map(|midi| Pitch {
                    name: (*name).to_string(),
                    midi,
                })
            })
            .collect();
        Self { pitches }
    }

    pub fn len(&self) -> usize {
        self.pitches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pitches.is_empty()
    }

    /// Pitch for a scale-degree index, wrapping around the scale.
    pub fn at(&self, index: usize) -> Option<&Pitch> {
        if self.pitches.is_empty() {
            return None;
        }
        self.pitches.get(index % self.pitches.len())
    }

    pub fn pitches(&self) -> &[Pitch] {
        &self.pitches
    }
}

impl TryFrom<Vec<String>> for Scale {
    type Error = ScaleError;

    fn try_from(names: Vec<String>) -> Result<Self, Self::Error> {
        Self::parse(&names)
    }
}

impl From<Scale> for Vec<String> {
    fn from(scale: Scale) -> Self {
        scale.pitches.into_iter().map(|p| p.name).collect()
    }
}
