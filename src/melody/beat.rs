//! Musical time in integer ticks.
//!
//! 960 PPQN keeps half-, quarter- and third-beat steps exact; conversion to
//! seconds happens only when a caller asks for it.

use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// Ticks per quarter note (beat).
pub const TICKS_PER_BEAT: u64 = 960;

/// A position or length on the timeline.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Beat {
    ticks: u64,
}

impl Beat {
    pub const ZERO: Beat = Beat { ticks: 0 };

    pub const fn from_ticks(ticks: u64) -> Self {
        Self { ticks }
    }

    pub const fn from_beats(beats: u64) -> Self {
        Self {
            ticks: beats * TICKS_PER_BEAT,
        }
    }

    /// Fractional beats, rounded to the nearest tick. Negative input is zero.
    pub fn from_beats_f64(beats: f64) -> Self {
        Self {
            ticks: (beats * TICKS_PER_BEAT as f64).round().max(0.0) as u64,
        }
    }

    pub fn ticks(self) -> u64 {
        self.ticks
    }

    pub fn as_beats_f64(self) -> f64 {
        self.ticks as f64 / TICKS_PER_BEAT as f64
    }

    /// Wall-clock seconds at `bpm` quarter notes per minute.
    pub fn to_seconds(self, bpm: f64) -> f64 {
        self.as_beats_f64() * 60.0 / bpm
    }
}

impl Add for Beat {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            ticks: self.ticks.saturating_add(rhs.ticks),
        }
    }
}

impl Mul<u64> for Beat {
    type Output = Self;

    fn mul(self, rhs: u64) -> Self {
        Self {
            ticks: self.ticks.saturating_mul(rhs),
        }
    }
}
