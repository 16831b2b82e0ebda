//! Pattern-to-melody mapping.
//!
//! Each fractal family has a deterministic rule that turns its structure
//! (depth, branch count, iteration cap, ...) into a sequence of scale-degree
//! indices in `0..7`. Indices become pitches by looking them up in a voice's
//! [`Scale`], wrapping around its length.

pub mod beat;
pub mod pitch;
pub mod scale;
pub mod voice;

use std::f64::consts::PI;

use log::debug;
use rand::Rng;

use crate::generator::barnsley::FernWalk;
use crate::grammar::expand_within;
use crate::spec::{
    BarnsleyParams, FractalSpec, KochContour, KochParams, LSystemParams, MandelbrotParams,
    RuleParams, TreeParams, MAX_SYMBOLS,
};

pub use beat::{Beat, TICKS_PER_BEAT};
pub use pitch::{note_name, parse_note_name};
pub use scale::{Pitch, Scale, ScaleError};
pub use voice::{Note, NoteValue, Voice, VoiceConfig, VoiceSet};

/// Modulus of every index sequence.
pub const DEGREES: u8 = 7;

/// Fern steps between consecutive melody samples.
pub const FERN_SAMPLE_INTERVAL: usize = 1000;

/// Scale-degree indices for `spec`.
///
/// Only Barnsley params and weighted grammars consume randomness.
pub fn map_to_indices<R: Rng + ?Sized>(spec: &FractalSpec, rng: &mut R) -> Vec<u8> {
    let depth = spec.depth();
    let indices = match spec.params() {
        RuleParams::Tree(p) => tree(p, depth),
        RuleParams::Koch(p) => koch(p, depth),
        RuleParams::Mandelbrot(p) => mandelbrot(p),
        RuleParams::Dragon(_) => dragon(depth),
        RuleParams::Barnsley(p) => barnsley(p, rng),
        RuleParams::Sierpinski(_) => sierpinski(depth),
        RuleParams::Carpet(_) => carpet(depth),
        RuleParams::LSystem(p) => lsystem(p, depth, rng),
    };
    debug!(
        "mapped {} at depth {depth} to {} indices",
        spec.kind(),
        indices.len()
    );
    indices
}

/// Schedule `indices` on a voice: one note per index, `step` apart.
pub fn to_notes(indices: &[u8], voice: &VoiceConfig) -> Vec<Note> {
    indices
        .iter()
        .enumerate()
        .filter_map(|(i, &index)| {
            let pitch = voice.scale.at(index as usize)?;
            Some(Note {
                pitch: pitch.name.clone(),
                midi: pitch.midi,
                duration: voice.duration,
                start: voice.step * i as u64,
                velocity: voice.velocity,
            })
        })
        .collect()
}

/// [`map_to_indices`] followed by [`to_notes`].
pub fn notes<R: Rng + ?Sized>(spec: &FractalSpec, voice: &VoiceConfig, rng: &mut R) -> Vec<Note> {
    to_notes(&map_to_indices(spec, rng), voice)
}

fn degree(i: u64) -> u8 {
    (i % DEGREES as u64) as u8
}

fn tree(params: &TreeParams, depth: u32) -> Vec<u8> {
    let complexity = depth as u64 * 2;
    (0..complexity * params.branches as u64).map(degree).collect()
}

fn koch(params: &KochParams, depth: u32) -> Vec<u8> {
    let per_side = (params.segments as u64).saturating_pow(depth);
    let count = if params.snowflake {
        per_side.saturating_mul(3)
    } else {
        per_side
    };
    (0..count)
        .map(|i| match params.contour {
            KochContour::Sawtooth => {
                let v = (i % 14) as u8;
                if v < DEGREES {
                    v
                } else {
                    13 - v
                }
            }
            KochContour::Sine => {
                let v = ((i as f64).sin().abs() * DEGREES as f64).floor() as u64;
                degree(v)
            }
        })
        .collect()
}

fn mandelbrot(params: &MandelbrotParams) -> Vec<u8> {
    let max = params.max_iterations as f64;
    (0..params.max_iterations)
        .map(|i| (i as f64 / max * DEGREES as f64).floor() as u8)
        .collect()
}

fn dragon(depth: u32) -> Vec<u8> {
    let count = 1u64 << depth;
    (0..count)
        .map(|i| {
            let angle = (i as f64 * PI / count as f64).sin() * DEGREES as f64;
            ((angle + DEGREES as f64) % DEGREES as f64).floor() as u8
        })
        .collect()
}

/// One index per thousand fern steps, from the squared distance of the
/// sampled point: `floor(10 * (x² + y²)) mod 7`.
fn barnsley<R: Rng + ?Sized>(params: &BarnsleyParams, rng: &mut R) -> Vec<u8> {
    FernWalk::new(rng)
        .take(params.points as usize)
        .step_by(FERN_SAMPLE_INTERVAL)
        .map(|step| {
            let r2 = step.point.x * step.point.x + step.point.y * step.point.y;
            degree((r2 * 10.0).floor() as u64)
        })
        .collect()
}

fn sierpinski(depth: u32) -> Vec<u8> {
    let count = 1u64 << depth;
    (0..count)
        .map(|i| if i & (i + 1) == 0 { 0 } else { degree(i) })
        .collect()
}

fn carpet(depth: u32) -> Vec<u8> {
    (0..depth as u64 * 4).map(degree).collect()
}

/// Net turn count at every forward step of the expanded grammar.
fn lsystem<R: Rng + ?Sized>(params: &LSystemParams, depth: u32, rng: &mut R) -> Vec<u8> {
    let expanded = expand_within(&params.axiom, &params.rules, depth, MAX_SYMBOLS, rng);
    let mut turns: i64 = 0;
    let mut out = Vec::new();
    for symbol in expanded.symbols.chars() {
        match symbol {
            '+' => turns += 1,
            '-' => turns -= 1,
            'F' => out.push(turns.rem_euclid(DEGREES as i64) as u8),
            _ => {}
        }
    }
    out
}
