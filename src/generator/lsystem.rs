//! Grammar-driven drawing: expand, then walk the turtle.

use rand::Rng;

use crate::geometry::{interpret, Segment};
use crate::grammar::expand_within;
use crate::spec::{LSystemParams, MAX_SYMBOLS};

/// Expand the grammar `depth` times and interpret the result.
///
/// With a `scaleFactor`, the step shrinks by that factor per generation
/// actually applied.
pub fn draw<R: Rng + ?Sized>(params: &LSystemParams, depth: u32, rng: &mut R) -> Vec<Segment> {
    let expanded = expand_within(&params.axiom, &params.rules, depth, MAX_SYMBOLS, rng);
    let step = match params.scale_factor {
        Some(factor) => params.step_length * factor.powi(expanded.generations as i32),
        None => params.step_length,
    };
    interpret(&expanded.symbols, params.angle.to_radians(), step)
}
