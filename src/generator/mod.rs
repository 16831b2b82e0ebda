//! Geometry generators, one per fractal family.
//!
//! Every generator is a pure function of its parameters and depth; the
//! stochastic ones (Barnsley, weighted grammars) draw only from the injected
//! random source.

pub mod barnsley;
pub mod dragon;
pub mod koch;
pub mod lsystem;
pub mod mandelbrot;
pub mod sierpinski;
pub mod tree;

use std::sync::atomic::AtomicBool;

use log::debug;
use rand::Rng;

use crate::geometry::Geometry;
use crate::spec::{FractalSpec, RuleParams};

/// Produce the geometry described by `spec`.
pub fn generate<R: Rng + ?Sized>(spec: &FractalSpec, rng: &mut R) -> Geometry {
    let never = AtomicBool::new(false);
    generate_with_cancel(spec, rng, &never).unwrap_or(Geometry::Segments(Vec::new()))
}

/// Like [`generate`], but a Mandelbrot field stops early and yields `None`
/// once `cancel` is set. Other generators ignore the flag.
pub fn generate_with_cancel<R: Rng + ?Sized>(
    spec: &FractalSpec,
    rng: &mut R,
    cancel: &AtomicBool,
) -> Option<Geometry> {
    let depth = spec.depth();
    let geometry = match spec.params() {
        RuleParams::LSystem(p) => Geometry::Segments(lsystem::draw(p, depth, rng)),
        RuleParams::Tree(p) => Geometry::Segments(tree::tree(p, depth)),
        RuleParams::Koch(p) => Geometry::Segments(koch::koch(p, depth)),
        RuleParams::Dragon(p) => Geometry::Polyline(dragon::dragon(p, depth)),
        RuleParams::Sierpinski(p) => Geometry::Triangles(sierpinski::triangle(p, depth)),
        RuleParams::Carpet(p) => Geometry::Squares(sierpinski::carpet(p, depth)),
        RuleParams::Barnsley(p) => Geometry::Points(barnsley::fern(p, rng)),
        RuleParams::Mandelbrot(p) => Geometry::Field(mandelbrot::field_with_cancel(p, cancel)?),
    };
    debug!(
        "generated {} primitives for {} at depth {depth}",
        geometry.len(),
        spec.kind()
    );
    Some(geometry)
}
