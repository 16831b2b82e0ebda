//! Fractune: fractal geometry and the melodies derived from it.
//!
//! A [`spec::FractalSpec`] describes one fractal. [`generator::generate`]
//! turns it into [`geometry::Geometry`] and [`melody::map_to_indices`] into a
//! scale-degree sequence; [`context::GenerationContext`] holds the three voice
//! specs of a session and [`preset`] saves them.

pub mod config;
pub mod context;
pub mod generator;
pub mod geometry;
pub mod grammar;
pub mod melody;
pub mod preset;
pub mod spec;
