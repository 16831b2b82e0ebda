//! Barnsley fern by random iteration of four affine maps.

use rand::Rng;

use crate::geometry::Point;
use crate::spec::BarnsleyParams;

/// `x' = a·x + b·y + e`, `y' = c·x + d·y + f`, chosen with probability `p`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
    pub p: f64,
}

impl Affine {
    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.b * p.y + self.e,
            self.c * p.x + self.d * p.y + self.f,
        )
    }
}

/// Index of the stem map in [`TRANSFORMS`].
pub const STEM: usize = 0;

/// Stem, successive leaflets, left leaflet, right leaflet.
#[rustfmt::skip]
pub const TRANSFORMS: [Affine; 4] = [
    Affine { a: 0.0, b: 0.0, c: 0.0, d: 0.16, e: 0.0, f: 0.0, p: 0.01 },
    Affine { a: 0.85, b: 0.04, c: -0.04, d: 0.85, e: 0.0, f: 1.6, p: 0.85 },
    Affine { a: 0.2, b: -0.26, c: 0.23, d: 0.22, e: 0.0, f: 1.6, p: 0.07 },
    Affine { a: -0.15, b: 0.28, c: 0.26, d: 0.24, e: 0.0, f: 0.44, p: 0.07 },
];

/// Map selected by a uniform draw in `[0, 1)`.
pub fn select(draw: f64) -> usize {
    let mut cumulative = 0.0;
    for (i, t) in TRANSFORMS.iter().enumerate() {
        cumulative += t.p;
        if draw < cumulative {
            return i;
        }
    }
    TRANSFORMS.len() - 1
}

/// One iteration: which map ran and where it landed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FernStep {
    pub transform: usize,
    pub point: Point,
}

/// Endless chaos-game walk from the origin.
pub struct FernWalk<'r, R: Rng + ?Sized> {
    rng: &'r mut R,
    current: Point,
}

impl<'r, R: Rng + ?Sized> FernWalk<'r, R> {
    pub fn new(rng: &'r mut R) -> Self {
        Self {
            rng,
            current: Point::ORIGIN,
        }
    }
}

impl<R: Rng + ?Sized> Iterator for FernWalk<'_, R> {
    type Item = FernStep;

    fn next(&mut self) -> Option<FernStep> {
        let transform = select(self.rng.gen::<f64>());
        self.current = TRANSFORMS[transform].apply(self.current);
        Some(FernStep {
            transform,
            point: self.current,
        })
    }
}

/// `params.points` points of the attractor.
pub fn fern<R: Rng + ?Sized>(params: &BarnsleyParams, rng: &mut R) -> Vec<Point> {
    FernWalk::new(rng)
        .take(params.points as usize)
        .map(|step| step.point)
        .collect()
}
