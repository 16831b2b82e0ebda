//! Geometry primitives in an abstract local frame.
//!
//! Coordinates are unscaled and untranslated: the origin is where drawing
//! starts and `y` grows upward. Mapping to screen space is the renderer's job.

pub mod turtle;

use serde::{Deserialize, Serialize};

pub use turtle::{interpret, Cursor, INITIAL_HEADING};

use crate::generator::mandelbrot::EscapeField;

/// A point in the local frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The point `distance` away along `heading` (radians from +x).
    pub fn advance(self, heading: f64, distance: f64) -> Self {
        Self {
            x: self.x + distance * heading.cos(),
            y: self.y + distance * heading.sin(),
        }
    }

    pub fn lerp(self, other: Point, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    pub fn distance(self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// A drawable line from `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
}

impl Segment {
    pub const fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    pub fn length(&self) -> f64 {
        self.from.distance(self.to)
    }

    /// Direction from `from` to `to`, in radians.
    pub fn heading(&self) -> f64 {
        (self.to.y - self.from.y).atan2(self.to.x - self.from.x)
    }
}

/// A filled triangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle(pub [Point; 3]);

/// A filled axis-aligned square, anchored at its lower-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Square {
    pub origin: Point,
    pub side: f64,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    /// Smallest box containing every point, or `None` for an empty input.
    pub fn of(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut b = Bounds {
            min: first,
            max: first,
        };
        for p in iter {
            b.min.x = b.min.x.min(p.x);
            b.min.y = b.min.y.min(p.y);
            b.max.x = b.max.x.max(p.x);
            b.max.y = b.max.y.max(p.y);
        }
        Some(b)
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }
}

/// What a generator produces, by primitive kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "lowercase")]
pub enum Geometry {
    Segments(Vec<Segment>),
    /// Consecutive points joined by lines.
    Polyline(Vec<Point>),
    /// Unconnected points.
    Points(Vec<Point>),
    Triangles(Vec<Triangle>),
    Squares(Vec<Square>),
    Field(EscapeField),
}

impl Geometry {
    /// Number of primitives: segments, vertices, points, shapes, or samples.
    pub fn len(&self) -> usize {
        match self {
            Self::Segments(v) => v.len(),
            Self::Polyline(v) | Self::Points(v) => v.len(),
            Self::Triangles(v) => v.len(),
            Self::Squares(v) => v.len(),
            Self::Field(f) => f.counts().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Line segments for stroke renderers; empty for filled shapes and fields.
    pub fn segments(&self) -> Vec<Segment> {
        match self {
            Self::Segments(v) => v.clone(),
            Self::Polyline(points) => points
                .windows(2)
                .map(|w| Segment::new(w[0], w[1]))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Bounding box of all vertices; `None` for fields and empty output.
    pub fn bounds(&self) -> Option<Bounds> {
        match self {
            Self::Segments(v) => Bounds::of(v.iter().flat_map(|s| [s.from, s.to])),
            Self::Polyline(v) | Self::Points(v) => Bounds::of(v.iter().copied()),
            Self::Triangles(v) => Bounds::of(v.iter().flat_map(|t| t.0)),
            Self::Squares(v) => Bounds::of(v.iter().flat_map(|s| {
                [s.origin, Point::new(s.origin.x + s.side, s.origin.y + s.side)]
            })),
            Self::Field(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn advance_up() {
        let p = Point::ORIGIN.advance(FRAC_PI_2, 2.0);
        assert_approx_eq!(p.x, 0.0);
        assert_approx_eq!(p.y, 2.0);
    }

    #[test]
    fn segment_length_and_heading() {
        let s = Segment::new(Point::new(0.0, 0.0), Point::new(3.0, 4.0));
        assert_approx_eq!(s.length(), 5.0);
        assert_approx_eq!(s.heading(), (4.0f64).atan2(3.0));
    }

    #[test]
    fn bounds_of_points() {
        let b = Bounds::of([Point::new(1.0, -2.0), Point::new(-3.0, 4.0)]).unwrap();
        assert_eq!(b.min, Point::new(-3.0, -2.0));
        assert_eq!(b.max, Point::new(1.0, 4.0));
        assert_approx_eq!(b.width(), 4.0);
        assert_approx_eq!(b.height(), 6.0);
        assert!(Bounds::of(Vec::new()).is_none());
    }

    #[test]
    fn polyline_segments() {
        let g = Geometry::Polyline(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(1.0, 1.0),
        ]);
        let segs = g.segments();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[1].to, Point::new(1.0, 1.0));
        assert_eq!(g.len(), 3);
    }

    #[test]
    fn filled_shapes_have_no_segments() {
        let g = Geometry::Squares(vec![Square {
            origin: Point::ORIGIN,
            side: 2.0,
        }]);
        assert!(g.segments().is_empty());
        let b = g.bounds().unwrap();
        assert_eq!(b.max, Point::new(2.0, 2.0));
    }

    #[test]
    fn geometry_json_is_tagged() {
        let g = Geometry::Points(vec![Point::new(1.0, 2.0)]);
        let json = serde_json::to_value(&g).unwrap();
        assert_eq!(json["kind"], "points");
        assert_eq!(json["data"][0]["y"], 2.0);
    }
}
