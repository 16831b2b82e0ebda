//! Koch curve and snowflake by recursive subdivision.
//!
//! With four segments each edge becomes `a → x1 → peak → x2 → b`, where `x1`
//! and `x2` sit at `scaleFactor` and `1 - scaleFactor` along the edge and the
//! peak is raised by `angle` from `x1`. The defaults (60°, 1/3) give the
//! classic curve.
//!
//! Any other segment count uses a symmetric fan: sub-segment `i` is turned by
//! `angle * (i - (segments - 1) / 2)` and all share a length chosen so the fan
//! ends on `b`. When the turns cancel the chord the pieces take
//! `scaleFactor` of it instead, and the last one is pulled onto `b`.

use crate::geometry::{Point, Segment};
use crate::spec::KochParams;

/// Minimum chord projection before the fan falls back to `scaleFactor` lengths.
const FAN_EPSILON: f64 = 1e-9;

/// Generate the curve. Snowflakes have `3 * segments^depth` segments, a
/// single line `segments^depth`.
pub fn koch(params: &KochParams, depth: u32) -> Vec<Segment> {
    let side = params.side_length;
    let mut out = Vec::new();
    if params.snowflake {
        // Clockwise triangle centred on the origin so bumps point outward.
        let h = side * 3f64.sqrt() / 2.0;
        let top = Point::new(0.0, 2.0 * h / 3.0);
        let right = Point::new(side / 2.0, -h / 3.0);
        let left = Point::new(-side / 2.0, -h / 3.0);
        for (a, b) in [(top, right), (right, left), (left, top)] {
            subdivide(&mut out, params, a, b, depth);
        }
    } else {
        subdivide(&mut out, params, Point::ORIGIN, Point::new(side, 0.0), depth);
    }
    out
}

fn subdivide(out: &mut Vec<Segment>, params: &KochParams, a: Point, b: Point, depth: u32) {
    if depth == 0 {
        out.push(Segment::new(a, b));
        return;
    }
    let points = if params.segments == 4 {
        bump(params, a, b)
    } else {
        fan(params, a, b)
    };
    for w in points.windows(2) {
        subdivide(out, params, w[0], w[1], depth - 1);
    }
}

fn bump(params: &KochParams, a: Point, b: Point) -> Vec<Point> {
    let s = params.scale_factor;
    let x1 = a.lerp(b, s);
    let x2 = a.lerp(b, 1.0 - s);
    let heading = Segment::new(a, b).heading();
    let peak = x1.advance(heading + params.angle.to_radians(), a.distance(b) * s);
    vec![a, x1, peak, x2, b]
}

fn fan(params: &KochParams, a: Point, b: Point) -> Vec<Point> {
    let n = params.segments;
    let heading = Segment::new(a, b).heading();
    let turn = params.angle.to_radians();
    let centre = (n as f64 - 1.0) / 2.0;
    let offsets: Vec<f64> = (0..n).map(|i| turn * (i as f64 - centre)).collect();

    let projection: f64 = offsets.iter().map(|o| o.cos()).sum();
    let chord = a.distance(b);
    let closes = projection > FAN_EPSILON;
    let step = if closes {
        chord / projection
    } else {
        chord * params.scale_factor
    };

    let mut points = Vec::with_capacity(n as usize + 1);
    let mut current = a;
    points.push(current);
    for offset in offsets {
        current = current.advance(heading + offset, step);
        points.push(current);
    }
    // Snap to `b` so neighbouring edges share endpoints, both after rounding
    // and when the turns cancel the chord.
    if let Some(last) = points.last_mut() {
        *last = b;
    }
    points
}
