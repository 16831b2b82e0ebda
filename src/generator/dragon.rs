//! Dragon curve by repeated midpoint folding.

use crate::geometry::Point;
use crate::spec::DragonParams;

/// Fold a horizontal segment of `length` `depth` times; `2^depth + 1` vertices.
pub fn dragon(params: &DragonParams, depth: u32) -> Vec<Point> {
    fold(
        &[Point::ORIGIN, Point::new(params.length, 0.0)],
        depth,
        params.scale_factor,
        params.alternate,
    )
}

/// Insert a displaced midpoint into every edge of `polyline`, `depth` times.
///
/// For an edge `a → b` the new vertex is `mid(a, b) + perp(b - a) * scale`,
/// where `perp` turns a vector a quarter-turn counter-clockwise. With
/// `alternate`, every second edge folds the other way, which with a scale of
/// one half gives the Heighway dragon.
pub fn fold(polyline: &[Point], depth: u32, scale: f64, alternate: bool) -> Vec<Point> {
    let mut current = polyline.to_vec();
    for _ in 0..depth {
        let Some(&first) = current.first() else {
            break;
        };
        let mut next = Vec::with_capacity(current.len() * 2);
        next.push(first);
        for (i, edge) in current.windows(2).enumerate() {
            let (a, b) = (edge[0], edge[1]);
            let sign = if alternate && i % 2 == 1 { -1.0 } else { 1.0 };
            let mid = a.lerp(b, 0.5);
            let (dx, dy) = (b.x - a.x, b.y - a.y);
            next.push(Point::new(
                mid.x - sign * dy * scale,
                mid.y + sign * dx * scale,
            ));
            next.push(b);
        }
        current = next;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn depth_zero_is_the_seed_segment() {
        let points = dragon(&DragonParams::default(), 0);
        assert_eq!(points, vec![Point::ORIGIN, Point::new(100.0, 0.0)]);
    }

    #[test]
    fn one_fold_of_unit_segment() {
        let points = fold(&[Point::ORIGIN, Point::new(1.0, 0.0)], 1, 0.5, false);
        assert_eq!(points.len(), 3);
        assert_approx_eq!(points[1].x, 0.5);
        assert_approx_eq!(points[1].y, 0.5);
        assert_eq!(points[2], Point::new(1.0, 0.0));
    }

    #[test]
    fn vertex_count_doubles() {
        for depth in 0..8 {
            let points = dragon(&DragonParams::default(), depth);
            assert_eq!(points.len(), (1 << depth) + 1);
        }
    }

    #[test]
    fn endpoints_never_move() {
        let points = dragon(&DragonParams::default(), 6);
        assert_eq!(points[0], Point::ORIGIN);
        assert_eq!(*points.last().unwrap(), Point::new(100.0, 0.0));
    }

    #[test]
    fn alternate_flips_every_second_fold() {
        let seed = [Point::ORIGIN, Point::new(1.0, 0.0), Point::new(2.0, 0.0)];
        let same = fold(&seed, 1, 0.5, false);
        let alt = fold(&seed, 1, 0.5, true);
        assert_approx_eq!(same[3].y, 0.5);
        assert_approx_eq!(alt[1].y, 0.5);
        assert_approx_eq!(alt[3].y, -0.5);
    }

    #[test]
    fn alternating_half_scale_keeps_edges_equal() {
        let points = fold(&[Point::ORIGIN, Point::new(1.0, 0.0)], 4, 0.5, true);
        let first = points[0].distance(points[1]);
        for w in points.windows(2) {
            assert_approx_eq!(w[0].distance(w[1]), first);
        }
    }

    #[test]
    fn empty_polyline_stays_empty() {
        assert!(fold(&[], 3, 0.5, false).is_empty());
    }
}
