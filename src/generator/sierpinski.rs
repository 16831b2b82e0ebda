//! Sierpiński triangle and carpet subdivision.

use crate::geometry::{Point, Square, Triangle};
use crate::spec::{CarpetParams, SierpinskiParams};

/// Filled triangles of the Sierpiński gasket; `3^depth` of them.
///
/// The outer triangle is equilateral with its base on the x-axis from the origin.
pub fn triangle(params: &SierpinskiParams, depth: u32) -> Vec<Triangle> {
    let s = params.side_length;
    let corners = [
        Point::ORIGIN,
        Point::new(s, 0.0),
        Point::new(s / 2.0, s * 3f64.sqrt() / 2.0),
    ];
    let mut out = Vec::with_capacity(3usize.saturating_pow(depth));
    split_triangle(&mut out, corners, depth);
    out
}

fn split_triangle(out: &mut Vec<Triangle>, [a, b, c]: [Point; 3], depth: u32) {
    if depth == 0 {
        out.push(Triangle([a, b, c]));
        return;
    }
    let ab = a.lerp(b, 0.5);
    let bc = b.lerp(c, 0.5);
    let ca = c.lerp(a, 0.5);
    split_triangle(out, [a, ab, ca], depth - 1);
    split_triangle(out, [ab, b, bc], depth - 1);
    split_triangle(out, [ca, bc, c], depth - 1);
}

/// Filled squares of the Sierpiński carpet: `8^depth`, or `9^depth` when the
/// centre cell is kept.
pub fn carpet(params: &CarpetParams, depth: u32) -> Vec<Square> {
    let mut out = Vec::new();
    split_square(
        &mut out,
        Square {
            origin: Point::ORIGIN,
            side: params.side_length,
        },
        depth,
        params.keep_center,
    );
    out
}

fn split_square(out: &mut Vec<Square>, square: Square, depth: u32, keep_center: bool) {
    if depth == 0 {
        out.push(square);
        return;
    }
    let third = square.side / 3.0;
    for row in 0..3 {
        for col in 0..3 {
            if row == 1 && col == 1 && !keep_center {
                continue;
            }
            let cell = Square {
                origin: Point::new(
                    square.origin.x + col as f64 * third,
                    square.origin.y + row as f64 * third,
                ),
                side: third,
            };
            split_square(out, cell, depth - 1, keep_center);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn triangle_depth_zero_is_one_triangle() {
        let tris = triangle(&SierpinskiParams::default(), 0);
        assert_eq!(tris.len(), 1);
        assert_eq!(tris[0].0[0], Point::ORIGIN);
    }

    #[test]
    fn triangle_count_is_three_to_the_depth() {
        for depth in 0..6 {
            assert_eq!(
                triangle(&SierpinskiParams::default(), depth).len(),
                3usize.pow(depth)
            );
        }
    }

    #[test]
    fn sub_triangles_are_half_scale() {
        let params = SierpinskiParams {
            side_length: 2.0,
            color: None,
        };
        let tris = triangle(&params, 1);
        for t in &tris {
            assert_approx_eq!(t.0[0].distance(t.0[1]), 1.0);
        }
    }

    #[test]
    fn carpet_depth_zero_is_one_square() {
        let squares = carpet(&CarpetParams::default(), 0);
        assert_eq!(squares.len(), 1);
        assert_approx_eq!(squares[0].side, 240.0);
    }

    #[test]
    fn carpet_count_is_eight_to_the_depth() {
        for depth in 0..4 {
            assert_eq!(carpet(&CarpetParams::default(), depth).len(), 8usize.pow(depth));
        }
    }

    #[test]
    fn carpet_skips_centre_cell() {
        let params = CarpetParams {
            side_length: 3.0,
            ..CarpetParams::default()
        };
        let squares = carpet(&params, 1);
        assert!(!squares.iter().any(|s| s.origin == Point::new(1.0, 1.0)));
    }

    #[test]
    fn carpet_keep_centre_fills_grid() {
        let params = CarpetParams {
            keep_center: true,
            ..CarpetParams::default()
        };
        assert_eq!(carpet(&params, 2).len(), 81);
    }
}
