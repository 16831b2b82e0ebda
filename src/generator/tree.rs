//! Recursive branching tree.

use crate::geometry::{Point, Segment, INITIAL_HEADING};
use crate::spec::TreeParams;

/// Trunk from the origin pointing up, then `branches` children per tip, each
/// rotated by `angle * (i - (branches - 1) / 2)` and scaled by `lengthFactor`.
///
/// Depth 0 draws nothing; depth `d` draws `sum(branches^k, k < d)` segments.
pub fn tree(params: &TreeParams, depth: u32) -> Vec<Segment> {
    let mut out = Vec::new();
    let spread = params.angle.to_radians();
    branch(
        &mut out,
        params,
        spread,
        Point::ORIGIN,
        INITIAL_HEADING,
        params.init_length,
        depth,
    );
    out
}

fn branch(
    out: &mut Vec<Segment>,
    params: &TreeParams,
    spread: f64,
    base: Point,
    heading: f64,
    length: f64,
    depth: u32,
) {
    if depth == 0 {
        return;
    }
    let tip = base.advance(heading, length);
    out.push(Segment::new(base, tip));

    let centre = (params.branches as f64 - 1.0) / 2.0;
    for i in 0..params.branches {
        let offset = spread * (i as f64 - centre);
        branch(
            out,
            params,
            spread,
            tip,
            heading + offset,
            length * params.length_factor,
            depth - 1,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn depth_zero_is_empty() {
        assert!(tree(&TreeParams::default(), 0).is_empty());
    }

    #[test]
    fn depth_one_is_trunk() {
        let segs = tree(&TreeParams::default(), 1);
        assert_eq!(segs.len(), 1);
        assert_eq!(segs[0].from, Point::ORIGIN);
        assert_approx_eq!(segs[0].to.x, 0.0);
        assert_approx_eq!(segs[0].to.y, 80.0);
    }

    #[test]
    fn binary_tree_segment_count() {
        // 1 + 2 + 4 + 8
        assert_eq!(tree(&TreeParams::default(), 4).len(), 15);
    }

    #[test]
    fn ternary_tree_segment_count() {
        let params = TreeParams {
            branches: 3,
            ..TreeParams::default()
        };
        // 1 + 3 + 9
        assert_eq!(tree(&params, 3).len(), 13);
    }

    #[test]
    fn children_start_at_trunk_tip_and_shrink() {
        let segs = tree(&TreeParams::default(), 2);
        let trunk = segs[0];
        for child in &segs[1..] {
            assert_eq!(child.from, trunk.to);
            assert_approx_eq!(child.length(), 80.0 * 0.67);
        }
    }

    #[test]
    fn binary_children_are_symmetric() {
        let segs = tree(&TreeParams::default(), 2);
        assert_approx_eq!(segs[1].to.x, -segs[2].to.x);
        assert_approx_eq!(segs[1].to.y, segs[2].to.y);
    }

    #[test]
    fn odd_branch_count_keeps_a_straight_child() {
        let params = TreeParams {
            branches: 3,
            ..TreeParams::default()
        };
        let segs = tree(&params, 2);
        // Middle child (i = 1) continues straight up.
        assert_approx_eq!(segs[2].to.x, 0.0);
    }
}
