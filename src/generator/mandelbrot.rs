//! Mandelbrot escape-time field.

use std::sync::atomic::{AtomicBool, Ordering};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::spec::MandelbrotParams;

/// Samples per unit of the complex plane at zoom 1.
pub const PIXELS_PER_UNIT: f64 = 200.0;

/// Iterations before `z = z² + c` leaves the radius-2 disc, or `max` if it never does.
pub fn escape_count(cx: f64, cy: f64, max: u32) -> u32 {
    let (mut zx, mut zy) = (0.0f64, 0.0f64);
    let mut i = 0;
    while zx * zx + zy * zy < 4.0 && i < max {
        let next = zx * zx - zy * zy + cx;
        zy = 2.0 * zx * zy + cy;
        zx = next;
        i += 1;
    }
    i
}

/// Complex coordinate sampled at grid cell `(x, y)`.
pub fn sample_point(params: &MandelbrotParams, x: u32, y: u32) -> (f64, f64) {
    let scale = PIXELS_PER_UNIT * params.zoom;
    (
        (x as f64 - params.width as f64 / 2.0) / scale + params.offset_x,
        (y as f64 - params.height as f64 / 2.0) / scale + params.offset_y,
    )
}

/// Row-major grid of escape counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EscapeField {
    width: u32,
    height: u32,
    max_iterations: u32,
    counts: Vec<u32>,
}

impl EscapeField {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The count that marks a sample as inside the set.
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.counts
            .get(y as usize * self.width as usize + x as usize)
            .copied()
    }

    /// Whether the sample escaped before the iteration cap.
    pub fn escaped(&self, x: u32, y: u32) -> Option<bool> {
        self.get(x, y).map(|n| n < self.max_iterations)
    }

    /// Count normalised to `[0, 1]`, for colouring.
    pub fn brightness(&self, x: u32, y: u32) -> Option<f64> {
        self.get(x, y)
            .map(|n| n as f64 / self.max_iterations as f64)
    }
}

/// Compute the full field.
pub fn field(params: &MandelbrotParams) -> EscapeField {
    let never = AtomicBool::new(false);
    compute(params, &never).unwrap_or_else(|| EscapeField {
        width: params.width,
        height: params.height,
        max_iterations: params.max_iterations,
        counts: Vec::new(),
    })
}

/// Compute the field, checking `cancel` before each row.
///
/// Returns `None` if cancelled; partial results are discarded.
pub fn field_with_cancel(params: &MandelbrotParams, cancel: &AtomicBool) -> Option<EscapeField> {
    compute(params, cancel)
}

fn compute(params: &MandelbrotParams, cancel: &AtomicBool) -> Option<EscapeField> {
    let mut counts = Vec::with_capacity(params.width as usize * params.height as usize);
    for y in 0..params.height {
        if cancel.load(Ordering::Relaxed) {
            debug!("mandelbrot cancelled at row {y} of {}", params.height);
            return None;
        }
        for x in 0..params.width {
            let (cx, cy) = sample_point(params, x, y);
            counts.push(escape_count(cx, cy, params.max_iterations));
        }
    }
    Some(EscapeField {
        width: params.width,
        height: params.height,
        max_iterations: params.max_iterations,
        counts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn small() -> MandelbrotParams {
        MandelbrotParams {
            width: 40,
            height: 30,
            max_iterations: 50,
            ..MandelbrotParams::default()
        }
    }

    #[test]
    fn origin_never_escapes() {
        assert_eq!(escape_count(0.0, 0.0, 100), 100);
    }

    #[test]
    fn two_escapes_immediately() {
        assert!(escape_count(2.0, 0.0, 100) <= 1);
    }

    #[test]
    fn far_point_escapes_at_once() {
        assert_eq!(escape_count(10.0, 10.0, 100), 1);
    }

    #[test]
    fn minus_one_is_periodic() {
        assert_eq!(escape_count(-1.0, 0.0, 500), 500);
    }

    #[test]
    fn zero_max_means_zero_count() {
        assert_eq!(escape_count(0.0, 0.0, 0), 0);
    }

    #[test]
    fn centre_sample_maps_to_offset() {
        let params = MandelbrotParams {
            offset_x: -0.5,
            offset_y: 0.25,
            ..small()
        };
        let (cx, cy) = sample_point(&params, 20, 15);
        assert_approx_eq!(cx, -0.5);
        assert_approx_eq!(cy, 0.25);
    }

    #[test]
    fn zoom_shrinks_sample_spacing() {
        let wide = sample_point(&small(), 21, 15).0 - sample_point(&small(), 20, 15).0;
        let zoomed = MandelbrotParams {
            zoom: 4.0,
            ..small()
        };
        let narrow = sample_point(&zoomed, 21, 15).0 - sample_point(&zoomed, 20, 15).0;
        assert_approx_eq!(wide, 1.0 / 200.0);
        assert_approx_eq!(narrow, wide / 4.0);
    }

    #[test]
    fn field_has_one_count_per_sample() {
        let f = field(&small());
        assert_eq!(f.counts().len(), 40 * 30);
        assert_eq!(f.width(), 40);
        assert_eq!(f.height(), 30);
        // The centre is the origin of the plane, inside the set.
        assert_eq!(f.get(20, 15), Some(50));
        assert_eq!(f.escaped(20, 15), Some(false));
        assert_eq!(f.brightness(20, 15), Some(1.0));
        assert_eq!(f.get(40, 0), None);
    }

    #[test]
    fn counts_stay_within_cap() {
        let f = field(&small());
        assert!(f.counts().iter().all(|&n| n <= 50));
    }

    #[test]
    fn cancelled_field_is_none() {
        let cancel = AtomicBool::new(true);
        assert!(field_with_cancel(&small(), &cancel).is_none());
    }

    #[test]
    fn uncancelled_matches_plain_field() {
        let cancel = AtomicBool::new(false);
        assert_eq!(field_with_cancel(&small(), &cancel), Some(field(&small())));
    }
}
