//! Turtle interpretation of L-system strings.
//!
//! | symbol | action                                        |
//! |--------|-----------------------------------------------|
//! | `F`    | move forward one step, emitting a segment     |
//! | `+`    | turn by `+angle`                              |
//! | `-`    | turn by `-angle`                              |
//! | `[`    | push the cursor                               |
//! | `]`    | pop the cursor; no-op when the stack is empty |
//!
//! Every other symbol is a grammar placeholder and is ignored.

use std::f64::consts::FRAC_PI_2;

use log::debug;

use super::{Point, Segment};

/// Heading every interpretation starts with: pointing up.
pub const INITIAL_HEADING: f64 = FRAC_PI_2;

/// Turtle state: where it is and which way it faces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub position: Point,
    /// Radians, counter-clockwise from +x.
    pub heading: f64,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            position: Point::ORIGIN,
            heading: INITIAL_HEADING,
        }
    }
}

/// Interpret `symbols` starting at the origin facing up.
///
/// `angle_step` is in radians; positive turns are counter-clockwise.
pub fn interpret(symbols: &str, angle_step: f64, step_length: f64) -> Vec<Segment> {
    let mut cursor = Cursor::default();
    let mut stack: Vec<Cursor> = Vec::new();
    let mut segments = Vec::new();
    let mut unmatched = 0usize;

    for symbol in symbols.chars() {
        match symbol {
            'F' => {
                let next = cursor.position.advance(cursor.heading, step_length);
                segments.push(Segment::new(cursor.position, next));
                cursor.position = next;
            }
            '+' => cursor.heading += angle_step,
            '-' => cursor.heading -= angle_step,
            '[' => stack.push(cursor),
            ']' => match stack.pop() {
                Some(saved) => cursor = saved,
                None => unmatched += 1,
            },
            _ => {}
        }
    }

    if unmatched > 0 {
        debug!("ignored {unmatched} unmatched ']' while interpreting");
    }
    segments
}
