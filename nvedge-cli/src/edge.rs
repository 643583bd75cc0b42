//! Edge detection
//!
//! The editor answers "window in direction X" with the current window's own
//! number when nothing lies that way. Equality with the current window is
//! therefore the whole test.

use crate::nav::{Outcome, WindowNumber};

/// Decide a move from the window the move would land on
pub fn move_outcome(current: WindowNumber, candidate: WindowNumber) -> Outcome {
    if candidate == current {
        Outcome::Blocked
    } else {
        Outcome::Possible
    }
}

/// Decide a resize from the neighbours on both sides of the axis
///
/// Blocked only when the current window is alone along the whole axis; a
/// neighbour on either side is enough to resize against.
pub fn resize_outcome(current: WindowNumber, neighbors: [WindowNumber; 2]) -> Outcome {
    if neighbors.iter().all(|n| *n == current) {
        Outcome::Blocked
    } else {
        Outcome::Possible
    }
}
