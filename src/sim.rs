// Body simulator: one fixed step per frame with reflective walls.

use log::trace;

use crate::types::{Body, Bounds};

/// Advance every body by one frame (dt = 1) and flip velocity on wall contact.
///
/// The wall test runs after the position update, per axis and independently,
/// so a corner hit flips both components in the same step. Positions are never
/// clamped: a body still overlapping a wall on the next frame flips again.
pub fn advance(bodies: &mut [Body], bounds: Bounds) {
    for (i, b) in bodies.iter_mut().enumerate() {
        b.x += b.vx;
        b.y += b.vy;

        if b.x - b.radius < 0.0 || b.x + b.radius > bounds.width {
            b.vx = -b.vx;
            trace!("body {i} bounced on x at ({:.1}, {:.1})", b.x, b.y);
        }
        if b.y - b.radius < 0.0 || b.y + b.radius > bounds.height {
            b.vy = -b.vy;
            trace!("body {i} bounced on y at ({:.1}, {:.1})", b.x, b.y);
        }
    }
}
