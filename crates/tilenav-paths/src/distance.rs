//! Grid distance metrics used as search heuristics.

use tilenav_core::Point;

/// Manhattan (L1) distance between two points.
///
/// The exact minimum step count under 4-way movement, so it is an
/// admissible heuristic there when scaled by the minimum per-step cost.
#[inline]
pub fn manhattan(a: Point, b: Point) -> u32 {
    (a.x - b.x).unsigned_abs() + (a.y - b.y).unsigned_abs()
}

/// Chebyshev (L∞) distance between two points.
///
/// The exact minimum step count under 8-way movement.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> u32 {
    (a.x - b.x).unsigned_abs().max((a.y - b.y).unsigned_abs())
}
