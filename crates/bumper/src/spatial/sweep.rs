//! Bounded binary locate over the x-sorted stationary array.

use crate::world::StationaryCircle;

/// Find *any* circle whose x lies strictly inside `(left, right)`.
///
/// This is a bounded-interval locate, not a lower bound: the returned
/// index is some circle inside the window, and further candidates may
/// sit on either side of it. The collision kernel walks outward from
/// the hit to collect them.
///
/// Each step halves `[s, e)`: if the whole window is left of the
/// midpoint the upper half is cut, if it is right of the midpoint the
/// lower half is cut, otherwise the midpoint is inside the window and
/// is returned.
pub fn locate_in_window(circles: &[StationaryCircle], left: f32, right: f32) -> Option<usize> {
    if circles.is_empty() {
        return None;
    }

    let mut s = 0usize;
    let mut e = circles.len();
    loop {
        let m = s + (e - s) / 2;
        let x = circles[m].position.x;
        if right <= x {
            e = m;
        } else if left >= x {
            s = m;
        } else {
            return Some(m);
        }
        if e - s <= 1 {
            return None;
        }
    }
}
