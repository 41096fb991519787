//! Collision detection and resolution.
//!
//! The kernel runs once per moving circle: a bounded binary locate
//! picks any stationary circle inside the conservative x-window, the
//! sweep walks right then left from it, and every overlapping pair gets
//! the collision effects (damage on both sides, velocity reflection).

use crate::metrics::CollisionEvent;
use crate::spatial;
use crate::world::{MovingCircle, MovingIdentity, MovingSpan, StationaryCircle, StationaryStore};

/// Hit points removed from each side of a collision.
pub const COLLISION_DAMAGE: i32 = 20;

/// What one executor produced over its span this tick.
#[derive(Debug, Default)]
pub struct SpanOutcome {
    pub collisions: u32,
    pub events: Vec<CollisionEvent>,
}

/// Run the collision kernel over one span of the moving store.
///
/// `window_half_width` is `2 * max_radius`, the upper bound on any
/// pairwise radius sum; any stationary circle further away on x cannot
/// overlap. Overlaps are resolved in traversal order, right sweep
/// before left sweep, so a circle hit several times reflects off each
/// neighbour sequentially.
pub fn process_span(
    stationary: &StationaryStore,
    span: &mut MovingSpan,
    window_half_width: f32,
    emit_events: bool,
) -> SpanOutcome {
    let mut outcome = SpanOutcome::default();
    let circles = stationary.circles();
    let (moving, identity) = span.parts();

    for (circle, ident) in moving.iter_mut().zip(identity.iter_mut()) {
        let left = circle.position.x - window_half_width;
        let right = circle.position.x + window_half_width;

        let Some(hit) = spatial::locate_in_window(circles, left, right) else {
            continue;
        };

        // Sweep right from the located candidate, inclusive.
        for candidate in &circles[hit..] {
            if candidate.position.x >= right {
                break;
            }
            collide(stationary, candidate, circle, ident, emit_events, &mut outcome);
        }

        // Then sweep left from the candidate's neighbour.
        for candidate in circles[..hit].iter().rev() {
            if candidate.position.x <= left {
                break;
            }
            collide(stationary, candidate, circle, ident, emit_events, &mut outcome);
        }
    }

    outcome
}

/// Narrow phase for a single pair: distance check, damage on both
/// sides, reflection of the moving circle's velocity.
fn collide(
    stationary: &StationaryStore,
    candidate: &StationaryCircle,
    circle: &mut MovingCircle,
    ident: &mut MovingIdentity,
    emit_events: bool,
    outcome: &mut SpanOutcome,
) {
    let delta = candidate.position - circle.position;
    let distance = delta.length();
    if distance >= circle.radius + candidate.radius {
        return;
    }

    ident.hit_points = ident.hit_points.wrapping_sub(COLLISION_DAMAGE);
    let stationary_hp = stationary.apply_damage(candidate.back_index, COLLISION_DAMAGE);

    // Coincident centers still count as a collision, but there is no
    // contact normal to reflect across.
    if distance > 0.0 {
        let normal = delta / distance;
        circle.velocity -= 2.0 * circle.velocity.dot(normal) * normal;
    }

    outcome.collisions += 1;
    if emit_events {
        outcome.events.push(CollisionEvent {
            moving_name: ident.name.clone(),
            moving_hp_after: ident.hit_points,
            stationary_name: stationary.identity(candidate.back_index).name.clone(),
            stationary_hp_after: stationary_hp,
        });
    }
}
