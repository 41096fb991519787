//! Circle stores.
//!
//! Both populations are laid out struct-of-arrays style: the hot
//! collision payload (positions, velocities, radii) is kept apart from
//! the cold identity payload (names, hit points, colors) so the sweep
//! only streams the data it compares.

use glam::{Vec2, Vec3};
use std::ops::Range;
use std::sync::Mutex;

/// Hit points every circle starts with.
pub const INITIAL_HIT_POINTS: i32 = 100;

/// Spawn-time description of a stationary circle.
#[derive(Debug, Clone, Copy)]
pub struct StationarySeed {
    pub position: Vec2,
    pub radius: f32,
    pub color: Vec3,
}

/// Spawn-time description of a moving circle.
#[derive(Debug, Clone, Copy)]
pub struct MovingSeed {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
    pub color: Vec3,
}

/// Hot collision record for a stationary circle.
///
/// `back_index` points at the matching identity record and its lock;
/// it is assigned once after the sort and never changes.
#[derive(Debug, Clone, Copy)]
pub struct StationaryCircle {
    pub position: Vec2,
    pub radius: f32,
    pub back_index: u32,
}

/// Cold identity record for a stationary circle.
///
/// `name` and `color` are immutable after construction, so they may be
/// read from any thread without holding the hit-point lock.
#[derive(Debug)]
pub struct StationaryIdentity {
    pub name: String,
    pub color: Vec3,
}

/// The stationary population.
///
/// The collision array is sorted ascending by x at construction and no
/// public API can perturb it afterwards; during a tick it is shared
/// read-only across all workers. Hit points live in one mutex per
/// circle, indexed by `back_index`, which is the only mutable
/// stationary state.
#[derive(Debug)]
pub struct StationaryStore {
    circles: Vec<StationaryCircle>,
    identity: Vec<StationaryIdentity>,
    hit_points: Vec<Mutex<i32>>,
    max_radius: f32,
}

impl StationaryStore {
    /// Build the store from unsorted seeds.
    ///
    /// Sorts by x, then names each circle `S{i}` after its sorted slot
    /// so the name always matches the back-index.
    pub fn new(mut seeds: Vec<StationarySeed>) -> Self {
        seeds.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));

        let mut circles = Vec::with_capacity(seeds.len());
        let mut identity = Vec::with_capacity(seeds.len());
        let mut hit_points = Vec::with_capacity(seeds.len());
        let mut max_radius = 0.0f32;

        for (i, seed) in seeds.into_iter().enumerate() {
            max_radius = max_radius.max(seed.radius);
            circles.push(StationaryCircle {
                position: seed.position,
                radius: seed.radius,
                back_index: i as u32,
            });
            identity.push(StationaryIdentity {
                name: format!("S{i}"),
                color: seed.color,
            });
            hit_points.push(Mutex::new(INITIAL_HIT_POINTS));
        }

        Self {
            circles,
            identity,
            hit_points,
            max_radius,
        }
    }

    /// The sorted collision array, for the sweep.
    #[inline]
    pub fn circles(&self) -> &[StationaryCircle] {
        &self.circles
    }

    /// Identity record for a back-index.
    #[inline]
    pub fn identity(&self, back_index: u32) -> &StationaryIdentity {
        &self.identity[back_index as usize]
    }

    /// Subtract `amount` from a circle's hit points under its lock and
    /// return the new value. Hit points are not clamped.
    pub fn apply_damage(&self, back_index: u32, amount: i32) -> i32 {
        let mut hp = self.hit_points[back_index as usize].lock().unwrap();
        *hp = hp.wrapping_sub(amount);
        *hp
    }

    /// Current hit points of a circle.
    pub fn hit_points(&self, back_index: u32) -> i32 {
        *self.hit_points[back_index as usize].lock().unwrap()
    }

    /// Largest stationary radius.
    #[inline]
    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.circles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }
}

/// Hot collision record for a moving circle.
#[derive(Debug, Clone, Copy)]
pub struct MovingCircle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f32,
}

/// Cold identity record for a moving circle. Mutated only by the worker
/// owning its span.
#[derive(Debug)]
pub struct MovingIdentity {
    pub name: String,
    pub hit_points: i32,
    pub color: Vec3,
}

/// The moving population. Never sorted; writes are partitioned into
/// disjoint spans, one per executor per tick.
#[derive(Debug)]
pub struct MovingStore {
    circles: Vec<MovingCircle>,
    identity: Vec<MovingIdentity>,
    max_radius: f32,
}

impl MovingStore {
    pub fn new(seeds: Vec<MovingSeed>) -> Self {
        let mut circles = Vec::with_capacity(seeds.len());
        let mut identity = Vec::with_capacity(seeds.len());
        let mut max_radius = 0.0f32;

        for (i, seed) in seeds.into_iter().enumerate() {
            max_radius = max_radius.max(seed.radius);
            circles.push(MovingCircle {
                position: seed.position,
                velocity: seed.velocity,
                radius: seed.radius,
            });
            identity.push(MovingIdentity {
                name: format!("M{i}"),
                hit_points: INITIAL_HIT_POINTS,
                color: seed.color,
            });
        }

        Self {
            circles,
            identity,
            max_radius,
        }
    }

    #[inline]
    pub fn circles(&self) -> &[MovingCircle] {
        &self.circles
    }

    #[inline]
    pub fn circles_mut(&mut self) -> &mut [MovingCircle] {
        &mut self.circles
    }

    #[inline]
    pub fn identity(&self) -> &[MovingIdentity] {
        &self.identity
    }

    /// Largest moving radius.
    #[inline]
    pub fn max_radius(&self) -> f32 {
        self.max_radius
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.circles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.circles.is_empty()
    }

    /// Split the store into one mutable span per executor.
    ///
    /// `bounds` must be contiguous half-open ranges starting at 0 and
    /// jointly covering the whole store; anything else is a partition
    /// bug, so it panics rather than risking aliased writes.
    pub fn spans(&mut self, bounds: &[Range<usize>]) -> Vec<MovingSpan> {
        let mut expected = 0;
        for bound in bounds {
            assert!(
                bound.start == expected && bound.end >= bound.start,
                "moving spans must be contiguous and disjoint"
            );
            expected = bound.end;
        }
        assert_eq!(expected, self.circles.len(), "moving spans must cover the store");

        let circles = self.circles.as_mut_ptr();
        let identity = self.identity.as_mut_ptr();
        bounds
            .iter()
            .map(|bound| MovingSpan {
                // SAFETY: the checks above guarantee `bound` lies inside
                // the store and overlaps no other span.
                circles: unsafe { circles.add(bound.start) },
                identity: unsafe { identity.add(bound.start) },
                len: bound.end - bound.start,
            })
            .collect()
    }
}

/// Mutable view of one executor's contiguous span of the moving store.
///
/// Spans are only built by [`MovingStore::spans`], which guarantees
/// disjointness, and each one is moved into exactly one executor, so a
/// span is a single-writer witness. The driver must not touch the
/// moving store again until every span from the current tick has been
/// dropped (it joins the pool before doing so).
#[derive(Debug)]
pub struct MovingSpan {
    circles: *mut MovingCircle,
    identity: *mut MovingIdentity,
    len: usize,
}

// SAFETY: a span is the unique handle to its range; sending it to the
// worker that owns the range is the whole point.
unsafe impl Send for MovingSpan {}

impl MovingSpan {
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Both halves of the span, borrowed for the span's lifetime.
    #[inline]
    pub fn parts(&mut self) -> (&mut [MovingCircle], &mut [MovingIdentity]) {
        // SAFETY: pointers and length come from a live Vec, and `&mut
        // self` prevents handing out overlapping borrows.
        unsafe {
            (
                std::slice::from_raw_parts_mut(self.circles, self.len),
                std::slice::from_raw_parts_mut(self.identity, self.len),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec2;
    use std::sync::Arc;

    fn stationary_seed(x: f32) -> StationarySeed {
        StationarySeed {
            position: vec2(x, 0.0),
            radius: 1.0,
            color: Vec3::ONE,
        }
    }

    #[test]
    fn test_stationary_store_sorts_and_back_indexes() {
        let store = StationaryStore::new(vec![
            stationary_seed(5.0),
            stationary_seed(-3.0),
            stationary_seed(1.0),
        ]);

        let xs: Vec<f32> = store.circles().iter().map(|c| c.position.x).collect();
        assert_eq!(xs, vec![-3.0, 1.0, 5.0]);
        for (i, circle) in store.circles().iter().enumerate() {
            assert_eq!(circle.back_index as usize, i);
            assert_eq!(store.identity(circle.back_index).name, format!("S{i}"));
            assert_eq!(store.hit_points(circle.back_index), INITIAL_HIT_POINTS);
        }
    }

    #[test]
    fn test_apply_damage_is_exact_under_contention() {
        let store = Arc::new(StationaryStore::new(vec![stationary_seed(0.0)]));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        store.apply_damage(0, 1);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.hit_points(0), INITIAL_HIT_POINTS - 8000);
    }

    #[test]
    fn test_moving_spans_are_disjoint_views() {
        let seeds: Vec<MovingSeed> = (0..10)
            .map(|i| MovingSeed {
                position: vec2(i as f32, 0.0),
                velocity: Vec2::ZERO,
                radius: 1.0,
                color: Vec3::ONE,
            })
            .collect();
        let mut store = MovingStore::new(seeds);

        let mut spans = store.spans(&[0..4, 4..7, 7..10]);
        assert_eq!(spans.len(), 3);
        assert_eq!(spans[0].len(), 4);
        assert_eq!(spans[2].len(), 3);

        for span in &mut spans {
            let (circles, identity) = span.parts();
            for circle in circles.iter_mut() {
                circle.position.y = 9.0;
            }
            for ident in identity.iter_mut() {
                ident.hit_points -= 20;
            }
        }
        drop(spans);

        assert!(store.circles().iter().all(|c| c.position.y == 9.0));
        assert!(store
            .identity()
            .iter()
            .all(|i| i.hit_points == INITIAL_HIT_POINTS - 20));
    }

    #[test]
    #[should_panic(expected = "contiguous")]
    fn test_moving_spans_reject_overlap() {
        let seeds: Vec<MovingSeed> = (0..4)
            .map(|i| MovingSeed {
                position: vec2(i as f32, 0.0),
                velocity: Vec2::ZERO,
                radius: 1.0,
                color: Vec3::ONE,
            })
            .collect();
        let mut store = MovingStore::new(seeds);
        let _ = store.spans(&[0..3, 2..4]);
    }

    #[test]
    fn test_moving_names_and_hit_points() {
        let store = MovingStore::new(vec![MovingSeed {
            position: Vec2::ZERO,
            velocity: vec2(1.0, 0.0),
            radius: 2.0,
            color: Vec3::ONE,
        }]);
        assert_eq!(store.identity()[0].name, "M0");
        assert_eq!(store.identity()[0].hit_points, INITIAL_HIT_POINTS);
        assert_eq!(store.max_radius(), 2.0);
    }
}
