//! Deterministic population generator.
//!
//! Everything is drawn from a single ChaCha stream seeded with
//! `spawn_seed`, so a given configuration always produces the same
//! world.

use glam::{vec2, vec3, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaChaRng;

use crate::config::{RadiusMode, SimConfig, SpawnRange};
use crate::world::{MovingSeed, MovingStore, StationarySeed, StationaryStore};

/// Build both populations from a validated configuration.
pub fn spawn_population(config: &SimConfig) -> (StationaryStore, MovingStore) {
    let mut rng = ChaChaRng::seed_from_u64(config.spawn_seed);

    let stationary_seeds: Vec<StationarySeed> = (0..config.stationary_count())
        .map(|_| StationarySeed {
            position: vec2(
                sample(&mut rng, config.x_spawn_range),
                sample(&mut rng, config.y_spawn_range),
            ),
            radius: sample_radius(&mut rng, config.radius),
            color: sample_color(&mut rng),
        })
        .collect();

    let moving_seeds: Vec<MovingSeed> = (0..config.moving_count())
        .map(|_| MovingSeed {
            position: vec2(
                sample(&mut rng, config.x_spawn_range),
                sample(&mut rng, config.y_spawn_range),
            ),
            velocity: vec2(
                sample(&mut rng, config.x_velocity_range),
                sample(&mut rng, config.y_velocity_range),
            ),
            radius: sample_radius(&mut rng, config.radius),
            color: sample_color(&mut rng),
        })
        .collect();

    (
        StationaryStore::new(stationary_seeds),
        MovingStore::new(moving_seeds),
    )
}

fn sample(rng: &mut ChaChaRng, range: SpawnRange) -> f32 {
    rng.random_range(range.min..=range.max)
}

fn sample_radius(rng: &mut ChaChaRng, mode: RadiusMode) -> f32 {
    match mode {
        RadiusMode::Fixed { r } => r,
        RadiusMode::Uniform { lo, hi } => rng.random_range(lo..=hi),
    }
}

fn sample_color(rng: &mut ChaChaRng) -> Vec3 {
    vec3(
        rng.random_range(0.0..=1.0),
        rng.random_range(0.0..=1.0),
        rng.random_range(0.0..=1.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::INITIAL_HIT_POINTS;

    fn small_config(total: u64, seed: u64) -> SimConfig {
        SimConfig {
            total_circles: total,
            spawn_seed: seed,
            ..SimConfig::default()
        }
    }

    #[test]
    fn test_population_split_and_defaults() {
        let (stationary, moving) = spawn_population(&small_config(101, 1));
        assert_eq!(stationary.len(), 50);
        assert_eq!(moving.len(), 51);
        assert!(stationary
            .circles()
            .iter()
            .all(|c| stationary.hit_points(c.back_index) == INITIAL_HIT_POINTS));
        assert!(moving
            .identity()
            .iter()
            .all(|i| i.hit_points == INITIAL_HIT_POINTS));
    }

    #[test]
    fn test_same_seed_same_world() {
        let config = small_config(64, 42);
        let (a_stationary, a_moving) = spawn_population(&config);
        let (b_stationary, b_moving) = spawn_population(&config);

        let a_xs: Vec<f32> = a_stationary.circles().iter().map(|c| c.position.x).collect();
        let b_xs: Vec<f32> = b_stationary.circles().iter().map(|c| c.position.x).collect();
        assert_eq!(a_xs, b_xs);

        for (a, b) in a_moving.circles().iter().zip(b_moving.circles()) {
            assert_eq!(a.position, b.position);
            assert_eq!(a.velocity, b.velocity);
            assert_eq!(a.radius, b.radius);
        }
    }

    #[test]
    fn test_different_seeds_differ() {
        let (a, _) = spawn_population(&small_config(64, 1));
        let (b, _) = spawn_population(&small_config(64, 2));
        let a_xs: Vec<f32> = a.circles().iter().map(|c| c.position.x).collect();
        let b_xs: Vec<f32> = b.circles().iter().map(|c| c.position.x).collect();
        assert_ne!(a_xs, b_xs);
    }

    #[test]
    fn test_stationary_store_comes_out_sorted() {
        let (stationary, _) = spawn_population(&small_config(500, 9));
        assert!(stationary
            .circles()
            .windows(2)
            .all(|w| w[0].position.x <= w[1].position.x));
        for (i, circle) in stationary.circles().iter().enumerate() {
            assert_eq!(circle.back_index as usize, i);
        }
    }

    #[test]
    fn test_samples_respect_configured_bounds() {
        let mut config = small_config(200, 3);
        config.x_spawn_range = SpawnRange::new(-10.0, 10.0);
        config.y_spawn_range = SpawnRange::new(5.0, 6.0);
        config.radius = RadiusMode::Uniform { lo: 1.0, hi: 2.0 };

        let (stationary, moving) = spawn_population(&config);
        for circle in stationary.circles() {
            assert!(circle.position.x >= -10.0 && circle.position.x <= 10.0);
            assert!(circle.position.y >= 5.0 && circle.position.y <= 6.0);
            assert!(circle.radius >= 1.0 && circle.radius <= 2.0);
        }
        for circle in moving.circles() {
            assert!(circle.velocity.x >= -5.0 && circle.velocity.x <= 5.0);
            assert!(circle.radius >= 1.0 && circle.radius <= 2.0);
        }
    }

    #[test]
    fn test_fixed_radius_mode() {
        let mut config = small_config(20, 3);
        config.radius = RadiusMode::Fixed { r: 1.5 };
        let (stationary, moving) = spawn_population(&config);
        assert!(stationary.circles().iter().all(|c| c.radius == 1.5));
        assert!(moving.circles().iter().all(|c| c.radius == 1.5));
        assert_eq!(stationary.max_radius(), 1.5);
    }
}
