//! Simulation configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::error::{SimError, MAX_CIRCLES};
use crate::pool::MAX_WORKERS;

/// An inclusive sampling interval for spawn positions and velocities.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct SpawnRange {
    pub min: f32,
    pub max: f32,
}

impl SpawnRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }
}

/// How circle radii are assigned at spawn time.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum RadiusMode {
    /// Every circle gets the same radius.
    Fixed { r: f32 },
    /// Radii are sampled uniformly from `[lo, hi]`.
    Uniform { lo: f32, hi: f32 },
}

impl Default for RadiusMode {
    fn default() -> Self {
        RadiusMode::Uniform { lo: 1.0, hi: 5.0 }
    }
}

/// Root configuration structure.
///
/// Scalar options come first so the serialized `config.toml` keeps
/// them ahead of the range tables.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimConfig {
    /// Total circle count; split into ⌊N/2⌋ stationary and ⌈N/2⌉ moving.
    #[serde(default = "default_total_circles")]
    pub total_circles: u64,
    /// Seed for the deterministic population generator.
    #[serde(default = "default_spawn_seed")]
    pub spawn_seed: u64,
    /// Ceiling on pool size, orchestrator thread included.
    #[serde(default = "default_max_workers")]
    pub max_workers: u32,
    /// Report every single collision through the metrics sink.
    #[serde(default)]
    pub emit_per_collision: bool,
    /// Wait for a line on stdin between ticks.
    #[serde(default)]
    pub pause_after_tick: bool,
    /// Sampling bounds for initial x positions.
    #[serde(default = "default_spawn_range")]
    pub x_spawn_range: SpawnRange,
    /// Sampling bounds for initial y positions.
    #[serde(default = "default_spawn_range")]
    pub y_spawn_range: SpawnRange,
    /// Sampling bounds for initial x velocities.
    #[serde(default = "default_velocity_range")]
    pub x_velocity_range: SpawnRange,
    /// Sampling bounds for initial y velocities.
    #[serde(default = "default_velocity_range")]
    pub y_velocity_range: SpawnRange,
    /// Radius assignment mode.
    #[serde(default)]
    pub radius: RadiusMode,
}

impl SimConfig {
    /// Load configuration from `config.toml` or use defaults.
    pub fn load() -> anyhow::Result<Self> {
        let path = Path::new("config.toml");
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&contents)?)
        } else {
            info!("No config.toml found, creating default config");
            let default_config = Self::default();
            std::fs::write(path, toml::to_string_pretty(&default_config)?)?;
            Ok(default_config)
        }
    }

    /// Check every bound the simulation relies on.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.total_circles < 2 {
            return Err(SimError::TooFewCircles(self.total_circles));
        }
        if self.total_circles > MAX_CIRCLES {
            return Err(SimError::TooManyCircles(self.total_circles));
        }
        for (axis, range) in [
            ("x_spawn", self.x_spawn_range),
            ("y_spawn", self.y_spawn_range),
            ("x_velocity", self.x_velocity_range),
            ("y_velocity", self.y_velocity_range),
        ] {
            if range.min > range.max {
                return Err(SimError::InvertedRange {
                    axis,
                    min: range.min,
                    max: range.max,
                });
            }
        }
        match self.radius {
            RadiusMode::Fixed { r } if r <= 0.0 => {
                return Err(SimError::NonPositiveRadius(r));
            }
            RadiusMode::Uniform { lo, hi } => {
                if lo <= 0.0 {
                    return Err(SimError::NonPositiveRadius(lo));
                }
                if lo > hi {
                    return Err(SimError::InvertedRange {
                        axis: "radius",
                        min: lo,
                        max: hi,
                    });
                }
            }
            _ => {}
        }
        if self.max_workers < 1 || self.max_workers > MAX_WORKERS {
            return Err(SimError::WorkerCountOutOfRange(self.max_workers));
        }
        Ok(())
    }

    /// Number of stationary circles: the lower half of the total.
    pub fn stationary_count(&self) -> usize {
        (self.total_circles / 2) as usize
    }

    /// Number of moving circles: the upper half of the total.
    pub fn moving_count(&self) -> usize {
        (self.total_circles - self.total_circles / 2) as usize
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            total_circles: default_total_circles(),
            spawn_seed: default_spawn_seed(),
            max_workers: default_max_workers(),
            emit_per_collision: false,
            pause_after_tick: false,
            x_spawn_range: default_spawn_range(),
            y_spawn_range: default_spawn_range(),
            x_velocity_range: default_velocity_range(),
            y_velocity_range: default_velocity_range(),
            radius: RadiusMode::default(),
        }
    }
}

fn default_total_circles() -> u64 {
    100_000
}
fn default_spawn_seed() -> u64 {
    10_000
}
fn default_spawn_range() -> SpawnRange {
    SpawnRange::new(-2000.0, 2000.0)
}
fn default_velocity_range() -> SpawnRange {
    SpawnRange::new(-5.0, 5.0)
}
fn default_max_workers() -> u32 {
    MAX_WORKERS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_counts_split_floor_ceil() {
        let mut config = SimConfig::default();
        config.total_circles = 7;
        assert_eq!(config.stationary_count(), 3);
        assert_eq!(config.moving_count(), 4);

        config.total_circles = 8;
        assert_eq!(config.stationary_count(), 4);
        assert_eq!(config.moving_count(), 4);
    }

    #[test]
    fn test_rejects_too_few_circles() {
        let mut config = SimConfig::default();
        config.total_circles = 1;
        assert!(matches!(
            config.validate(),
            Err(SimError::TooFewCircles(1))
        ));
    }

    #[test]
    fn test_rejects_inverted_range() {
        let mut config = SimConfig::default();
        config.y_spawn_range = SpawnRange::new(10.0, -10.0);
        assert!(matches!(
            config.validate(),
            Err(SimError::InvertedRange { axis: "y_spawn", .. })
        ));
    }

    #[test]
    fn test_rejects_bad_radius() {
        let mut config = SimConfig::default();
        config.radius = RadiusMode::Fixed { r: 0.0 };
        assert!(matches!(
            config.validate(),
            Err(SimError::NonPositiveRadius(_))
        ));

        config.radius = RadiusMode::Uniform { lo: 3.0, hi: 1.0 };
        assert!(matches!(
            config.validate(),
            Err(SimError::InvertedRange { axis: "radius", .. })
        ));
    }

    #[test]
    fn test_rejects_worker_count_out_of_range() {
        let mut config = SimConfig::default();
        config.max_workers = 0;
        assert!(config.validate().is_err());
        config.max_workers = MAX_WORKERS + 1;
        assert!(config.validate().is_err());
        config.max_workers = MAX_WORKERS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_radius_mode_from_toml() {
        let doc = r#"
            total_circles = 1000
            radius = { mode = "uniform", lo = 1.0, hi = 5.0 }
        "#;
        let config: SimConfig = toml::from_str(doc).unwrap();
        assert_eq!(config.total_circles, 1000);
        assert_eq!(config.radius, RadiusMode::Uniform { lo: 1.0, hi: 5.0 });

        let doc = r#"radius = { mode = "fixed", r = 2.5 }"#;
        let config: SimConfig = toml::from_str(doc).unwrap();
        assert_eq!(config.radius, RadiusMode::Fixed { r: 2.5 });
    }
}
