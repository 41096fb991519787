//! Multi-threaded circle collision simulator.
//!
//! Two populations of circles share a plane: a stationary set, sorted
//! once by x and indexed by a line sweep, and a moving set that is
//! advanced and swept against it every tick by a pool of persistent
//! worker threads. Collisions damage both sides and reflect the moving
//! circle's velocity.

pub mod collision;
pub mod config;
pub mod error;
pub mod metrics;
pub mod partition;
pub mod pool;
pub mod simulator;
pub mod spatial;
pub mod spawn;
pub mod world;

// Re-export commonly used types
pub use config::{RadiusMode, SimConfig, SpawnRange};
pub use error::SimError;
pub use metrics::{CollisionEvent, MemorySink, MetricsSink, TickMetrics};
pub use simulator::{SimOptions, Simulator};
pub use spawn::spawn_population;
pub use world::{MovingStore, StationaryStore};
