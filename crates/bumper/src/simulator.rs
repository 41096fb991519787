//! The tick driver.
//!
//! Per tick: advance every moving position, publish one span per
//! worker, sweep the orchestrator's own span inline, join, then report
//! the summed counters through the metrics sink.

use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

use crate::collision::{self, SpanOutcome};
use crate::error::SimError;
use crate::metrics::{MetricsSink, TickMetrics};
use crate::partition;
use crate::pool::{WorkerPool, MAX_WORKERS};
use crate::world::{MovingCircle, MovingIdentity, MovingStore, StationaryStore};

/// The subset of configuration the tick loop needs.
#[derive(Debug, Clone, Copy)]
pub struct SimOptions {
    /// Total executor count `W`, orchestrator included.
    pub workers: u32,
    /// Collect and report a record per collision.
    pub emit_per_collision: bool,
}

/// A running simulation: both populations, the worker pool, and the
/// per-tick bookkeeping.
pub struct Simulator {
    stationary: Arc<StationaryStore>,
    moving: MovingStore,
    pool: WorkerPool,
    /// Stable span assignment: one range per executor, the orchestrator's
    /// own range last.
    bounds: Vec<Range<usize>>,
    window_half_width: f32,
    emit_per_collision: bool,
    tick_index: u64,
    /// Metrics of the most recent tick, for callers (a visualizer, a
    /// pause prompt) that want the last frame's numbers between ticks.
    last_metrics: Option<TickMetrics>,
}

impl Simulator {
    /// Build a simulator from pre-populated stores.
    ///
    /// Spawns the persistent worker pool (`options.workers - 1`
    /// threads) and fixes the span assignment for the whole run.
    pub fn new(
        stationary: StationaryStore,
        moving: MovingStore,
        options: SimOptions,
    ) -> Result<Self, SimError> {
        if options.workers < 1 || options.workers > MAX_WORKERS {
            return Err(SimError::WorkerCountOutOfRange(options.workers));
        }

        // Upper bound on any pairwise radius sum, so the x-window is
        // conservative for every pair.
        let window_half_width = 2.0 * stationary.max_radius().max(moving.max_radius());

        let stationary = Arc::new(stationary);
        let pool = WorkerPool::spawn(
            Arc::clone(&stationary),
            options.workers as usize - 1,
            window_half_width,
            options.emit_per_collision,
        );
        let bounds = partition::slice_bounds(moving.len(), options.workers as usize);

        Ok(Self {
            stationary,
            moving,
            pool,
            bounds,
            window_half_width,
            emit_per_collision: options.emit_per_collision,
            tick_index: 0,
            last_metrics: None,
        })
    }

    /// Run one tick and report it through `sink`.
    pub fn tick(&mut self, sink: &mut dyn MetricsSink) -> TickMetrics {
        let started = Instant::now();

        // Advance positions single-threaded; a memory-bound streaming
        // pass that leaves the stationary index untouched.
        for circle in self.moving.circles_mut() {
            circle.position += circle.velocity;
        }

        // One span per executor; the last is the orchestrator's.
        let mut spans = self.moving.spans(&self.bounds);
        let own = spans.pop();
        self.pool.dispatch(spans);

        let own_outcome = match own {
            Some(mut span) => collision::process_span(
                &self.stationary,
                &mut span,
                self.window_half_width,
                self.emit_per_collision,
            ),
            None => SpanOutcome::default(),
        };

        let (worker_collisions, worker_events) = self.pool.join_tick();

        self.tick_index += 1;
        let metrics = TickMetrics {
            tick_index: self.tick_index,
            circle_count: (self.stationary.len() + self.moving.len()) as u64,
            elapsed_seconds: started.elapsed().as_secs_f32(),
            total_collisions: worker_collisions + own_outcome.collisions,
        };

        if self.emit_per_collision {
            for event in worker_events.iter().chain(own_outcome.events.iter()) {
                if let Err(err) = sink.record_collision(event) {
                    warn!("metrics sink rejected a collision record: {err}");
                }
            }
        }
        if let Err(err) = sink.record_tick(&metrics) {
            warn!("metrics sink rejected a tick record: {err}");
        }

        self.last_metrics = Some(metrics);
        metrics
    }

    /// Run `ticks` ticks back to back.
    pub fn run(&mut self, ticks: u64, sink: &mut dyn MetricsSink) {
        for _ in 0..ticks {
            self.tick(sink);
        }
    }

    /// Read-only snapshot of the moving population, valid between
    /// ticks. This is the boundary a visualizer would consume.
    pub fn moving_circles(&self) -> &[MovingCircle] {
        self.moving.circles()
    }

    /// Read-only view of the moving identities.
    pub fn moving_identity(&self) -> &[MovingIdentity] {
        self.moving.identity()
    }

    /// The stationary population.
    pub fn stationary(&self) -> &StationaryStore {
        &self.stationary
    }

    /// Index of the last completed tick.
    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Metrics of the most recent tick, if one has run.
    pub fn last_metrics(&self) -> Option<TickMetrics> {
        self.last_metrics
    }
}
