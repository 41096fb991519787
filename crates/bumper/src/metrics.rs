//! Per-tick metrics and the sink boundary.

/// Summary of one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickMetrics {
    /// 1-based index of the tick that just completed.
    pub tick_index: u64,
    /// Total circles in the simulation (stationary + moving).
    pub circle_count: u64,
    /// Wall-clock time the tick took.
    pub elapsed_seconds: f32,
    /// Collisions detected this tick, summed over all executors.
    pub total_collisions: u32,
}

/// One collision, reported only when per-collision emission is enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub moving_name: String,
    pub moving_hp_after: i32,
    pub stationary_name: String,
    pub stationary_hp_after: i32,
}

/// Caller-provided destination for per-tick records.
///
/// A failing sink never stops the simulation: the driver drops the
/// record, warns, and carries on.
pub trait MetricsSink {
    /// Append the summary of a completed tick.
    fn record_tick(&mut self, metrics: &TickMetrics) -> anyhow::Result<()>;

    /// Append a single collision. Only called when the simulator was
    /// built with per-collision emission enabled.
    fn record_collision(&mut self, event: &CollisionEvent) -> anyhow::Result<()> {
        let _ = event;
        Ok(())
    }
}

/// Sink that buffers everything in memory. Used by tests and by callers
/// that want to inspect a run after the fact.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub ticks: Vec<TickMetrics>,
    pub collisions: Vec<CollisionEvent>,
}

impl MetricsSink for MemorySink {
    fn record_tick(&mut self, metrics: &TickMetrics) -> anyhow::Result<()> {
        self.ticks.push(*metrics);
        Ok(())
    }

    fn record_collision(&mut self, event: &CollisionEvent) -> anyhow::Result<()> {
        self.collisions.push(event.clone());
        Ok(())
    }
}
