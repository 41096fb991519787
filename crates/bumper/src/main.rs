//! Console front-end for the collision simulator.

use std::io::BufRead;

use tracing::info;
use tracing_subscriber::EnvFilter;

use bumper::pool;
use bumper::{
    spawn_population, CollisionEvent, MetricsSink, RadiusMode, SimConfig, SimOptions, Simulator,
    TickMetrics,
};

/// Sink that reports every record as a log line.
struct LogSink;

impl MetricsSink for LogSink {
    fn record_tick(&mut self, metrics: &TickMetrics) -> anyhow::Result<()> {
        info!(
            "tick {}: processed {} circles in {:.4}s, {} collisions",
            metrics.tick_index,
            metrics.circle_count,
            metrics.elapsed_seconds,
            metrics.total_collisions
        );
        Ok(())
    }

    fn record_collision(&mut self, event: &CollisionEvent) -> anyhow::Result<()> {
        info!(
            "{} HP: {} hit {} HP: {}",
            event.moving_name,
            event.moving_hp_after,
            event.stationary_name,
            event.stationary_hp_after
        );
        Ok(())
    }
}

fn log_banner(config: &SimConfig, workers: u32) {
    info!("Multi-threaded circle collision simulator");
    info!("Using {} threads", workers);
    info!("Simulation configuration:");
    info!(
        "  circles: {} ({} stationary / {} moving)",
        config.total_circles,
        config.stationary_count(),
        config.moving_count()
    );
    info!("  seed: {}", config.spawn_seed);
    info!(
        "  spawn range x: {} --> {} y: {} --> {}",
        config.x_spawn_range.min,
        config.x_spawn_range.max,
        config.y_spawn_range.min,
        config.y_spawn_range.max
    );
    info!(
        "  initial velocities x: {} --> {} y: {} --> {}",
        config.x_velocity_range.min,
        config.x_velocity_range.max,
        config.y_velocity_range.min,
        config.y_velocity_range.max
    );
    match config.radius {
        RadiusMode::Fixed { r } => info!("  radius: fixed {r}"),
        RadiusMode::Uniform { lo, hi } => info!("  radius: uniform {lo} --> {hi}"),
    }
    if config.emit_per_collision {
        info!("  reporting every collision (timings will not be representative)");
    }
    if config.pause_after_tick {
        info!("  pausing after each tick; press ENTER to continue");
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("bumper v{}", env!("CARGO_PKG_VERSION"));

    let config = SimConfig::load()?;
    config.validate()?;

    let workers = pool::resolve_workers(config.max_workers);
    log_banner(&config, workers);

    let (stationary, moving) = spawn_population(&config);
    let mut simulator = Simulator::new(
        stationary,
        moving,
        SimOptions {
            workers,
            emit_per_collision: config.emit_per_collision,
        },
    )?;

    let mut sink = LogSink;
    let stdin = std::io::stdin();
    loop {
        simulator.tick(&mut sink);

        if config.pause_after_tick {
            let mut line = String::new();
            // EOF means whoever was stepping us is gone: exit cleanly.
            if stdin.lock().read_line(&mut line)? == 0 {
                break;
            }
        }
    }

    Ok(())
}
