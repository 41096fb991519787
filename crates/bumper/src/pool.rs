//! Persistent worker pool.
//!
//! The pool owns `W - 1` long-lived threads; the orchestrator thread is
//! the remaining executor. Each worker rendezvouses with the
//! orchestrator through its own [`WorkSlot`]: a mutex-guarded state
//! record plus one condition variable used in both directions. The
//! `complete` flag is the wait predicate on both sides, which defeats
//! spurious wake-ups, and the lock is only ever held across flag and
//! parameter updates, never across kernel execution.

use std::sync::{Arc, Condvar, Mutex};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

use crate::collision::{self, SpanOutcome};
use crate::metrics::CollisionEvent;
use crate::world::{MovingSpan, StationaryStore};

/// Ceiling on pool size, orchestrator included.
pub const MAX_WORKERS: u32 = 32;

/// Executor count to assume when the hardware query fails.
const FALLBACK_PARALLELISM: u32 = 8;

/// Resolve the executor count for a run: detected hardware parallelism
/// clamped by the configured ceiling, falling back to
/// [`FALLBACK_PARALLELISM`] when detection fails.
pub fn resolve_workers(max_workers: u32) -> u32 {
    let detected = match thread::available_parallelism() {
        Ok(n) => n.get() as u32,
        Err(err) => {
            warn!(
                "hardware parallelism query failed ({err}), assuming {} threads",
                FALLBACK_PARALLELISM
            );
            FALLBACK_PARALLELISM
        }
    };
    let ceiling = max_workers.clamp(1, MAX_WORKERS);
    detected.clamp(1, ceiling)
}

/// Everything the orchestrator and one worker exchange, guarded by the
/// slot's mutex.
#[derive(Debug)]
struct SlotState {
    /// Wait predicate: true while the slot is idle, false while the
    /// worker owns the published span.
    complete: bool,
    /// Set once at teardown, checked under the same predicate so the
    /// worker can be joined instead of detached.
    shutdown: bool,
    /// The span to sweep this tick. Taken by the worker on wake-up.
    span: Option<MovingSpan>,
    /// Tick-local collision counter, read back after completion.
    collisions: u32,
    /// Tick-local collision events, drained after completion.
    events: Vec<CollisionEvent>,
}

/// One worker's rendezvous point with the orchestrator.
#[derive(Debug)]
struct WorkSlot {
    state: Mutex<SlotState>,
    signal: Condvar,
}

impl WorkSlot {
    fn new() -> Self {
        Self {
            state: Mutex::new(SlotState {
                complete: true,
                shutdown: false,
                span: None,
                collisions: 0,
                events: Vec::new(),
            }),
            signal: Condvar::new(),
        }
    }
}

/// Persistent pool of collision workers.
///
/// Created once at simulator construction and joined at drop; the
/// per-tick cost is one lock/signal round-trip per slot in each
/// direction.
pub struct WorkerPool {
    slots: Vec<Arc<WorkSlot>>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `worker_count` persistent workers (the orchestrator is not
    /// one of them; pass `W - 1`).
    pub fn spawn(
        stationary: Arc<StationaryStore>,
        worker_count: usize,
        window_half_width: f32,
        emit_events: bool,
    ) -> Self {
        let mut slots = Vec::with_capacity(worker_count);
        let mut handles = Vec::with_capacity(worker_count);

        for index in 0..worker_count {
            let slot = Arc::new(WorkSlot::new());
            let worker_slot = Arc::clone(&slot);
            let worker_stationary = Arc::clone(&stationary);
            let handle = thread::spawn(move || {
                worker_loop(worker_slot, worker_stationary, window_half_width, emit_events);
            });
            debug!("spawned collision worker {index}");
            slots.push(slot);
            handles.push(handle);
        }

        Self { slots, handles }
    }

    /// Number of pooled workers (`W - 1`).
    pub fn worker_count(&self) -> usize {
        self.slots.len()
    }

    /// Publish one span per slot and wake every worker.
    ///
    /// Must be matched by a [`WorkerPool::join_tick`] before the moving
    /// store is touched again.
    pub fn dispatch(&self, spans: Vec<MovingSpan>) {
        assert_eq!(spans.len(), self.slots.len(), "one span per worker");

        for (slot, span) in self.slots.iter().zip(spans) {
            let mut state = slot.state.lock().unwrap();
            state.span = Some(span);
            state.collisions = 0;
            state.complete = false;
            drop(state);
            slot.signal.notify_one();
        }
    }

    /// Wait until every worker has finished its span, then collect the
    /// per-slot counters and events.
    pub fn join_tick(&self) -> (u32, Vec<CollisionEvent>) {
        let mut total = 0u32;
        let mut events = Vec::new();
        for slot in &self.slots {
            let mut state = slot.state.lock().unwrap();
            while !state.complete {
                state = slot.signal.wait(state).unwrap();
            }
            total += state.collisions;
            events.append(&mut state.events);
        }
        (total, events)
    }

    /// Wake every worker with the shutdown flag raised and join them.
    /// Idempotent; also run from `Drop`.
    pub fn shutdown(&mut self) {
        for slot in &self.slots {
            let mut state = slot.state.lock().unwrap();
            state.shutdown = true;
            state.complete = false;
            drop(state);
            slot.signal.notify_all();
        }
        for handle in self.handles.drain(..) {
            if handle.join().is_err() {
                warn!("collision worker panicked during shutdown");
            }
        }
        debug!("worker pool shut down");
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Body of one pooled worker: wait for a span, sweep it, publish the
/// outcome, signal back, repeat until shutdown.
fn worker_loop(
    slot: Arc<WorkSlot>,
    stationary: Arc<StationaryStore>,
    window_half_width: f32,
    emit_events: bool,
) {
    loop {
        let span = {
            let mut state = slot.state.lock().unwrap();
            loop {
                if state.shutdown {
                    return;
                }
                if !state.complete {
                    break;
                }
                state = slot.signal.wait(state).unwrap();
            }
            state.span.take()
        };

        // The heavy phase runs without the lock; the orchestrator will
        // not touch this slot's span until completion is signalled.
        let outcome = match span {
            Some(mut span) => {
                collision::process_span(&stationary, &mut span, window_half_width, emit_events)
            }
            None => SpanOutcome::default(),
        };

        let mut state = slot.state.lock().unwrap();
        state.collisions = outcome.collisions;
        state.events = outcome.events;
        state.complete = true;
        drop(state);
        slot.signal.notify_one();
    }
}
