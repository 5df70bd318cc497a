//! Liveness monitor: background task that sweeps the roster on a timer.
//!
//! The `LivenessMonitor` owns its loop handle and the latest-summary
//! cell. Readers get the last completed summary without waiting; until
//! the first sweep lands they see `LivenessState::Initializing`.
//!
//! Sweeps are serialized: every sweep path (the loop, a replacement loop
//! after a restart, `sweep_now`) takes the same gate before probing and
//! holds it until the summary is published, so a published summary is
//! never replaced by one that started earlier. Ticks missed while a
//! sweep runs are skipped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{watch, Mutex, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use printwatch_core::Roster;

use crate::prober::Prober;
use crate::sweep::{sweep, SweepSummary};

/// What readers see in the latest-summary cell.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", content = "summary", rename_all = "snake_case")]
pub enum LivenessState {
    /// No sweep has completed yet. Not the same as "all offline".
    Initializing,
    /// The most recent completed sweep.
    Ready(Arc<SweepSummary>),
}

impl LivenessState {
    pub fn is_initializing(&self) -> bool {
        matches!(self, Self::Initializing)
    }

    pub fn summary(&self) -> Option<&Arc<SweepSummary>> {
        match self {
            Self::Initializing => None,
            Self::Ready(summary) => Some(summary),
        }
    }
}

/// Handle to the running loop.
struct MonitorSlot {
    handle: JoinHandle<()>,
    shutdown_tx: watch::Sender<bool>,
    refresh: Arc<Notify>,
}

/// Everything a sweep needs, shared between the monitor and its loop.
#[derive(Clone)]
struct SweepContext {
    roster: Roster,
    prober: Arc<dyn Prober>,
    timeout: Duration,
    state_tx: Arc<watch::Sender<LivenessState>>,
    sweeps: Arc<AtomicU64>,
    gate: Arc<Mutex<()>>,
}

impl SweepContext {
    /// Run one sweep and publish it. A sweep that dies keeps the last
    /// published summary in place.
    async fn run_once(&self) -> Option<Arc<SweepSummary>> {
        let _gate = self.gate.lock().await;

        let roster = self.roster.clone();
        let prober = Arc::clone(&self.prober);
        let timeout = self.timeout;

        match tokio::spawn(async move { sweep(&roster, prober, timeout).await }).await {
            Ok(mut summary) => {
                let previous = self.state_tx.borrow().summary().cloned();
                if let Some(previous) = previous {
                    summary.carry_last_seen(&previous);
                }
                let summary = Arc::new(summary);
                self.sweeps.fetch_add(1, Ordering::Relaxed);
                self.state_tx
                    .send_replace(LivenessState::Ready(Arc::clone(&summary)));
                Some(summary)
            }
            Err(e) => {
                error!(error = %e, "sweep failed, keeping last summary");
                None
            }
        }
    }
}

/// Periodically sweeps the roster and exposes the latest summary.
pub struct LivenessMonitor {
    ctx: SweepContext,
    slot: Mutex<Option<MonitorSlot>>,
}

impl LivenessMonitor {
    /// Create a monitor. Nothing runs until `start`.
    pub fn new(roster: Roster, prober: Arc<dyn Prober>, timeout: Duration) -> Self {
        let (state_tx, _) = watch::channel(LivenessState::Initializing);
        Self {
            ctx: SweepContext {
                roster,
                prober,
                timeout,
                state_tx: Arc::new(state_tx),
                sweeps: Arc::new(AtomicU64::new(0)),
                gate: Arc::new(Mutex::new(())),
            },
            slot: Mutex::new(None),
        }
    }

    /// Start sweeping: once immediately, then every `interval`.
    ///
    /// Starting a running monitor replaces its loop. The old loop is
    /// told to stop but any sweep it has in flight still completes and
    /// publishes before the new loop's first sweep.
    pub async fn start(&self, interval: Duration) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let ctx = self.ctx.clone();
        let refresh = Arc::new(Notify::new());
        let loop_refresh = Arc::clone(&refresh);

        let handle = tokio::spawn(async move {
            run_sweep_loop(ctx, interval, loop_refresh, shutdown_rx).await;
        });

        let mut slot = self.slot.lock().await;
        if let Some(old) = slot.replace(MonitorSlot {
            handle,
            shutdown_tx,
            refresh,
        }) {
            let _ = old.shutdown_tx.send(true);
            debug!("previous sweep loop replaced");
        }

        info!(
            devices = self.ctx.roster.len(),
            interval_ms = interval.as_millis() as u64,
            timeout_ms = self.ctx.timeout.as_millis() as u64,
            "liveness monitor started"
        );
    }

    /// Stop scheduling sweeps and wait for the loop to exit.
    ///
    /// A sweep already running is allowed to finish and publish.
    pub async fn stop(&self) {
        let slot = self.slot.lock().await.take();
        if let Some(slot) = slot {
            let _ = slot.shutdown_tx.send(true);
            if let Err(e) = slot.handle.await {
                error!(error = %e, "sweep loop ended abnormally");
            }
            info!("liveness monitor stopped");
        }
    }

    /// Whether the background loop is running.
    pub async fn is_running(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    /// Ask the running loop for a sweep now. Coalesces with any pending
    /// request and never overlaps a sweep in progress.
    ///
    /// Returns `false` without queueing anything when no loop is running.
    pub async fn request_sweep(&self) -> bool {
        match self.slot.lock().await.as_ref() {
            Some(slot) => {
                slot.refresh.notify_one();
                true
            }
            None => false,
        }
    }

    /// Run one sweep on the caller's task and publish it.
    ///
    /// Waits for any sweep the background loop has in flight.
    pub async fn sweep_now(&self) -> Option<Arc<SweepSummary>> {
        self.ctx.run_once().await
    }

    /// The latest state. Never blocks and never triggers a sweep.
    pub fn latest(&self) -> LivenessState {
        self.ctx.state_tx.borrow().clone()
    }

    /// Receive every newly published state.
    pub fn subscribe(&self) -> watch::Receiver<LivenessState> {
        self.ctx.state_tx.subscribe()
    }

    pub fn roster(&self) -> &Roster {
        &self.ctx.roster
    }

    pub fn timeout(&self) -> Duration {
        self.ctx.timeout
    }

    /// Number of sweeps published since creation.
    pub fn sweeps_completed(&self) -> u64 {
        self.ctx.sweeps.load(Ordering::Relaxed)
    }
}

/// The sweep loop. The first tick fires immediately.
async fn run_sweep_loop(
    ctx: SweepContext,
    interval: Duration,
    refresh: Arc<Notify>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    debug!("sweep loop starting");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => {
                debug!("sweep loop shutting down");
                break;
            }
            _ = ticker.tick() => {}
            _ = refresh.notified() => {
                debug!("on-demand sweep requested");
                ticker.reset();
            }
        }

        ctx.run_once().await;
    }
}
