//! Roster sweep: probe every device concurrently and summarize.
//!
//! Every device gets its own task. The sweep waits for all of them to
//! settle and then maps outcomes back to devices by position, so the
//! result order always matches the roster no matter which probe
//! finishes first.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, error, info, warn};

use printwatch_core::{Device, Roster};

use crate::classifier::{classify, StatusTier};
use crate::error::ProbeResult;
use crate::prober::Prober;

/// Outcome of probing one device in one sweep.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LivenessResult {
    pub device_id: String,
    pub address: String,
    pub location: String,
    pub reachable: bool,
    pub checked_at: DateTime<Utc>,
    /// Last time this device answered, across the monitor's sweeps.
    /// `None` until it has answered once.
    #[serde(default)]
    pub last_seen: Option<DateTime<Utc>>,
    /// Set when the check itself could not be completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of one complete pass over the roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SweepSummary {
    /// One entry per roster device, in roster order.
    pub results: Vec<LivenessResult>,
    pub online_count: usize,
    pub total_count: usize,
    pub status_tier: StatusTier,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl SweepSummary {
    pub fn offline_count(&self) -> usize {
        self.total_count - self.online_count
    }

    /// All results for `device_id`. Ids may repeat within a roster.
    pub fn find(&self, device_id: &str) -> Vec<&LivenessResult> {
        self.results
            .iter()
            .filter(|r| r.device_id == device_id)
            .collect()
    }

    /// Results whose probe could not be completed.
    pub fn errors(&self) -> impl Iterator<Item = &LivenessResult> {
        self.results.iter().filter(|r| r.error.is_some())
    }

    /// Keep `last_seen` from `previous` for devices that did not answer
    /// this time. Results are matched by position and only when the
    /// device at that position is the same one.
    pub fn carry_last_seen(&mut self, previous: &SweepSummary) {
        for (current, prior) in self.results.iter_mut().zip(&previous.results) {
            if current.reachable
                || current.device_id != prior.device_id
                || current.address != prior.address
            {
                continue;
            }
            current.last_seen = prior.last_seen;
        }
    }
}

type Settled = (ProbeResult<bool>, DateTime<Utc>);

/// Probe every device in `roster` and wait for all probes to settle.
///
/// Each probe is bounded by `timeout`; one that overruns is recorded as
/// unreachable without an error. A probe error or panic is recorded as
/// unreachable with the error message kept.
pub async fn sweep(roster: &Roster, prober: Arc<dyn Prober>, timeout: Duration) -> SweepSummary {
    let started_at = Utc::now();
    let clock = Instant::now();

    let handles: Vec<JoinHandle<Settled>> = roster
        .list()
        .iter()
        .map(|device| {
            let prober = Arc::clone(&prober);
            let address = device.address.clone();
            tokio::spawn(async move {
                let outcome = match tokio::time::timeout(timeout, prober.probe(&address, timeout)).await {
                    Ok(outcome) => outcome,
                    Err(_) => Ok(false),
                };
                (outcome, Utc::now())
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (device, handle) in roster.list().iter().zip(handles) {
        results.push(settle(device, handle.await));
    }

    let online_count = results.iter().filter(|r| r.reachable).count();
    let total_count = results.len();
    let status_tier = classify(online_count, total_count);

    info!(
        online = online_count,
        total = total_count,
        tier = %status_tier,
        elapsed_ms = clock.elapsed().as_millis() as u64,
        "sweep completed"
    );

    SweepSummary {
        results,
        online_count,
        total_count,
        status_tier,
        started_at,
        completed_at: Utc::now(),
    }
}

/// Fold a joined probe task into a result for `device`.
fn settle(device: &Device, joined: Result<Settled, JoinError>) -> LivenessResult {
    let (reachable, error, checked_at) = match joined {
        Ok((Ok(reachable), at)) => {
            debug!(device = %device.id, address = %device.address, reachable, "probe settled");
            (reachable, None, at)
        }
        Ok((Err(e), at)) => {
            warn!(device = %device.id, address = %device.address, error = %e, "probe could not run");
            (false, Some(e.to_string()), at)
        }
        Err(e) => {
            error!(device = %device.id, address = %device.address, error = %e, "probe task failed");
            (false, Some(format!("probe task failed: {e}")), Utc::now())
        }
    };

    LivenessResult {
        device_id: device.id.clone(),
        address: device.address.clone(),
        location: device.location.clone(),
        reachable,
        checked_at,
        last_seen: reachable.then_some(checked_at),
        error,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Script, ScriptedProber, SlowProber};

    fn roster_of(n: usize) -> Roster {
        Roster::new(
            (0..n)
                .map(|i| Device::new(&format!("PHARI{i:03}"), &format!("10.10.64.{i}"), "PLANTA"))
                .collect(),
        )
    }

    fn scripted(scripts: Vec<(&str, Script)>) -> Arc<dyn Prober> {
        Arc::new(ScriptedProber::new(scripts))
    }

    #[tokio::test]
    async fn empty_roster() {
        let summary = sweep(&Roster::default(), scripted(vec![]), Duration::from_millis(100)).await;
        assert!(summary.results.is_empty());
        assert_eq!(summary.online_count, 0);
        assert_eq!(summary.total_count, 0);
        assert_eq!(summary.status_tier, StatusTier::Full);
    }

    #[tokio::test]
    async fn all_online() {
        let roster = roster_of(5);
        let prober = scripted(
            roster
                .list()
                .iter()
                .map(|d| (d.address.as_str(), Script::Up))
                .collect(),
        );

        let summary = sweep(&roster, prober, Duration::from_secs(1)).await;
        assert_eq!(summary.online_count, 5);
        assert_eq!(summary.total_count, 5);
        assert_eq!(summary.offline_count(), 0);
        assert_eq!(summary.status_tier, StatusTier::Full);
        assert!(summary.results.iter().all(|r| r.error.is_none()));
    }

    #[tokio::test]
    async fn result_count_matches_roster_despite_failures() {
        let roster = roster_of(6);
        let prober = scripted(vec![
            ("10.10.64.0", Script::Up),
            ("10.10.64.1", Script::Fail),
            ("10.10.64.2", Script::Panic),
            ("10.10.64.3", Script::Hang),
            ("10.10.64.4", Script::Down),
            ("10.10.64.5", Script::Up),
        ]);

        let summary = sweep(&roster, prober, Duration::from_millis(200)).await;
        assert_eq!(summary.results.len(), 6);
        assert_eq!(summary.total_count, 6);
        assert_eq!(summary.online_count, 2);
        for (device, result) in roster.list().iter().zip(&summary.results) {
            assert_eq!(result.device_id, device.id);
        }
    }

    #[tokio::test]
    async fn results_follow_roster_order_not_completion_order() {
        let roster = roster_of(5);
        // Earlier devices answer later.
        let scripts: Vec<(String, Script)> = roster
            .list()
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let delay = Duration::from_millis(20 * (5 - i as u64));
                (d.address.clone(), Script::After(delay, i % 2 == 0))
            })
            .collect();
        let prober = scripted(scripts.iter().map(|(a, s)| (a.as_str(), *s)).collect());

        let summary = sweep(&roster, prober, Duration::from_secs(1)).await;
        let ids: Vec<_> = summary.results.iter().map(|r| r.device_id.as_str()).collect();
        let expected: Vec<_> = roster.list().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, expected);

        let reachable: Vec<_> = summary.results.iter().map(|r| r.reachable).collect();
        assert_eq!(reachable, vec![true, false, true, false, true]);
    }

    #[tokio::test]
    async fn probe_error_is_kept_and_counts_offline() {
        let roster = roster_of(2);
        let prober = scripted(vec![("10.10.64.0", Script::Fail), ("10.10.64.1", Script::Up)]);

        let summary = sweep(&roster, prober, Duration::from_secs(1)).await;
        let failed = &summary.results[0];
        assert!(!failed.reachable);
        assert!(failed.error.as_deref().unwrap().contains("scripted failure"));
        assert!(summary.results[1].reachable);
        assert_eq!(summary.errors().count(), 1);
    }

    #[tokio::test]
    async fn panicking_probe_is_isolated() {
        let roster = roster_of(4);
        let prober = scripted(vec![
            ("10.10.64.0", Script::Up),
            ("10.10.64.1", Script::Panic),
            ("10.10.64.2", Script::Up),
            ("10.10.64.3", Script::Up),
        ]);

        let summary = sweep(&roster, prober, Duration::from_secs(1)).await;
        assert_eq!(summary.online_count, 3);
        let panicked = &summary.results[1];
        assert!(!panicked.reachable);
        assert!(panicked.error.as_deref().unwrap().contains("probe task failed"));
    }

    #[tokio::test]
    async fn hanging_probe_times_out_as_unreachable() {
        let roster = roster_of(2);
        let prober = scripted(vec![("10.10.64.0", Script::Hang), ("10.10.64.1", Script::Up)]);
        let timeout = Duration::from_millis(100);

        let started = Instant::now();
        let summary = sweep(&roster, prober, timeout).await;
        assert!(started.elapsed() < timeout + Duration::from_millis(900));

        let hung = &summary.results[0];
        assert!(!hung.reachable);
        assert!(hung.error.is_none());
        assert!(summary.results[1].reachable);
    }

    #[tokio::test]
    async fn probes_run_concurrently() {
        let roster = roster_of(20);
        let prober: Arc<dyn Prober> = Arc::new(SlowProber {
            delay: Duration::from_millis(100),
            up: true,
        });

        let started = Instant::now();
        let summary = sweep(&roster, prober, Duration::from_secs(1)).await;
        // Sequential probing would take two seconds.
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(summary.online_count, 20);
    }

    #[tokio::test]
    async fn duplicate_ids_are_kept() {
        let roster = Roster::new(vec![
            Device::new("PHARI064", "10.10.64.30", "SISTEMAS"),
            Device::new("PHARI064", "10.10.64.202", "SOBREROTULADO"),
        ]);
        let prober = scripted(vec![("10.10.64.30", Script::Up)]);

        let summary = sweep(&roster, prober, Duration::from_secs(1)).await;
        let found = summary.find("PHARI064");
        assert_eq!(found.len(), 2);
        assert!(found[0].reachable);
        assert!(!found[1].reachable);
        assert_eq!(found[1].location, "SOBREROTULADO");
    }

    #[tokio::test]
    async fn classifies_large_fleet() {
        let roster = roster_of(30);
        let up: Vec<_> = roster
            .list()
            .iter()
            .take(11)
            .map(|d| (d.address.as_str(), Script::Up))
            .collect();

        let summary = sweep(&roster, scripted(up), Duration::from_secs(1)).await;
        assert_eq!(summary.online_count, 11);
        assert_eq!(summary.status_tier, StatusTier::Partial);
    }

    #[tokio::test]
    async fn last_seen_carries_over_offline_devices() {
        let roster = roster_of(3);
        let before = sweep(
            &roster,
            scripted(vec![("10.10.64.0", Script::Up), ("10.10.64.1", Script::Up)]),
            Duration::from_secs(1),
        )
        .await;
        assert!(before.results[0].last_seen.is_some());
        assert!(before.results[2].last_seen.is_none());

        let mut after = sweep(&roster, scripted(vec![("10.10.64.1", Script::Up)]), Duration::from_secs(1)).await;
        assert!(after.results[0].last_seen.is_none());
        after.carry_last_seen(&before);

        // Offline now, answered before.
        assert_eq!(after.results[0].last_seen, before.results[0].last_seen);
        // Online now: its own check time wins.
        assert_eq!(after.results[1].last_seen, Some(after.results[1].checked_at));
        // Never answered.
        assert_eq!(after.results[2].last_seen, None);
    }

    #[tokio::test]
    async fn last_seen_not_carried_across_different_devices() {
        let before = sweep(&roster_of(1), scripted(vec![("10.10.64.0", Script::Up)]), Duration::from_secs(1)).await;

        let other = Roster::new(vec![Device::new("PHARI099", "10.10.64.0", "PLANTA")]);
        let mut after = sweep(&other, scripted(vec![]), Duration::from_secs(1)).await;
        after.carry_last_seen(&before);
        assert_eq!(after.results[0].last_seen, None);
    }

    #[tokio::test]
    async fn summary_serializes_without_empty_errors() {
        let roster = roster_of(1);
        let summary = sweep(&roster, scripted(vec![("10.10.64.0", Script::Up)]), Duration::from_secs(1)).await;
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status_tier"], "full");
        assert!(json["results"][0].get("error").is_none());
        assert_eq!(json["results"][0]["device_id"], "PHARI000");
    }
}
