//! printwatch-health — printer reachability sweeps.
//!
//! Probes every printer in the roster concurrently, folds the outcomes
//! into a `SweepSummary`, classifies the fleet into a status tier and
//! keeps the latest summary available to readers.
//!
//! # Architecture
//!
//! ```text
//! LivenessMonitor
//!   ├── background loop (immediate sweep, then every `interval`)
//!   │   └── sweep(roster, prober, timeout)
//!   │       ├── one task per device → Prober::probe() → bool
//!   │       ├── join in roster order (settle-all)
//!   │       └── classify(online, total) → StatusTier
//!   └── watch channel holding LivenessState (Initializing | Ready)
//! ```
//!
//! A device whose probe fails, hangs or panics is recorded as unreachable;
//! it never aborts the sweep or the loop.

pub mod classifier;
pub mod error;
pub mod monitor;
pub mod prober;
pub mod sweep;

#[cfg(test)]
mod test_support;

pub use classifier::{classify, StatusTier, PARTIAL_THRESHOLD};
pub use error::{ProbeError, ProbeResult};
pub use monitor::{LivenessMonitor, LivenessState};
pub use prober::{prober_for, BoxFuture, IcmpProber, Prober, TcpProber};
pub use sweep::{sweep, LivenessResult, SweepSummary};
