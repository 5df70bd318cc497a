//! Fleet status tiers.
//!
//! The tier drives the dashboard badge colour. Thresholds are fixed,
//! not proportional to the roster size.

use std::fmt;

use serde::{Deserialize, Serialize};

/// More than this many printers online (but not all) is `Partial`.
pub const PARTIAL_THRESHOLD: usize = 10;

/// Coarse health of the whole fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusTier {
    /// Every printer answered.
    Full,
    /// Some printers are down, more than `PARTIAL_THRESHOLD` are up.
    Partial,
    /// `PARTIAL_THRESHOLD` or fewer printers are up.
    Degraded,
}

impl StatusTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Partial => "partial",
            Self::Degraded => "degraded",
        }
    }

    /// Badge colour shown on the dashboard.
    pub fn color(&self) -> &'static str {
        match self {
            Self::Full => "green",
            Self::Partial => "orange",
            Self::Degraded => "red",
        }
    }
}

impl fmt::Display for StatusTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a sweep by its online count.
///
/// Rules are checked in order: all online is `Full`, then more than
/// `PARTIAL_THRESHOLD` online is `Partial`, otherwise `Degraded`.
/// An empty roster counts as all online.
pub fn classify(online_count: usize, total_count: usize) -> StatusTier {
    if online_count == total_count {
        StatusTier::Full
    } else if online_count > PARTIAL_THRESHOLD {
        StatusTier::Partial
    } else {
        StatusTier::Degraded
    }
}
