//! Scripted probers for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{ProbeError, ProbeResult};
use crate::prober::{BoxFuture, Prober};

#[derive(Debug, Clone, Copy)]
pub enum Script {
    Up,
    Down,
    Fail,
    Panic,
    Hang,
    /// Answer after a delay.
    After(Duration, bool),
}

/// Answers per address; unknown addresses are down.
pub struct ScriptedProber {
    scripts: HashMap<String, Script>,
    calls: AtomicUsize,
}

impl ScriptedProber {
    pub fn new<'a>(scripts: impl IntoIterator<Item = (&'a str, Script)>) -> Self {
        Self {
            scripts: scripts
                .into_iter()
                .map(|(addr, s)| (addr.to_string(), s))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Prober for ScriptedProber {
    fn probe<'a>(&'a self, address: &'a str, _timeout: Duration) -> BoxFuture<'a, ProbeResult<bool>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let script = self.scripts.get(address).copied().unwrap_or(Script::Down);
        Box::pin(async move {
            match script {
                Script::Up => Ok(true),
                Script::Down => Ok(false),
                Script::Fail => Err(ProbeError::Unavailable("scripted failure".to_string())),
                Script::Panic => panic!("scripted panic for {address}"),
                Script::Hang => std::future::pending().await,
                Script::After(delay, up) => {
                    tokio::time::sleep(delay).await;
                    Ok(up)
                }
            }
        })
    }
}

/// Always answers `up` after `delay`.
pub struct SlowProber {
    pub delay: Duration,
    pub up: bool,
}

impl Prober for SlowProber {
    fn probe<'a>(&'a self, _address: &'a str, _timeout: Duration) -> BoxFuture<'a, ProbeResult<bool>> {
        Box::pin(async move {
            tokio::time::sleep(self.delay).await;
            Ok::<_, ProbeError>(self.up)
        })
    }
}
