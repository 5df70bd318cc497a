//! Single-device reachability probes.
//!
//! A probe answers one question: did the printer respond within the
//! timeout? `Ok(false)` covers every transport-level "no" (timeout, no
//! route, malformed address). `Err` is reserved for a probe that could
//! not run at all, such as a missing `ping` binary.

use std::future::Future;
use std::io;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::process::Command;
use tracing::debug;

use printwatch_core::ProbeMethod;

use crate::error::{ProbeError, ProbeResult};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Checks whether one address is reachable.
///
/// Implementations must resolve within `timeout` and must not retry.
pub trait Prober: Send + Sync {
    fn probe<'a>(&'a self, address: &'a str, timeout: Duration) -> BoxFuture<'a, ProbeResult<bool>>;
}

/// Build the prober selected in configuration.
pub fn prober_for(method: ProbeMethod, tcp_port: u16) -> Arc<dyn Prober> {
    match method {
        ProbeMethod::Icmp => Arc::new(IcmpProber::new()),
        ProbeMethod::Tcp => Arc::new(TcpProber::new(tcp_port)),
    }
}

fn parse_ipv4(address: &str) -> Option<Ipv4Addr> {
    address.trim().parse().ok()
}

// ── ICMP ───────────────────────────────────────────────────────

/// One ICMP echo request through the system `ping` utility.
#[derive(Debug, Clone)]
pub struct IcmpProber {
    program: String,
}

impl IcmpProber {
    pub fn new() -> Self {
        Self::with_program("ping")
    }

    /// Use a specific ping executable.
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    async fn ping(&self, address: &str, timeout: Duration) -> ProbeResult<bool> {
        let Some(ip) = parse_ipv4(address) else {
            debug!(%address, "not an ipv4 address, treating as unreachable");
            return Ok(false);
        };

        let mut child = Command::new(&self.program)
            .args(ping_args(ip, timeout))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProbeError::Unavailable(format!("cannot run {}: {e}", self.program)))?;

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => {
                debug!(%ip, code = ?status.code(), "ping finished");
                Ok(status.success())
            }
            Ok(Err(e)) => Err(ProbeError::Io(e)),
            Err(_) => {
                debug!(%ip, "ping timed out");
                let _ = child.start_kill();
                Ok(false)
            }
        }
    }
}

impl Default for IcmpProber {
    fn default() -> Self {
        Self::new()
    }
}

impl Prober for IcmpProber {
    fn probe<'a>(&'a self, address: &'a str, timeout: Duration) -> BoxFuture<'a, ProbeResult<bool>> {
        Box::pin(self.ping(address, timeout))
    }
}

#[cfg(not(windows))]
fn ping_args(ip: Ipv4Addr, timeout: Duration) -> Vec<String> {
    // -W takes whole seconds on iputils.
    let secs = timeout.as_secs_f64().ceil().max(1.0) as u64;
    vec![
        "-c".to_string(),
        "1".to_string(),
        "-W".to_string(),
        secs.to_string(),
        ip.to_string(),
    ]
}

#[cfg(windows)]
fn ping_args(ip: Ipv4Addr, timeout: Duration) -> Vec<String> {
    vec![
        "-n".to_string(),
        "1".to_string(),
        "-w".to_string(),
        timeout.as_millis().max(1).to_string(),
        ip.to_string(),
    ]
}

// ── TCP ────────────────────────────────────────────────────────

/// TCP connect probe.
///
/// A refused connection still counts as reachable: the host answered
/// with a reset, so it is on the network.
#[derive(Debug, Clone, Copy)]
pub struct TcpProber {
    port: u16,
}

impl TcpProber {
    pub fn new(port: u16) -> Self {
        Self { port }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    async fn connect(&self, address: &str, timeout: Duration) -> ProbeResult<bool> {
        let Some(ip) = parse_ipv4(address) else {
            debug!(%address, "not an ipv4 address, treating as unreachable");
            return Ok(false);
        };
        let target = SocketAddrV4::new(ip, self.port);

        match tokio::time::timeout(timeout, TcpStream::connect(target)).await {
            Ok(Ok(_stream)) => Ok(true),
            Ok(Err(e)) if e.kind() == io::ErrorKind::ConnectionRefused => {
                debug!(%target, "connection refused, host is up");
                Ok(true)
            }
            Ok(Err(e)) if is_transport_failure(&e) => {
                debug!(%target, error = %e, "tcp probe failed");
                Ok(false)
            }
            Ok(Err(e)) => Err(ProbeError::Io(e)),
            Err(_) => {
                debug!(%target, "tcp probe timed out");
                Ok(false)
            }
        }
    }
}

impl Prober for TcpProber {
    fn probe<'a>(&'a self, address: &'a str, timeout: Duration) -> BoxFuture<'a, ProbeResult<bool>> {
        Box::pin(self.connect(address, timeout))
    }
}

fn is_transport_failure(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::TimedOut
            | io::ErrorKind::HostUnreachable
            | io::ErrorKind::NetworkUnreachable
            | io::ErrorKind::NetworkDown
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::PermissionDenied
    )
}
