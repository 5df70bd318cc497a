//! printwatchd — the printer liveness daemon.
//!
//! Single binary that assembles the monitor:
//! - Configuration (printwatch.toml + CLI overrides)
//! - Device roster
//! - Liveness monitor (periodic sweep)
//! - REST API + Prometheus exposition
//!
//! # Usage
//!
//! ```text
//! printwatchd serve --config /etc/printwatch/printwatch.toml
//! printwatchd check --method tcp --timeout 2s
//! ```

mod settings;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use tracing::{info, warn};

use printwatch_core::{ProbeMethod, Roster};
use printwatch_health::{prober_for, LivenessMonitor};

use crate::settings::Settings;

const DEFAULT_LOG_FILTER: &str =
    "info,printwatchd=debug,printwatch_core=debug,printwatch_health=debug,printwatch_api=debug";

#[derive(Parser)]
#[command(name = "printwatchd", about = "Printer fleet liveness monitor")]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sweep the roster on a timer and serve the status API.
    Serve {
        #[command(flatten)]
        overrides: Overrides,

        /// Address for the HTTP API.
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Time between sweeps (e.g. "30s", "5m").
        #[arg(long, value_parser = parse_duration_arg)]
        interval: Option<Duration>,
    },
    /// Run a single sweep, print the summary as JSON and exit.
    Check {
        #[command(flatten)]
        overrides: Overrides,
    },
}

/// Options shared by every subcommand.
#[derive(Args, Clone)]
struct Overrides {
    /// Path to printwatch.toml.
    #[arg(long, default_value = "printwatch.toml")]
    config: PathBuf,

    /// Per-probe timeout (e.g. "3s", "500ms").
    #[arg(long, value_parser = parse_duration_arg)]
    timeout: Option<Duration>,

    /// Probe method: icmp or tcp.
    #[arg(long)]
    method: Option<ProbeMethod>,
}

fn parse_duration_arg(s: &str) -> Result<Duration, String> {
    match printwatch_core::parse_duration(s) {
        Some(d) if !d.is_zero() => Ok(d),
        _ => Err(format!("invalid duration: {s:?}")),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.command {
        Command::Serve {
            overrides,
            bind,
            interval,
        } => {
            let mut settings = Settings::load(&overrides.config, overrides.timeout, overrides.method)?;
            if let Some(bind) = bind {
                settings.bind = bind;
            }
            if let Some(interval) = interval {
                settings.interval = interval;
            }
            run_serve(settings).await
        }
        Command::Check { overrides } => {
            let settings = Settings::load(&overrides.config, overrides.timeout, overrides.method)?;
            run_check(settings).await
        }
    }
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    if json {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Log roster anomalies. They are kept as-is.
fn audit_roster(roster: &Roster) {
    for id in roster.duplicate_ids() {
        warn!(%id, "printer id appears more than once in the roster");
    }
    for device in roster.invalid_addresses() {
        warn!(id = %device.id, address = %device.address, "printer address is not ipv4, it will always be offline");
    }
}

fn build_monitor(settings: &Settings) -> LivenessMonitor {
    let prober = prober_for(settings.method, settings.tcp_port);
    LivenessMonitor::new(settings.roster.clone(), prober, settings.timeout)
}

async fn run_serve(settings: Settings) -> anyhow::Result<()> {
    info!("printwatch daemon starting");
    audit_roster(&settings.roster);

    // ── Liveness monitor ───────────────────────────────────────

    let monitor = Arc::new(build_monitor(&settings));
    info!(
        printers = settings.roster.len(),
        method = %settings.method,
        "liveness monitor initialized"
    );
    monitor.start(settings.interval).await;

    // ── Start API server ───────────────────────────────────────

    let router = printwatch_api::build_router(monitor.clone());
    info!(addr = %settings.bind, "API server starting");

    let listener = tokio::net::TcpListener::bind(settings.bind).await?;

    // Graceful shutdown on Ctrl-C.
    let server = axum::serve(listener, router).with_graceful_shutdown(async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
        info!("shutdown signal received");
    });

    server.await?;

    monitor.stop().await;

    info!("printwatch daemon stopped");
    Ok(())
}

async fn run_check(settings: Settings) -> anyhow::Result<()> {
    audit_roster(&settings.roster);

    let monitor = build_monitor(&settings);
    let summary = monitor
        .sweep_now()
        .await
        .ok_or_else(|| anyhow::anyhow!("sweep did not complete"))?;

    println!("{}", serde_json::to_string_pretty(summary.as_ref())?);
    Ok(())
}
