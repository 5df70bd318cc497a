//! Prometheus text exposition format.
//!
//! Renders the latest sweep summary for scraping by a Prometheus server
//! or compatible agent. Before the first sweep only the initializing
//! gauge carries a sample.

use std::fmt::Write;

use printwatch_health::{StatusTier, SweepSummary};

const TIERS: [StatusTier; 3] = [StatusTier::Full, StatusTier::Partial, StatusTier::Degraded];

/// Render the latest summary (if any) into Prometheus text format.
pub fn render_prometheus(summary: Option<&SweepSummary>) -> String {
    let mut out = String::new();

    out.push_str("# HELP printwatch_initializing 1 until the first sweep completes.\n");
    out.push_str("# TYPE printwatch_initializing gauge\n");
    let _ = writeln!(out, "printwatch_initializing {}", u8::from(summary.is_none()));

    out.push_str("# HELP printwatch_printers_online Printers that answered in the last sweep.\n");
    out.push_str("# TYPE printwatch_printers_online gauge\n");
    if let Some(s) = summary {
        let _ = writeln!(out, "printwatch_printers_online {}", s.online_count);
    }

    out.push_str("# HELP printwatch_printers_total Printers in the roster.\n");
    out.push_str("# TYPE printwatch_printers_total gauge\n");
    if let Some(s) = summary {
        let _ = writeln!(out, "printwatch_printers_total {}", s.total_count);
    }

    out.push_str("# HELP printwatch_status_tier Current fleet status tier (1 for the active tier).\n");
    out.push_str("# TYPE printwatch_status_tier gauge\n");
    if let Some(s) = summary {
        for tier in TIERS {
            let _ = writeln!(
                out,
                "printwatch_status_tier{{tier=\"{}\"}} {}",
                tier,
                u8::from(s.status_tier == tier)
            );
        }
    }

    out.push_str("# HELP printwatch_printer_up Whether the printer answered (1) or not (0).\n");
    out.push_str("# TYPE printwatch_printer_up gauge\n");
    if let Some(s) = summary {
        for r in &s.results {
            let _ = writeln!(
                out,
                "printwatch_printer_up{{id=\"{}\",address=\"{}\",location=\"{}\"}} {}",
                escape_label(&r.device_id),
                escape_label(&r.address),
                escape_label(&r.location),
                u8::from(r.reachable)
            );
        }
    }

    out.push_str("# HELP printwatch_printer_probe_error Whether the probe itself failed to run.\n");
    out.push_str("# TYPE printwatch_printer_probe_error gauge\n");
    if let Some(s) = summary {
        for r in &s.results {
            let _ = writeln!(
                out,
                "printwatch_printer_probe_error{{id=\"{}\",address=\"{}\"}} {}",
                escape_label(&r.device_id),
                escape_label(&r.address),
                u8::from(r.error.is_some())
            );
        }
    }

    out.push_str("# HELP printwatch_printer_last_seen_timestamp_seconds Last time the printer answered.\n");
    out.push_str("# TYPE printwatch_printer_last_seen_timestamp_seconds gauge\n");
    if let Some(s) = summary {
        for r in &s.results {
            if let Some(seen) = r.last_seen {
                let _ = writeln!(
                    out,
                    "printwatch_printer_last_seen_timestamp_seconds{{id=\"{}\",address=\"{}\"}} {}",
                    escape_label(&r.device_id),
                    escape_label(&r.address),
                    seen.timestamp()
                );
            }
        }
    }

    out.push_str("# HELP printwatch_last_sweep_timestamp_seconds Completion time of the last sweep.\n");
    out.push_str("# TYPE printwatch_last_sweep_timestamp_seconds gauge\n");
    if let Some(s) = summary {
        let _ = writeln!(
            out,
            "printwatch_last_sweep_timestamp_seconds {}",
            s.completed_at.timestamp()
        );
    }

    out
}

fn escape_label(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}
