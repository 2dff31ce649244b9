//! Metrics collection and exposition.
//!
//! # Metrics
//! - `checkin_outcomes_total` (counter): attempts by `outcome` label
//! - `checkin_rpc_failures_total` (counter): failed provider calls by `operation`
//! - `checkin_wallets` (gauge): wallets managed by the scheduler
//! - `checkin_cycle_duration_seconds` (histogram): wall time of one cycle
//!
//! Without [`init_metrics`] the macros record into a no-op recorder.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Start the Prometheus exporter on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            metrics::describe_counter!("checkin_outcomes_total", "Check-in attempts by outcome");
            metrics::describe_counter!("checkin_rpc_failures_total", "Failed RPC provider calls");
            metrics::describe_gauge!("checkin_wallets", "Wallets managed by the scheduler");
            metrics::describe_histogram!(
                "checkin_cycle_duration_seconds",
                metrics::Unit::Seconds,
                "Duration of one check-in cycle"
            );
            tracing::info!(address = %addr, "Metrics exporter listening");
        }
        Err(e) => {
            tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter")
        }
    }
}

pub fn record_outcome(outcome: &'static str) {
    metrics::counter!("checkin_outcomes_total", "outcome" => outcome).increment(1);
}

pub fn record_rpc_failure(operation: &'static str) {
    metrics::counter!("checkin_rpc_failures_total", "operation" => operation).increment(1);
}

pub fn set_wallets(count: usize) {
    metrics::gauge!("checkin_wallets").set(count as f64);
}

pub fn record_cycle(elapsed: Duration) {
    metrics::histogram!("checkin_cycle_duration_seconds").record(elapsed.as_secs_f64());
}
