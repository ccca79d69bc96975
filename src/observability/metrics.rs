//! Metrics collection and exposition.
//!
//! # Metrics
//! - `dust_stake_flow_steps_total` (counter): flow steps entered, by step
//! - `dust_stake_flow_outcomes_total` (counter): finished flows, by outcome
//! - `dust_stake_arrival_polls_total` (counter): balance polls, by result
//! - `dust_stake_arrival_wait_seconds` (histogram): time until funds arrived
//! - `dust_stake_rpc_failures_total` (counter): exhausted RPC calls, by chain
//! - `dust_stake_chain_health` (gauge): 1=healthy, 0=unhealthy, by chain
//!
//! # Design Decisions
//! - Recording is a no-op unless an exporter is installed
//! - Prometheus exporter is opt-in via `observability.metrics_enabled`

use std::net::SocketAddr;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter listening on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_flow_step(step: &'static str) {
    counter!("dust_stake_flow_steps_total", "step" => step).increment(1);
}

pub fn record_flow_outcome(outcome: &'static str) {
    counter!("dust_stake_flow_outcomes_total", "outcome" => outcome).increment(1);
}

pub fn record_arrival_poll(result: &'static str) {
    counter!("dust_stake_arrival_polls_total", "result" => result).increment(1);
}

pub fn record_arrival_wait(seconds: f64) {
    histogram!("dust_stake_arrival_wait_seconds").record(seconds);
}

pub fn record_rpc_failure(chain: &'static str, operation: &str) {
    counter!(
        "dust_stake_rpc_failures_total",
        "chain" => chain,
        "operation" => operation.to_string()
    )
    .increment(1);
}

pub fn record_chain_health(chain: &'static str, healthy: bool) {
    gauge!("dust_stake_chain_health", "chain" => chain).set(if healthy { 1.0 } else { 0.0 });
}
