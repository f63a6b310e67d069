//! Metrics collection and exposition.
//!
//! # Metrics
//! - `pult_mutations_total` (counter): directory mutations by op and outcome
//! - `pult_reloads_total` (counter): proxy restarts by outcome
//! - `pult_reload_duration_seconds` (histogram): restart latency
//! - `pult_subscriptions_total` (counter): subscription renders by outcome
//! - `pult_directory_users` (gauge): unique ids after the last commit
//!
//! Recording is a no-op until a recorder is installed, so tests need no setup.

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_mutation(op: &'static str, outcome: &'static str) {
    counter!("pult_mutations_total", "op" => op, "outcome" => outcome).increment(1);
}

pub fn record_reload(outcome: &'static str, start: Instant) {
    counter!("pult_reloads_total", "outcome" => outcome).increment(1);
    histogram!("pult_reload_duration_seconds").record(start.elapsed().as_secs_f64());
}

pub fn record_subscription(outcome: &'static str) {
    counter!("pult_subscriptions_total", "outcome" => outcome).increment(1);
}

pub fn record_directory_size(users: usize) {
    gauge!("pult_directory_users").set(users as f64);
}
