//! Metrics collection and exposition.
//!
//! # Metrics
//! - `tracing_filter_requests_total` (counter): requests by `outcome` (traced, bypassed) and bypass `reason`
//! - `tracing_filter_faults_total` (counter): contained tracing faults by `site`
//! - `tracing_filter_application_errors_total` (counter): errors returned by the wrapped application

use std::net::SocketAddr;

use metrics::counter;
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::filter::FaultSite;

pub const REQUESTS_TOTAL: &str = "tracing_filter_requests_total";
pub const FAULTS_TOTAL: &str = "tracing_filter_faults_total";
pub const APPLICATION_ERRORS_TOTAL: &str = "tracing_filter_application_errors_total";

/// Install the Prometheus recorder and its HTTP listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Count a request that was traced.
pub fn record_traced() {
    counter!(REQUESTS_TOTAL, "outcome" => "traced").increment(1);
}

/// Count a request that skipped tracing, by reason.
pub fn record_bypassed(reason: &'static str) {
    counter!(REQUESTS_TOTAL, "outcome" => "bypassed", "reason" => reason).increment(1);
}

/// Count a contained tracer fault.
pub fn record_fault(site: FaultSite) {
    counter!(FAULTS_TOTAL, "site" => site.as_str()).increment(1);
}

/// Count an error returned by the application.
pub fn record_application_error() {
    counter!(APPLICATION_ERRORS_TOTAL).increment(1);
}
