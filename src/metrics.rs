//! Harvest metrics
//!
//! Thin wrappers over the `metrics` facade so call sites stay one line.
//! Nothing is exported unless [`init_metrics`] installs the Prometheus
//! listener; until then every call is a no-op.

use std::net::SocketAddr;

pub fn init_metrics(port: u16) {
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let builder = metrics_exporter_prometheus::PrometheusBuilder::new().with_http_listener(addr);
    match builder.install() {
        Ok(()) => {
            tracing::info!("Prometheus exporter listening on http://{}/metrics", addr);
        }
        Err(e) => {
            tracing::warn!("Prometheus exporter install failed (possibly already installed): {}", e);
        }
    }
}

/// Page role label for fetch counters.
#[derive(Debug, Clone, Copy)]
pub enum PageRole {
    Listing,
    Day,
}

impl PageRole {
    fn label(self) -> &'static str {
        match self {
            PageRole::Listing => "listing",
            PageRole::Day => "day",
        }
    }
}

pub fn page_fetched(role: PageRole) {
    ::metrics::counter!("showtimes_pages_fetched_total", "role" => role.label()).increment(1);
}

pub fn fetch_failed(role: PageRole, kind: &'static str) {
    ::metrics::counter!(
        "showtimes_fetch_errors_total",
        "role" => role.label(),
        "kind" => kind
    )
    .increment(1);
}

pub fn day_skipped() {
    ::metrics::counter!("showtimes_enrichment_days_skipped_total").increment(1);
}

pub fn harvest_finished(venues: usize, items: usize, duration_secs: f64) {
    ::metrics::counter!("showtimes_venues_harvested_total").increment(venues as u64);
    ::metrics::counter!("showtimes_items_harvested_total").increment(items as u64);
    ::metrics::histogram!("showtimes_harvest_duration_seconds").record(duration_secs);
}

pub fn snapshot_written() {
    ::metrics::counter!("showtimes_snapshots_written_total").increment(1);
}

pub fn snapshot_skipped() {
    ::metrics::counter!("showtimes_snapshots_skipped_total").increment(1);
}
