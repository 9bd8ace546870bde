use std::net::SocketAddr;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: items listed in the catalog.
pub const ITEMS_TOTAL: &str = "rentd_items_total";

/// Counter: rentals accepted.
pub const BOOKINGS_TOTAL: &str = "rentd_bookings_total";

/// Counter: rental requests rejected because the range was taken.
pub const BOOKING_CONFLICTS_TOTAL: &str = "rentd_booking_conflicts_total";

/// Counter: rentals returned.
pub const CANCELLATIONS_TOTAL: &str = "rentd_cancellations_total";

// ── USE metrics (resource utilization) ──────────────────────────

/// Gauge: rentals currently outstanding across all items.
pub const BOOKINGS_ACTIVE: &str = "rentd_bookings_active";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
