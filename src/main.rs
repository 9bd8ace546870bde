use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use rentd::engine::BookingService;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let metrics_port: Option<u16> = std::env::var("RENTD_METRICS_PORT")
        .ok()
        .and_then(|s| s.parse().ok());
    rentd::observability::init(metrics_port);

    let port = std::env::var("RENTD_PORT").unwrap_or_else(|_| "3000".into());
    let bind = std::env::var("RENTD_BIND").unwrap_or_else(|_| "0.0.0.0".into());

    let service = Arc::new(BookingService::new());
    let app = rentd::api::router(service);

    let addr = format!("{bind}:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("rentd listening on {addr}");
    info!(
        "  metrics: {}",
        metrics_port.map_or("disabled".to_string(), |p| format!(
            "http://0.0.0.0:{p}/metrics"
        ))
    );

    // Stop accepting on SIGTERM/ctrl-c, drain in-flight requests.
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("rentd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to register SIGTERM handler");
        tokio::select! {
            _ = ctrl_c => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
    }
}
