use std::sync::Arc;

use dogwatch_server::dispatch::ContactDispatcher;
use dogwatch_server::escalation::EscalationMonitor;
use dogwatch_server::notifications::TwilioGateway;
use dogwatch_server::store::{IncidentStore, PostgresStore, ResponderDirectory};
use dogwatch_server::worker;
use sea_orm::Database;

#[tokio::main]
async fn main() {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    dogwatch_server::telemetry::init_telemetry("dogwatch-worker");

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    // Metrics endpoint for the scrape target
    tokio::spawn(async move {
        let app = axum::Router::new()
            .route(
                "/metrics",
                axum::routing::get(|| async move { metric_handle.render() }),
            )
            .layer(prometheus_layer);
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], 9091));
        tracing::info!("Metrics server listening on {}", addr);
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        axum::serve(listener, app).await.unwrap();
    });

    // Database Connection
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    let store = PostgresStore::new(db);
    let incidents: Arc<dyn IncidentStore> = Arc::new(store.clone());
    let responders: Arc<dyn ResponderDirectory> = Arc::new(store);
    let gateway = Arc::new(TwilioGateway::from_env());

    let monitor = Arc::new(EscalationMonitor::new(incidents.clone()));
    let dispatcher = Arc::new(ContactDispatcher::new(
        incidents.clone(),
        responders,
        gateway,
    ));

    let interval_secs = std::env::var("SCAN_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3600);

    tracing::info!("Starting escalation worker...");
    worker::start_escalation_worker(monitor, incidents, dispatcher, interval_secs).await;

    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutting down worker process"),
        Err(err) => tracing::error!("Unable to listen for shutdown signal: {}", err),
    }
}
