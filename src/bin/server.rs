use std::sync::Arc;

use axum::{
    routing::{get, post},
    Extension, Router,
};
use dogwatch_server::advisory::{
    AdvisoryCache, AdvisoryService, MemoryAdvisoryCache, RedisAdvisoryCache, ADVISORY_CACHE_TTL,
};
use dogwatch_server::dispatch::ContactDispatcher;
use dogwatch_server::escalation::EscalationMonitor;
use dogwatch_server::migrator;
use dogwatch_server::notifications::TwilioGateway;
use dogwatch_server::store::{IncidentStore, PostgresStore, ResourcePool, ResponderDirectory};
use dogwatch_server::triage::TriageOrchestrator;
use dogwatch_server::{api, redis};
use sea_orm::Database;
use std::net::SocketAddr;

#[tokio::main]
async fn main() {
    // Load .env if present (dotenvy)
    dotenvy::dotenv().ok();

    dogwatch_server::telemetry::init_telemetry("dogwatch-server");

    let (prometheus_layer, metric_handle) = axum_prometheus::PrometheusMetricLayer::pair();

    // Database Connection
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let db = Database::connect(&database_url)
        .await
        .expect("Failed to connect to database");

    // Run migrations
    use sea_orm_migration::MigratorTrait;
    migrator::Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    dogwatch_server::metrics::init_metrics(&db).await;

    // Advisory cache: shared (redis) when REDIS_URL is set, process-local
    // otherwise. The content is advisory either way.
    let cache: Arc<dyn AdvisoryCache> = match std::env::var("REDIS_URL") {
        Ok(redis_url) => {
            let redis_client = redis::Client::open(redis_url).expect("Invalid Redis URL");
            Arc::new(RedisAdvisoryCache::new(redis_client, ADVISORY_CACHE_TTL))
        }
        Err(_) => Arc::new(MemoryAdvisoryCache::new(ADVISORY_CACHE_TTL)),
    };

    let store = PostgresStore::new(db.clone());
    let incidents: Arc<dyn IncidentStore> = Arc::new(store.clone());
    let pool: Arc<dyn ResourcePool> = Arc::new(store.clone());
    let responders: Arc<dyn ResponderDirectory> = Arc::new(store);
    let gateway = Arc::new(TwilioGateway::from_env());

    let orchestrator = Arc::new(TriageOrchestrator::new(incidents.clone(), pool));
    let monitor = Arc::new(EscalationMonitor::new(incidents.clone()));
    let dispatcher = Arc::new(ContactDispatcher::new(
        incidents.clone(),
        responders,
        gateway,
    ));
    let advisory = Arc::new(AdvisoryService::new(cache));

    let app = app(
        incidents,
        orchestrator,
        monitor,
        dispatcher,
        advisory,
        prometheus_layer,
        metric_handle,
    );

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8000u16);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn health_check() -> &'static str {
    "OK"
}

#[allow(clippy::too_many_arguments)]
fn app(
    incidents: Arc<dyn IncidentStore>,
    orchestrator: Arc<TriageOrchestrator>,
    monitor: Arc<EscalationMonitor>,
    dispatcher: Arc<ContactDispatcher>,
    advisory: Arc<AdvisoryService>,
    prometheus_layer: axum_prometheus::PrometheusMetricLayer<'static>,
    metric_handle: metrics_exporter_prometheus::PrometheusHandle,
) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/incidents/:id", get(api::incidents::get_incident))
        .route("/incidents/:id/triage", post(api::triage::run_triage))
        .route("/incidents/:id/dispatch", post(api::triage::run_dispatch))
        .route(
            "/incidents/:id/escalation",
            get(api::escalations::check_incident),
        )
        .route(
            "/incidents/:id/recommendations/:rec_id/decision",
            post(api::incidents::decide_recommendation),
        )
        .route("/advisory/suggestions", post(api::advisory::suggest))
        .route(
            "/internal/escalations/scan",
            post(api::escalations::run_scan),
        )
        .layer(Extension(incidents))
        .layer(Extension(orchestrator))
        .layer(Extension(monitor))
        .layer(Extension(dispatcher))
        .layer(Extension(advisory))
        .layer(prometheus_layer)
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<axum::body::Body>| {
                    let matched_path = request
                        .extensions()
                        .get::<axum::extract::MatchedPath>()
                        .map(|matched| matched.as_str());

                    let span_name = if let Some(path) = matched_path {
                        format!("{} {}", request.method(), path)
                    } else {
                        format!("{} {}", request.method(), request.uri().path())
                    };

                    tracing::info_span!(
                        "request",
                        "otel.name" = span_name,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        incident_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency = tracing::field::Empty,
                    )
                })
                .on_request(
                    |_request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {},
                )
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        span.record("status", tracing::field::display(response.status()));
                        span.record("latency", tracing::field::debug(latency));
                        tracing::info!("request completed");
                    },
                ),
        )
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(
                    std::env::var("CORS_ALLOW_ORIGIN")
                        .unwrap_or_else(|_| "http://localhost:3003".to_string())
                        .parse::<axum::http::HeaderValue>()
                        .unwrap(),
                )
                .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
                .allow_headers([axum::http::header::CONTENT_TYPE]),
        )
        .route("/metrics", get(|| async move { metric_handle.render() }))
}
