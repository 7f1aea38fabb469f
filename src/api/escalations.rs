use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use tracing::error;
use uuid::Uuid;

use crate::dispatch::ContactDispatcher;
use crate::escalation::EscalationMonitor;
use crate::store::{IncidentStore, StoreError};
use crate::worker::run_escalation_sweep;

// POST /internal/escalations/scan - scheduled entry point, invoked
// periodically by an external scheduler (or the worker binary in-process)
pub async fn run_scan(
    Extension(monitor): Extension<Arc<EscalationMonitor>>,
    Extension(incidents): Extension<Arc<dyn IncidentStore>>,
    Extension(dispatcher): Extension<Arc<ContactDispatcher>>,
) -> impl IntoResponse {
    match run_escalation_sweep(&monitor, &incidents, &dispatcher).await {
        Ok(outcome) => (axum::http::StatusCode::OK, Json(outcome)).into_response(),
        Err(e) => {
            error!("Escalation scan failed: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Escalation scan failed",
            )
                .into_response()
        }
    }
}

// GET /incidents/:id/escalation - single-incident idle check
pub async fn check_incident(
    Extension(monitor): Extension<Arc<EscalationMonitor>>,
    Path(incident_id): Path<Uuid>,
) -> impl IntoResponse {
    match monitor.check(incident_id).await {
        Ok(check) => (axum::http::StatusCode::OK, Json(check)).into_response(),
        Err(StoreError::IncidentNotFound(_)) => {
            (axum::http::StatusCode::NOT_FOUND, "Incident not found").into_response()
        }
        Err(e) => {
            error!("Escalation check failed for {}: {}", incident_id, e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Escalation check failed",
            )
                .into_response()
        }
    }
}
