use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use tracing::error;
use uuid::Uuid;

use crate::dispatch::ContactDispatcher;
use crate::triage::{TriageError, TriageOrchestrator};

// POST /incidents/:id/triage - reactive trigger, invoked on record creation
pub async fn run_triage(
    Extension(orchestrator): Extension<Arc<TriageOrchestrator>>,
    Path(incident_id): Path<Uuid>,
) -> impl IntoResponse {
    match orchestrator.run(incident_id).await {
        Ok(summary) => (axum::http::StatusCode::OK, Json(summary)).into_response(),
        Err(TriageError::NotFound(_)) => {
            (axum::http::StatusCode::NOT_FOUND, "Incident not found").into_response()
        }
        Err(e) => {
            error!("Triage failed for {}: {}", incident_id, e);
            crate::metrics::increment_triage_runs("failed");
            (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "Triage failed").into_response()
        }
    }
}

// POST /incidents/:id/dispatch - manual escalation/dispatch trigger
pub async fn run_dispatch(
    Extension(dispatcher): Extension<Arc<ContactDispatcher>>,
    Path(incident_id): Path<Uuid>,
) -> impl IntoResponse {
    match dispatcher.dispatch(incident_id).await {
        Ok(report) => (axum::http::StatusCode::OK, Json(report)).into_response(),
        Err(TriageError::NotFound(_)) => {
            (axum::http::StatusCode::NOT_FOUND, "Incident not found").into_response()
        }
        Err(e) => {
            error!("Dispatch failed for {}: {}", incident_id, e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Dispatch failed",
            )
                .into_response()
        }
    }
}
