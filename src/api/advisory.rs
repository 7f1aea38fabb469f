use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Json};

use crate::advisory::{AdvisoryService, DraftFeatures};

// POST /advisory/suggestions - debounced by the drafting UI; the response
// says whether it was served from cache
pub async fn suggest(
    Extension(service): Extension<Arc<AdvisoryService>>,
    Json(features): Json<DraftFeatures>,
) -> impl IntoResponse {
    let response = service.suggest(&features).await;
    (axum::http::StatusCode::OK, Json(response)).into_response()
}
