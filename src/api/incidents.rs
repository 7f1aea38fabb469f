use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::domain::{Recommendation, RecommendationStatus};
use crate::store::{IncidentStore, StoreError};

// GET /incidents/:id
pub async fn get_incident(
    Extension(store): Extension<Arc<dyn IncidentStore>>,
    Path(incident_id): Path<Uuid>,
) -> impl IntoResponse {
    match store.get(incident_id).await {
        Ok(incident) => (axum::http::StatusCode::OK, Json(incident)).into_response(),
        Err(StoreError::IncidentNotFound(_)) => {
            (axum::http::StatusCode::NOT_FOUND, "Incident not found").into_response()
        }
        Err(e) => {
            error!("Failed to fetch incident {}: {}", incident_id, e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch incident",
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
pub struct DecisionRequest {
    pub decision: RecommendationStatus,
    pub reason: String,
}

// POST /incidents/:id/recommendations/:rec_id/decision
//
// The audit trail is immutable: a decision appends a new timestamped record
// superseding the old one, it never edits in place.
pub async fn decide_recommendation(
    Extension(store): Extension<Arc<dyn IncidentStore>>,
    Path((incident_id, recommendation_id)): Path<(Uuid, Uuid)>,
    Json(payload): Json<DecisionRequest>,
) -> impl IntoResponse {
    if payload.reason.trim().is_empty() {
        return (
            axum::http::StatusCode::BAD_REQUEST,
            "A non-empty reason is required",
        )
            .into_response();
    }
    if payload.decision == RecommendationStatus::Pending {
        return (
            axum::http::StatusCode::BAD_REQUEST,
            "Decision must be approved, overridden or executed",
        )
            .into_response();
    }

    let incident = match store.get(incident_id).await {
        Ok(i) => i,
        Err(StoreError::IncidentNotFound(_)) => {
            return (axum::http::StatusCode::NOT_FOUND, "Incident not found").into_response()
        }
        Err(e) => {
            error!("Failed to fetch incident {}: {}", incident_id, e);
            return (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch incident",
            )
                .into_response();
        }
    };

    let Some(original) = incident
        .recommendations
        .iter()
        .find(|r| r.id == recommendation_id)
    else {
        return (
            axum::http::StatusCode::NOT_FOUND,
            "Recommendation not found",
        )
            .into_response();
    };

    let entry = Recommendation {
        id: Uuid::new_v4(),
        agent: original.agent,
        rationale: payload.reason,
        confidence: original.confidence,
        created_at: Utc::now(),
        status: payload.decision,
        supersedes: Some(recommendation_id),
    };

    match store.append_recommendation(incident_id, entry.clone()).await {
        Ok(()) => {
            info!(
                "Recommendation {} on incident {} marked {:?}",
                recommendation_id, incident_id, entry.status
            );
            (axum::http::StatusCode::OK, Json(entry)).into_response()
        }
        Err(e) => {
            error!("Failed to append recommendation decision: {}", e);
            (
                axum::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to record decision",
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        AgentKind, EscalationStatus, Incident, IncidentStatus, Location, Severity,
    };
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn decision_appends_instead_of_editing() {
        let store = Arc::new(MemoryStore::new());
        let original = Recommendation::pending(AgentKind::Action, "2 action(s)".to_string(), 0.85);
        let original_id = original.id;
        let incident = Incident {
            id: Uuid::new_v4(),
            severity: Severity::Moderate,
            location: Location {
                address: "7 Bay St".to_string(),
                latitude: None,
                longitude: None,
            },
            description: "barking through the night".to_string(),
            status: IncidentStatus::UnderReview,
            priority_score: Some(5),
            escalation_status: EscalationStatus::Normal,
            created_at: Utc::now(),
            last_action_at: None,
            recommendations: vec![original],
            assigned_resources: vec![],
            contacted_responders: vec![],
        };
        let id = incident.id;
        store.insert_incident(incident).await;

        let entry = Recommendation {
            id: Uuid::new_v4(),
            agent: AgentKind::Action,
            rationale: "field agent already assigned".to_string(),
            confidence: 0.85,
            created_at: Utc::now(),
            status: RecommendationStatus::Overridden,
            supersedes: Some(original_id),
        };
        store.append_recommendation(id, entry).await.unwrap();

        let updated = store.get(id).await.unwrap();
        assert_eq!(updated.recommendations.len(), 2);
        // Original record untouched.
        assert_eq!(
            updated.recommendations[0].status,
            RecommendationStatus::Pending
        );
        assert_eq!(
            updated.recommendations[1].supersedes,
            Some(original_id)
        );
    }
}
