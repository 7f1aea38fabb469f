pub mod allocator;
pub mod recommender;
pub mod scorer;

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::domain::{AgentKind, AssignedResource, Recommendation};
use crate::store::{IncidentStore, ResourcePool, StoreError, TriageOutcome};

pub use allocator::{Allocation, AllocatorInput, ResourceAllocator, MAX_ALLOCATED_RESOURCES};
pub use recommender::{ActionPlan, ActionPriority, ActionRecommender, RecommendedAction, RecommenderInput};
pub use scorer::{PriorityScorer, ScoreOutput, ScorerInput, Urgency};

/// Deterministic rule agent. Each triage stage is a pure function behind this
/// interface so the orchestrator can compose them without any framework in
/// between, and each is unit-testable in isolation.
pub trait TriageAgent {
    type Input;
    type Output;

    fn kind(&self) -> AgentKind;
    fn evaluate(&self, input: &Self::Input) -> Self::Output;
}

#[derive(Debug, Error)]
pub enum TriageError {
    #[error("incident {0} not found")]
    NotFound(Uuid),
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: StoreError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn lookup_err(error: StoreError) -> TriageError {
    match error {
        StoreError::IncidentNotFound(id) => TriageError::NotFound(id),
        other => TriageError::Store(other),
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TriageSummary {
    pub incident_id: Uuid,
    pub priority_score: u8,
    pub urgency: Urgency,
    pub actions: Vec<RecommendedAction>,
    pub assigned_resources: Vec<AssignedResource>,
}

/// Runs scorer -> recommender -> allocator in strict sequence for one
/// incident and persists the consolidated outcome in a single write. Any
/// stage failure aborts the run with the incident untouched; the reactive
/// trigger decides whether to retry.
pub struct TriageOrchestrator {
    incidents: Arc<dyn IncidentStore>,
    pool: Arc<dyn ResourcePool>,
}

impl TriageOrchestrator {
    pub fn new(incidents: Arc<dyn IncidentStore>, pool: Arc<dyn ResourcePool>) -> Self {
        Self { incidents, pool }
    }

    #[instrument(skip(self), fields(incident_id = %incident_id))]
    pub async fn run(&self, incident_id: Uuid) -> Result<TriageSummary, TriageError> {
        let incident = self.incidents.get(incident_id).await.map_err(lookup_err)?;

        // Scorer input estimates. Location risk counts other open incidents
        // at the same address; resource pressure inverts pool availability.
        // The pool is queried once here and reused as allocation candidates.
        let open = self
            .incidents
            .find_open()
            .await
            .map_err(|e| TriageError::Stage {
                stage: "score",
                source: e,
            })?;
        let location_risk = open
            .iter()
            .filter(|i| i.id != incident.id && i.location.address == incident.location.address)
            .count()
            .min(3) as u8;

        let required_kinds = incident.severity.required_resource_kinds();
        let candidates = self
            .pool
            .find_available(&required_kinds)
            .await
            .map_err(|e| TriageError::Stage {
                stage: "resource",
                source: e,
            })?;
        let resource_pressure = 2u8.saturating_sub(candidates.len().min(2) as u8);

        let score = PriorityScorer.evaluate(&ScorerInput {
            severity: incident.severity,
            location_risk,
            age_hours: (Utc::now() - incident.created_at).num_seconds() as f64 / 3600.0,
            resource_pressure,
        });

        let plan = ActionRecommender.evaluate(&RecommenderInput {
            severity: incident.severity,
            priority_score: score.score,
        });

        let allocation = ResourceAllocator.evaluate(&AllocatorInput {
            priority_score: score.score,
            required_kinds,
            candidates,
        });

        let outcome = TriageOutcome {
            priority_score: score.score,
            recommendations: vec![
                Recommendation::pending(AgentKind::Priority, score.rationale, score.confidence),
                Recommendation::pending(AgentKind::Action, plan.rationale, plan.confidence),
                Recommendation::pending(
                    AgentKind::Resource,
                    allocation.rationale,
                    allocation.confidence,
                ),
            ],
            assigned_resources: allocation.resources.clone(),
        };
        self.incidents.apply_triage(incident_id, outcome).await?;

        crate::metrics::increment_triage_runs("completed");
        info!(
            priority = score.score,
            urgency = score.urgency.as_upper(),
            actions = plan.actions.len(),
            resources = allocation.resources.len(),
            "triage completed"
        );

        Ok(TriageSummary {
            incident_id,
            priority_score: score.score,
            urgency: score.urgency,
            actions: plan.actions,
            assigned_resources: allocation.resources,
        })
    }
}
