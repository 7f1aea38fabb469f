pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::{AssignedResource, Incident, Recommendation, Resource, ResourceKind, Responder};

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("incident {0} not found")]
    IncidentNotFound(Uuid),
    #[error("record store query failed: {0}")]
    Query(String),
}

/// Everything the orchestrator writes back in one consolidated update.
#[derive(Debug, Clone)]
pub struct TriageOutcome {
    pub priority_score: u8,
    pub recommendations: Vec<Recommendation>,
    pub assigned_resources: Vec<AssignedResource>,
}

/// Keyed record store holding incident documents. The engine reads and
/// partially updates incidents; it never owns their full lifecycle.
///
/// Writes are last-write-wins: there is no optimistic concurrency between a
/// scheduled scan and an orchestration touching the same incident.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Incident, StoreError>;

    /// Incidents whose lifecycle status is still open (Reported/UnderReview).
    async fn find_open(&self) -> Result<Vec<Incident>, StoreError>;

    /// Single consolidated triage write: priority score, appended
    /// recommendations, assigned resources, escalation back to Normal and a
    /// refreshed last-action timestamp. All-or-nothing.
    async fn apply_triage(&self, id: Uuid, outcome: TriageOutcome) -> Result<(), StoreError>;

    /// Move escalation status forward to Escalated. No-op if the incident is
    /// already Escalated or AutoContacted.
    async fn mark_escalated(&self, id: Uuid) -> Result<(), StoreError>;

    /// Record a completed dispatch: escalation status AutoContacted, the
    /// contacted responder ids merged in, last-action timestamp refreshed.
    async fn record_dispatch(&self, id: Uuid, contacted: &[Uuid]) -> Result<(), StoreError>;

    /// Append one recommendation record without touching anything else.
    async fn append_recommendation(
        &self,
        id: Uuid,
        recommendation: Recommendation,
    ) -> Result<(), StoreError>;
}

/// Read-only view of the allocatable resource pool.
#[async_trait]
pub trait ResourcePool: Send + Sync {
    async fn find_available(&self, kinds: &[ResourceKind]) -> Result<Vec<Resource>, StoreError>;
}

/// Read-only view of the responder roster.
#[async_trait]
pub trait ResponderDirectory: Send + Sync {
    async fn on_duty(&self, limit: usize) -> Result<Vec<Responder>, StoreError>;
}
