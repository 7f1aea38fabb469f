use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{
    EscalationStatus, Incident, Recommendation, Resource, ResourceKind, Responder,
};
use crate::store::{IncidentStore, ResourcePool, ResponderDirectory, StoreError, TriageOutcome};

/// In-process record store. Backs the test suites and local development runs
/// where no Postgres is available; semantics match the Postgres store,
/// including last-write-wins updates.
#[derive(Default)]
pub struct MemoryStore {
    incidents: RwLock<HashMap<Uuid, Incident>>,
    resources: RwLock<Vec<Resource>>,
    responders: RwLock<Vec<Responder>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_incident(&self, incident: Incident) {
        self.incidents.write().await.insert(incident.id, incident);
    }

    pub async fn insert_resource(&self, resource: Resource) {
        self.resources.write().await.push(resource);
    }

    pub async fn insert_responder(&self, responder: Responder) {
        self.responders.write().await.push(responder);
    }
}

#[async_trait]
impl IncidentStore for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Incident, StoreError> {
        self.incidents
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::IncidentNotFound(id))
    }

    async fn find_open(&self) -> Result<Vec<Incident>, StoreError> {
        Ok(self
            .incidents
            .read()
            .await
            .values()
            .filter(|i| i.status.is_open())
            .cloned()
            .collect())
    }

    async fn apply_triage(&self, id: Uuid, outcome: TriageOutcome) -> Result<(), StoreError> {
        let mut incidents = self.incidents.write().await;
        let incident = incidents
            .get_mut(&id)
            .ok_or(StoreError::IncidentNotFound(id))?;
        incident.priority_score = Some(outcome.priority_score);
        incident.recommendations.extend(outcome.recommendations);
        incident.assigned_resources = outcome.assigned_resources;
        incident.escalation_status = EscalationStatus::Normal;
        incident.last_action_at = Some(Utc::now());
        Ok(())
    }

    async fn mark_escalated(&self, id: Uuid) -> Result<(), StoreError> {
        let mut incidents = self.incidents.write().await;
        let incident = incidents
            .get_mut(&id)
            .ok_or(StoreError::IncidentNotFound(id))?;
        if incident.escalation_status < EscalationStatus::Escalated {
            incident.escalation_status = EscalationStatus::Escalated;
        }
        Ok(())
    }

    async fn record_dispatch(&self, id: Uuid, contacted: &[Uuid]) -> Result<(), StoreError> {
        let mut incidents = self.incidents.write().await;
        let incident = incidents
            .get_mut(&id)
            .ok_or(StoreError::IncidentNotFound(id))?;
        incident.escalation_status = EscalationStatus::AutoContacted;
        for responder_id in contacted {
            if !incident.contacted_responders.contains(responder_id) {
                incident.contacted_responders.push(*responder_id);
            }
        }
        incident.last_action_at = Some(Utc::now());
        Ok(())
    }

    async fn append_recommendation(
        &self,
        id: Uuid,
        recommendation: Recommendation,
    ) -> Result<(), StoreError> {
        let mut incidents = self.incidents.write().await;
        let incident = incidents
            .get_mut(&id)
            .ok_or(StoreError::IncidentNotFound(id))?;
        incident.recommendations.push(recommendation);
        Ok(())
    }
}

#[async_trait]
impl ResourcePool for MemoryStore {
    async fn find_available(&self, kinds: &[ResourceKind]) -> Result<Vec<Resource>, StoreError> {
        Ok(self
            .resources
            .read()
            .await
            .iter()
            .filter(|r| r.available && kinds.contains(&r.kind))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ResponderDirectory for MemoryStore {
    async fn on_duty(&self, limit: usize) -> Result<Vec<Responder>, StoreError> {
        Ok(self
            .responders
            .read()
            .await
            .iter()
            .filter(|r| r.on_duty)
            .take(limit)
            .cloned()
            .collect())
    }
}
