use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QuerySelect, Set,
};
use uuid::Uuid;

use crate::domain::{
    AssignedResource, EscalationStatus, Incident, IncidentStatus, Location, PreferredChannel,
    Recommendation, Resource, ResourceKind, Responder, Severity,
};
use crate::entities::{incident, resource, responder};
use crate::store::{IncidentStore, ResourcePool, ResponderDirectory, StoreError, TriageOutcome};

/// sea-orm backed record store. Incident documents keep their embedded
/// collections in Json columns; appends are read-modify-write with
/// last-write-wins semantics (no version/ETag check — the scan and the
/// orchestrator may race on the same row, which the design accepts).
#[derive(Clone)]
pub struct PostgresStore {
    db: DatabaseConnection,
}

impl PostgresStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn fetch(&self, id: Uuid) -> Result<incident::Model, StoreError> {
        incident::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(StoreError::IncidentNotFound(id))
    }
}

fn db_err(e: sea_orm::DbErr) -> StoreError {
    StoreError::Query(e.to_string())
}

fn severity_to_db(severity: Severity) -> &'static str {
    match severity {
        Severity::Minor => "minor",
        Severity::Moderate => "moderate",
        Severity::Severe => "severe",
    }
}

fn severity_from_db(raw: &str) -> Result<Severity, StoreError> {
    match raw {
        "minor" => Ok(Severity::Minor),
        "moderate" => Ok(Severity::Moderate),
        "severe" => Ok(Severity::Severe),
        other => Err(StoreError::Query(format!("unknown severity '{other}'"))),
    }
}

fn status_from_db(raw: &str) -> Result<IncidentStatus, StoreError> {
    match raw {
        "reported" => Ok(IncidentStatus::Reported),
        "under_review" => Ok(IncidentStatus::UnderReview),
        "action_taken" => Ok(IncidentStatus::ActionTaken),
        "resolved" => Ok(IncidentStatus::Resolved),
        other => Err(StoreError::Query(format!("unknown status '{other}'"))),
    }
}

fn escalation_to_db(status: EscalationStatus) -> &'static str {
    match status {
        EscalationStatus::Normal => "normal",
        EscalationStatus::Escalated => "escalated",
        EscalationStatus::AutoContacted => "auto_contacted",
    }
}

fn escalation_from_db(raw: &str) -> Result<EscalationStatus, StoreError> {
    match raw {
        "normal" => Ok(EscalationStatus::Normal),
        "escalated" => Ok(EscalationStatus::Escalated),
        "auto_contacted" => Ok(EscalationStatus::AutoContacted),
        other => Err(StoreError::Query(format!(
            "unknown escalation status '{other}'"
        ))),
    }
}

fn kind_from_db(raw: &str) -> Result<ResourceKind, StoreError> {
    match raw {
        "rescue" => Ok(ResourceKind::Rescue),
        "veterinary" => Ok(ResourceKind::Veterinary),
        "animal_control" => Ok(ResourceKind::AnimalControl),
        other => Err(StoreError::Query(format!("unknown resource kind '{other}'"))),
    }
}

fn channel_from_db(raw: &str) -> Result<PreferredChannel, StoreError> {
    match raw {
        "sms" => Ok(PreferredChannel::Sms),
        "email" => Ok(PreferredChannel::Email),
        "both" => Ok(PreferredChannel::Both),
        other => Err(StoreError::Query(format!("unknown channel '{other}'"))),
    }
}

fn json_column<T: serde::de::DeserializeOwned>(
    value: &serde_json::Value,
    column: &str,
) -> Result<T, StoreError> {
    serde_json::from_value(value.clone())
        .map_err(|e| StoreError::Query(format!("malformed {column} column: {e}")))
}

fn json_value<T: serde::Serialize>(value: &T, column: &str) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(value)
        .map_err(|e| StoreError::Query(format!("failed to encode {column} column: {e}")))
}

fn to_incident(model: incident::Model) -> Result<Incident, StoreError> {
    Ok(Incident {
        id: model.id,
        severity: severity_from_db(&model.severity)?,
        location: Location {
            address: model.address,
            latitude: model.latitude,
            longitude: model.longitude,
        },
        description: model.description,
        status: status_from_db(&model.status)?,
        priority_score: model.priority_score.map(|s| s as u8),
        escalation_status: escalation_from_db(&model.escalation_status)?,
        created_at: model.created_at.with_timezone(&Utc),
        last_action_at: model.last_action_at.map(|t| t.with_timezone(&Utc)),
        recommendations: json_column(&model.recommendations, "recommendations")?,
        assigned_resources: json_column(&model.assigned_resources, "assigned_resources")?,
        contacted_responders: json_column(&model.contacted_responders, "contacted_responders")?,
    })
}

#[async_trait]
impl IncidentStore for PostgresStore {
    async fn get(&self, id: Uuid) -> Result<Incident, StoreError> {
        to_incident(self.fetch(id).await?)
    }

    async fn find_open(&self) -> Result<Vec<Incident>, StoreError> {
        let models = incident::Entity::find()
            .filter(incident::Column::Status.is_in(["reported", "under_review"]))
            .all(&self.db)
            .await
            .map_err(db_err)?;
        models.into_iter().map(to_incident).collect()
    }

    async fn apply_triage(&self, id: Uuid, outcome: TriageOutcome) -> Result<(), StoreError> {
        let model = self.fetch(id).await?;
        let mut recommendations: Vec<Recommendation> =
            json_column(&model.recommendations, "recommendations")?;
        recommendations.extend(outcome.recommendations);

        let mut active: incident::ActiveModel = model.into();
        active.priority_score = Set(Some(outcome.priority_score as i16));
        active.recommendations = Set(json_value(&recommendations, "recommendations")?);
        active.assigned_resources =
            Set(json_value(&outcome.assigned_resources, "assigned_resources")?);
        active.escalation_status = Set(escalation_to_db(EscalationStatus::Normal).to_string());
        active.last_action_at = Set(Some(Utc::now().into()));
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn mark_escalated(&self, id: Uuid) -> Result<(), StoreError> {
        let model = self.fetch(id).await?;
        let current = escalation_from_db(&model.escalation_status)?;
        if current >= EscalationStatus::Escalated {
            return Ok(());
        }
        let mut active: incident::ActiveModel = model.into();
        active.escalation_status = Set(escalation_to_db(EscalationStatus::Escalated).to_string());
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn record_dispatch(&self, id: Uuid, contacted: &[Uuid]) -> Result<(), StoreError> {
        let model = self.fetch(id).await?;
        let mut responder_ids: Vec<Uuid> =
            json_column(&model.contacted_responders, "contacted_responders")?;
        for responder_id in contacted {
            if !responder_ids.contains(responder_id) {
                responder_ids.push(*responder_id);
            }
        }

        let mut active: incident::ActiveModel = model.into();
        active.escalation_status =
            Set(escalation_to_db(EscalationStatus::AutoContacted).to_string());
        active.contacted_responders = Set(json_value(&responder_ids, "contacted_responders")?);
        active.last_action_at = Set(Some(Utc::now().into()));
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }

    async fn append_recommendation(
        &self,
        id: Uuid,
        recommendation: Recommendation,
    ) -> Result<(), StoreError> {
        let model = self.fetch(id).await?;
        let mut recommendations: Vec<Recommendation> =
            json_column(&model.recommendations, "recommendations")?;
        recommendations.push(recommendation);

        let mut active: incident::ActiveModel = model.into();
        active.recommendations = Set(json_value(&recommendations, "recommendations")?);
        active.update(&self.db).await.map_err(db_err)?;
        Ok(())
    }
}

#[async_trait]
impl ResourcePool for PostgresStore {
    async fn find_available(&self, kinds: &[ResourceKind]) -> Result<Vec<Resource>, StoreError> {
        let kind_strings: Vec<String> = kinds.iter().map(|k| k.to_string()).collect();
        let models = resource::Entity::find()
            .filter(resource::Column::Available.eq(true))
            .filter(resource::Column::Kind.is_in(kind_strings))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        models
            .into_iter()
            .map(|m| {
                Ok(Resource {
                    id: m.id,
                    kind: kind_from_db(&m.kind)?,
                    name: m.name,
                    available: m.available,
                })
            })
            .collect()
    }
}

#[async_trait]
impl ResponderDirectory for PostgresStore {
    async fn on_duty(&self, limit: usize) -> Result<Vec<Responder>, StoreError> {
        let models = responder::Entity::find()
            .filter(responder::Column::OnDuty.eq(true))
            .limit(limit as u64)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        models
            .into_iter()
            .map(|m| {
                Ok(Responder {
                    id: m.id,
                    name: m.name,
                    on_duty: m.on_duty,
                    phone: m.phone,
                    email: m.email,
                    preferred_channel: channel_from_db(&m.preferred_channel)?,
                })
            })
            .collect()
    }
}
