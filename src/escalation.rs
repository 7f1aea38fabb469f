use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::domain::Incident;
use crate::store::{IncidentStore, StoreError};

/// An incident idle past this many hours is flagged for escalation.
pub const IDLE_ESCALATION_THRESHOLD_HOURS: f64 = 24.0;

#[derive(Debug, Clone, Serialize)]
pub struct EscalationCheck {
    pub incident_id: Uuid,
    pub hours_idle: f64,
    pub should_escalate: bool,
}

/// Classifies an incident against the idle threshold. Pure; the monitor
/// never writes state or contacts anyone — escalation writes and dispatch
/// belong to the sweep that consumes these checks.
pub fn check_incident(incident: &Incident, now: DateTime<Utc>) -> EscalationCheck {
    let hours_idle = incident.hours_idle(now);
    EscalationCheck {
        incident_id: incident.id,
        hours_idle,
        should_escalate: hours_idle > IDLE_ESCALATION_THRESHOLD_HOURS,
    }
}

pub struct EscalationMonitor {
    incidents: Arc<dyn IncidentStore>,
}

impl EscalationMonitor {
    pub fn new(incidents: Arc<dyn IncidentStore>) -> Self {
        Self { incidents }
    }

    /// Full scan: every open incident is evaluated and those past the
    /// threshold are returned. Idempotent; already-escalated incidents stay
    /// selected until their lifecycle status changes or their idle clock
    /// resets.
    pub async fn scan(&self) -> Result<Vec<EscalationCheck>, StoreError> {
        let now = Utc::now();
        let open = self.incidents.find_open().await?;
        let total = open.len();
        let flagged: Vec<EscalationCheck> = open
            .iter()
            .map(|incident| check_incident(incident, now))
            .filter(|check| check.should_escalate)
            .collect();
        debug!(open = total, flagged = flagged.len(), "escalation scan");
        Ok(flagged)
    }

    /// Single-incident variant of the scan, returned whether or not the
    /// threshold is exceeded.
    pub async fn check(&self, incident_id: Uuid) -> Result<EscalationCheck, StoreError> {
        let incident = self.incidents.get(incident_id).await?;
        Ok(check_incident(&incident, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EscalationStatus, IncidentStatus, Location, Severity};
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn idle_incident(status: IncidentStatus, idle_hours: i64) -> Incident {
        let now = Utc::now();
        Incident {
            id: Uuid::new_v4(),
            severity: Severity::Moderate,
            location: Location {
                address: "9 Hill Ln".to_string(),
                latitude: None,
                longitude: None,
            },
            description: "stray dog pack".to_string(),
            status,
            priority_score: Some(5),
            escalation_status: EscalationStatus::Normal,
            created_at: now - Duration::hours(idle_hours),
            last_action_at: None,
            recommendations: vec![],
            assigned_resources: vec![],
            contacted_responders: vec![],
        }
    }

    #[test]
    fn fresh_incident_is_never_flagged() {
        let now = Utc::now();
        let incident = idle_incident(IncidentStatus::Reported, 23);
        let check = check_incident(&incident, now);
        assert!(!check.should_escalate);
    }

    #[test]
    fn incident_just_past_threshold_is_flagged() {
        let now = Utc::now();
        let mut incident = idle_incident(IncidentStatus::Reported, 24);
        incident.created_at -= Duration::seconds(60); // 24h + epsilon
        let check = check_incident(&incident, now);
        assert!(check.should_escalate);
        assert!(check.hours_idle > IDLE_ESCALATION_THRESHOLD_HOURS);
    }

    #[test]
    fn recent_action_resets_the_idle_clock() {
        let now = Utc::now();
        let mut incident = idle_incident(IncidentStatus::UnderReview, 72);
        incident.last_action_at = Some(now - Duration::hours(2));
        let check = check_incident(&incident, now);
        assert!(!check.should_escalate);
        assert!((check.hours_idle - 2.0).abs() < 0.01);
    }

    #[tokio::test]
    async fn scan_flags_only_stalled_open_incidents() {
        let store = Arc::new(MemoryStore::new());
        let stalled = idle_incident(IncidentStatus::Reported, 30);
        let stalled_id = stalled.id;
        store.insert_incident(stalled).await;
        store
            .insert_incident(idle_incident(IncidentStatus::Reported, 1))
            .await;
        // Terminal lifecycle status: not scanned even though it is idle.
        store
            .insert_incident(idle_incident(IncidentStatus::Resolved, 100))
            .await;

        let monitor = EscalationMonitor::new(store);
        let flagged = monitor.scan().await.unwrap();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].incident_id, stalled_id);
        assert!((flagged[0].hours_idle - 30.0).abs() < 0.1);
        assert!(flagged[0].should_escalate);
    }

    #[tokio::test]
    async fn single_incident_check_reports_below_threshold() {
        let store = Arc::new(MemoryStore::new());
        let incident = idle_incident(IncidentStatus::UnderReview, 3);
        let id = incident.id;
        store.insert_incident(incident).await;

        let monitor = EscalationMonitor::new(store);
        let check = monitor.check(id).await.unwrap();
        assert!(!check.should_escalate);
        assert!((check.hours_idle - 3.0).abs() < 0.1);
    }
}
