use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{Incident, Severity};
use crate::notifications::{NotificationGateway, NotificationTemplates};
use crate::store::{IncidentStore, ResponderDirectory};
use crate::triage::{TriageError, Urgency};

/// At most this many on-duty responders are alerted per dispatch.
pub const MAX_RESPONDERS_PER_DISPATCH: usize = 5;

/// Bound on each individual channel attempt so one slow transport cannot
/// stall the whole fan-out.
pub const CHANNEL_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReport {
    pub contacted: u32,
    pub failed: u32,
    pub contacted_responders: Vec<Uuid>,
}

fn urgency_for(incident: &Incident) -> Urgency {
    // Not-yet-scored incidents fall back to a severity-derived score so the
    // payload still carries a meaningful urgency word.
    let score = incident.priority_score.unwrap_or(match incident.severity {
        Severity::Severe => 8,
        Severity::Moderate => 5,
        Severity::Minor => 2,
    });
    Urgency::for_score(score)
}

/// Fans out escalation alerts to on-duty responders. A responder counts as
/// contacted if at least one of their preferred channels succeeds. Best
/// effort, fire and forget: there is no queue and no retry.
pub struct ContactDispatcher {
    incidents: Arc<dyn IncidentStore>,
    responders: Arc<dyn ResponderDirectory>,
    gateway: Arc<dyn NotificationGateway>,
}

impl ContactDispatcher {
    pub fn new(
        incidents: Arc<dyn IncidentStore>,
        responders: Arc<dyn ResponderDirectory>,
        gateway: Arc<dyn NotificationGateway>,
    ) -> Self {
        Self {
            incidents,
            responders,
            gateway,
        }
    }

    async fn attempt(&self, channel: &str, send: impl std::future::Future<Output = bool>) -> bool {
        match tokio::time::timeout(CHANNEL_ATTEMPT_TIMEOUT, send).await {
            Ok(delivered) => delivered,
            Err(_) => {
                warn!("{} attempt timed out", channel);
                false
            }
        }
    }

    #[instrument(skip(self), fields(incident_id = %incident_id))]
    pub async fn dispatch(&self, incident_id: Uuid) -> Result<DispatchReport, TriageError> {
        let incident = self.incidents.get(incident_id).await.map_err(|e| {
            match e {
                crate::store::StoreError::IncidentNotFound(id) => TriageError::NotFound(id),
                other => TriageError::Store(other),
            }
        })?;

        let responders = self
            .responders
            .on_duty(MAX_RESPONDERS_PER_DISPATCH)
            .await?;

        // No responders available is a reportable no-op, not a failure; the
        // incident's escalation state is left where it was.
        if responders.is_empty() {
            warn!("no on-duty responders available; dispatch is a no-op");
            return Ok(DispatchReport {
                contacted: 0,
                failed: 0,
                contacted_responders: vec![],
            });
        }

        let urgency = urgency_for(&incident);
        let hours_idle = incident.hours_idle(chrono::Utc::now());
        let sms_body = NotificationTemplates::escalation_sms(&incident, urgency, hours_idle);
        let subject = NotificationTemplates::escalation_subject(&incident, urgency);
        let email_body = NotificationTemplates::escalation_email(&incident, urgency, hours_idle);

        let mut contacted = 0u32;
        let mut failed = 0u32;
        let mut contacted_ids = Vec::new();

        for responder in &responders {
            let mut reached = false;

            if responder.preferred_channel.wants_sms() {
                match &responder.phone {
                    Some(phone) => {
                        reached |= self
                            .attempt("sms", self.gateway.send_sms(phone, &sms_body))
                            .await;
                    }
                    None => warn!("responder {} has no phone on file; skipping SMS", responder.id),
                }
            }

            if responder.preferred_channel.wants_email() {
                match &responder.email {
                    Some(email) => {
                        reached |= self
                            .attempt(
                                "email",
                                self.gateway.send_email(email, &subject, &email_body),
                            )
                            .await;
                    }
                    None => warn!(
                        "responder {} has no email on file; skipping email",
                        responder.id
                    ),
                }
            }

            if reached {
                contacted += 1;
                contacted_ids.push(responder.id);
            } else {
                failed += 1;
            }
        }

        // Dispatch was attempted, so the incident advances to AutoContacted
        // even when some or all channel attempts failed.
        self.incidents
            .record_dispatch(incident_id, &contacted_ids)
            .await?;

        crate::metrics::record_dispatch_fanout(contacted, failed);
        info!(contacted, failed, "dispatch completed");

        Ok(DispatchReport {
            contacted,
            failed,
            contacted_responders: contacted_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        EscalationStatus, IncidentStatus, Location, PreferredChannel, Responder,
    };
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, Utc};
    use std::sync::Mutex;

    struct StubGateway {
        sms_ok: bool,
        email_ok: bool,
        sms_calls: Mutex<Vec<String>>,
        email_calls: Mutex<Vec<String>>,
    }

    impl StubGateway {
        fn new(sms_ok: bool, email_ok: bool) -> Self {
            Self {
                sms_ok,
                email_ok,
                sms_calls: Mutex::new(vec![]),
                email_calls: Mutex::new(vec![]),
            }
        }
    }

    #[async_trait]
    impl NotificationGateway for StubGateway {
        async fn send_sms(&self, to_number: &str, _body: &str) -> bool {
            self.sms_calls.lock().unwrap().push(to_number.to_string());
            self.sms_ok
        }

        async fn send_email(&self, to_address: &str, _subject: &str, _body: &str) -> bool {
            self.email_calls
                .lock()
                .unwrap()
                .push(to_address.to_string());
            self.email_ok
        }
    }

    fn stalled_incident() -> Incident {
        Incident {
            id: Uuid::new_v4(),
            severity: Severity::Severe,
            location: Location {
                address: "18 Mill St".to_string(),
                latitude: None,
                longitude: None,
            },
            description: "unattended aggressive dog".to_string(),
            status: IncidentStatus::Reported,
            priority_score: Some(9),
            escalation_status: EscalationStatus::Escalated,
            created_at: Utc::now() - ChronoDuration::hours(30),
            last_action_at: None,
            recommendations: vec![],
            assigned_resources: vec![],
            contacted_responders: vec![],
        }
    }

    fn responder(channel: PreferredChannel) -> Responder {
        Responder {
            id: Uuid::new_v4(),
            name: "Officer Reyes".to_string(),
            on_duty: true,
            phone: Some("+15550001111".to_string()),
            email: Some("reyes@example.gov".to_string()),
            preferred_channel: channel,
        }
    }

    fn dispatcher(store: Arc<MemoryStore>, gateway: StubGateway) -> ContactDispatcher {
        ContactDispatcher::new(store.clone(), store, Arc::new(gateway))
    }

    #[tokio::test]
    async fn zero_responders_is_a_no_op() {
        let store = Arc::new(MemoryStore::new());
        let incident = stalled_incident();
        let id = incident.id;
        store.insert_incident(incident).await;

        let report = dispatcher(store.clone(), StubGateway::new(true, true))
            .dispatch(id)
            .await
            .unwrap();
        assert_eq!(report.contacted, 0);
        assert_eq!(report.failed, 0);

        let unchanged = store.get(id).await.unwrap();
        assert_eq!(unchanged.escalation_status, EscalationStatus::Escalated);
        assert!(unchanged.contacted_responders.is_empty());
    }

    #[tokio::test]
    async fn sms_success_with_email_failure_still_counts_as_contacted() {
        let store = Arc::new(MemoryStore::new());
        let incident = stalled_incident();
        let id = incident.id;
        store.insert_incident(incident).await;
        let r = responder(PreferredChannel::Both);
        let responder_id = r.id;
        store.insert_responder(r).await;

        let report = dispatcher(store.clone(), StubGateway::new(true, false))
            .dispatch(id)
            .await
            .unwrap();
        assert_eq!(report.contacted, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.contacted_responders, vec![responder_id]);

        let updated = store.get(id).await.unwrap();
        assert_eq!(updated.escalation_status, EscalationStatus::AutoContacted);
        assert_eq!(updated.contacted_responders, vec![responder_id]);
    }

    #[tokio::test]
    async fn total_channel_failure_still_advances_escalation_state() {
        let store = Arc::new(MemoryStore::new());
        let incident = stalled_incident();
        let id = incident.id;
        store.insert_incident(incident).await;
        store.insert_responder(responder(PreferredChannel::Both)).await;

        let report = dispatcher(store.clone(), StubGateway::new(false, false))
            .dispatch(id)
            .await
            .unwrap();
        assert_eq!(report.contacted, 0);
        assert_eq!(report.failed, 1);

        // Dispatch was attempted, so the write still happens.
        let updated = store.get(id).await.unwrap();
        assert_eq!(updated.escalation_status, EscalationStatus::AutoContacted);
        assert!(updated.contacted_responders.is_empty());
    }

    #[tokio::test]
    async fn sms_only_responder_never_gets_email() {
        let store = Arc::new(MemoryStore::new());
        let incident = stalled_incident();
        let id = incident.id;
        store.insert_incident(incident).await;
        store.insert_responder(responder(PreferredChannel::Sms)).await;

        let gateway = Arc::new(StubGateway::new(true, true));
        let dispatcher =
            ContactDispatcher::new(store.clone(), store.clone(), gateway.clone());
        dispatcher.dispatch(id).await.unwrap();

        assert_eq!(gateway.sms_calls.lock().unwrap().len(), 1);
        assert!(gateway.email_calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn second_dispatch_after_auto_contacted_succeeds_without_regression() {
        let store = Arc::new(MemoryStore::new());
        let incident = stalled_incident();
        let id = incident.id;
        store.insert_incident(incident).await;
        store.insert_responder(responder(PreferredChannel::Email)).await;

        let dispatcher = dispatcher(store.clone(), StubGateway::new(true, true));
        dispatcher.dispatch(id).await.unwrap();
        assert_eq!(
            store.get(id).await.unwrap().escalation_status,
            EscalationStatus::AutoContacted
        );

        let second = dispatcher.dispatch(id).await.unwrap();
        assert_eq!(second.contacted, 1);
        let after = store.get(id).await.unwrap();
        assert_eq!(after.escalation_status, EscalationStatus::AutoContacted);
        // Responder ids are merged, not duplicated.
        assert_eq!(after.contacted_responders.len(), 1);
    }

    #[tokio::test]
    async fn unknown_incident_is_not_found() {
        let store = Arc::new(MemoryStore::new());
        let dispatcher = dispatcher(store, StubGateway::new(true, true));
        match dispatcher.dispatch(Uuid::new_v4()).await {
            Err(TriageError::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }
}
