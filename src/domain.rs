use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
}

impl Severity {
    /// Base contribution to the priority score.
    pub fn weight(&self) -> u8 {
        match self {
            Severity::Severe => 3,
            Severity::Moderate => 2,
            Severity::Minor => 1,
        }
    }

    /// Resource kinds a triage run should request for this severity.
    pub fn required_resource_kinds(&self) -> Vec<ResourceKind> {
        match self {
            Severity::Severe => vec![
                ResourceKind::Rescue,
                ResourceKind::Veterinary,
                ResourceKind::AnimalControl,
            ],
            Severity::Moderate => vec![ResourceKind::Rescue, ResourceKind::AnimalControl],
            Severity::Minor => vec![ResourceKind::AnimalControl],
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Minor => write!(f, "Minor"),
            Severity::Moderate => write!(f, "Moderate"),
            Severity::Severe => write!(f, "Severe"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Reported,
    UnderReview,
    ActionTaken,
    Resolved,
}

impl IncidentStatus {
    /// Statuses the escalation scan still cares about.
    pub fn is_open(&self) -> bool {
        matches!(self, IncidentStatus::Reported | IncidentStatus::UnderReview)
    }
}

/// Forward-only: Normal -> Escalated -> AutoContacted. Variant order carries
/// the ordering, so `>=` checks guard against regressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EscalationStatus {
    Normal,
    Escalated,
    AutoContacted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    Priority,
    Action,
    Resource,
    Escalation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationStatus {
    Pending,
    Approved,
    Overridden,
    Executed,
}

/// One agent's output attached to an incident. Append-only: a status change
/// is a new record with `supersedes` pointing at the superseded one, never an
/// in-place edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: Uuid,
    pub agent: AgentKind,
    pub rationale: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
    pub status: RecommendationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supersedes: Option<Uuid>,
}

impl Recommendation {
    pub fn pending(agent: AgentKind, rationale: String, confidence: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            agent,
            rationale,
            confidence,
            created_at: Utc::now(),
            status: RecommendationStatus::Pending,
            supersedes: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Rescue,
    Veterinary,
    AnimalControl,
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceKind::Rescue => write!(f, "rescue"),
            ResourceKind::Veterinary => write!(f, "veterinary"),
            ResourceKind::AnimalControl => write!(f, "animal_control"),
        }
    }
}

/// An allocatable responder asset. Read-only from the triage engine's side:
/// allocation means "selected", not "reserved".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: Uuid,
    pub kind: ResourceKind,
    pub name: String,
    pub available: bool,
}

/// A resource the allocator picked for an incident. `distance_km` is always
/// `None` today: no routing backend exists, and fabricating a number would be
/// worse than admitting the estimate is unavailable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignedResource {
    pub resource_id: Uuid,
    pub kind: ResourceKind,
    pub name: String,
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferredChannel {
    Sms,
    Email,
    Both,
}

impl PreferredChannel {
    pub fn wants_sms(&self) -> bool {
        matches!(self, PreferredChannel::Sms | PreferredChannel::Both)
    }

    pub fn wants_email(&self) -> bool {
        matches!(self, PreferredChannel::Email | PreferredChannel::Both)
    }
}

/// A contactable government agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Responder {
    pub id: Uuid,
    pub name: String,
    pub on_duty: bool,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub preferred_channel: PreferredChannel,
}

/// A citizen-reported dog safety event. Owned by the record store; the triage
/// engine reads it and partially updates it, never deletes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub id: Uuid,
    pub severity: Severity,
    pub location: Location,
    pub description: String,
    pub status: IncidentStatus,
    pub priority_score: Option<u8>,
    pub escalation_status: EscalationStatus,
    pub created_at: DateTime<Utc>,
    pub last_action_at: Option<DateTime<Utc>>,
    pub recommendations: Vec<Recommendation>,
    pub assigned_resources: Vec<AssignedResource>,
    pub contacted_responders: Vec<Uuid>,
}

impl Incident {
    /// Hours since the last human or automated action, falling back to
    /// creation time if the incident was never actioned.
    pub fn hours_idle(&self, now: DateTime<Utc>) -> f64 {
        let since = self.last_action_at.unwrap_or(self.created_at);
        (now - since).num_seconds() as f64 / 3600.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionCategory {
    Safety,
    Priority,
    Resource,
    Similar,
    Guidance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuggestionPriority {
    Low,
    Medium,
    High,
    Critical,
}

impl SuggestionPriority {
    /// Sort rank: critical first.
    pub fn rank(&self) -> u8 {
        match self {
            SuggestionPriority::Critical => 0,
            SuggestionPriority::High => 1,
            SuggestionPriority::Medium => 2,
            SuggestionPriority::Low => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAction {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Ephemeral advisory shown while a report is still being drafted. Never
/// written to the incident record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvisorySuggestion {
    pub id: Uuid,
    pub category: SuggestionCategory,
    pub title: String,
    pub message: String,
    pub confidence: f64,
    pub priority: SuggestionPriority,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<SuggestedAction>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn escalation_status_orders_forward() {
        assert!(EscalationStatus::Normal < EscalationStatus::Escalated);
        assert!(EscalationStatus::Escalated < EscalationStatus::AutoContacted);
    }

    #[test]
    fn hours_idle_falls_back_to_creation_time() {
        let now = Utc::now();
        let incident = Incident {
            id: Uuid::new_v4(),
            severity: Severity::Minor,
            location: Location {
                address: "12 Elm St".to_string(),
                latitude: None,
                longitude: None,
            },
            description: "loose dog".to_string(),
            status: IncidentStatus::Reported,
            priority_score: None,
            escalation_status: EscalationStatus::Normal,
            created_at: now - Duration::hours(30),
            last_action_at: None,
            recommendations: vec![],
            assigned_resources: vec![],
            contacted_responders: vec![],
        };
        assert!((incident.hours_idle(now) - 30.0).abs() < 0.01);

        let actioned = Incident {
            last_action_at: Some(now - Duration::hours(2)),
            ..incident
        };
        assert!((actioned.hours_idle(now) - 2.0).abs() < 0.01);
    }

    #[test]
    fn severity_maps_to_required_resource_kinds() {
        assert_eq!(
            Severity::Severe.required_resource_kinds(),
            vec![
                ResourceKind::Rescue,
                ResourceKind::Veterinary,
                ResourceKind::AnimalControl
            ]
        );
        assert_eq!(
            Severity::Moderate.required_resource_kinds(),
            vec![ResourceKind::Rescue, ResourceKind::AnimalControl]
        );
        assert_eq!(
            Severity::Minor.required_resource_kinds(),
            vec![ResourceKind::AnimalControl]
        );
    }
}
