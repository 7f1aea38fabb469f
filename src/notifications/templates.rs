use crate::domain::Incident;
use crate::triage::Urgency;

/// Wire-contract fields shared by every escalation notification: short
/// incident id (first 8 chars), severity, numeric priority, address, rounded
/// idle hours, and the urgency emoji + word.
pub struct NotificationTemplates;

impl NotificationTemplates {
    pub fn short_id(incident: &Incident) -> String {
        incident.id.to_string().chars().take(8).collect()
    }

    pub fn escalation_subject(incident: &Incident, urgency: Urgency) -> String {
        format!(
            "{} {} dog incident {} requires action",
            urgency.emoji(),
            urgency.as_upper(),
            Self::short_id(incident),
        )
    }

    /// Concise SMS form of the escalation alert.
    pub fn escalation_sms(incident: &Incident, urgency: Urgency, hours_idle: f64) -> String {
        format!(
            "{} {} dog incident {} ({})\nLocation: {}\nPriority: {}/10\nIdle {}h without action - please respond",
            urgency.emoji(),
            urgency.as_upper(),
            Self::short_id(incident),
            incident.severity,
            incident.location.address,
            incident.priority_score.unwrap_or(1),
            hours_idle.round() as i64,
        )
    }

    /// HTML email form of the escalation alert.
    pub fn escalation_email(incident: &Incident, urgency: Urgency, hours_idle: f64) -> String {
        format!(
            r#"
<!DOCTYPE html>
<html>
<head>
    <style>
        body {{ font-family: 'Helvetica Neue', Helvetica, Arial, sans-serif; line-height: 1.6; color: #333; }}
        .container {{ max-width: 600px; margin: 0 auto; padding: 20px; border: 1px solid #ddd; border-radius: 8px; }}
        .header {{ background-color: #dfe6e9; padding: 15px; border-radius: 8px 8px 0 0; text-align: center; }}
        .header h1 {{ margin: 0; color: #2d3436; }}
        .urgency-badge {{ background-color: #d63031; color: white; padding: 5px 10px; border-radius: 4px; font-weight: bold; display: inline-block; margin-top: 10px; }}
        .content {{ padding: 20px; }}
        .detail {{ margin-bottom: 8px; }}
        .footer {{ margin-top: 30px; font-size: 12px; color: #b2bec3; text-align: center; }}
    </style>
</head>
<body>
    <div class="container">
        <div class="header">
            <h1>{emoji} DogWatch Escalation</h1>
            <div class="urgency-badge">{urgency}</div>
        </div>
        <div class="content">
            <p><strong>Incident {short_id} has gone {hours}h without action.</strong></p>
            <div class="detail"><strong>Severity:</strong> {severity}</div>
            <div class="detail"><strong>Priority:</strong> {priority}/10</div>
            <div class="detail"><strong>Location:</strong> {address}</div>
            <div class="detail"><strong>Description:</strong> {description}</div>
        </div>
        <div class="footer">
            <p>Sent by the DogWatch incident escalation service</p>
        </div>
    </div>
</body>
</html>
"#,
            emoji = urgency.emoji(),
            urgency = urgency.as_upper(),
            short_id = Self::short_id(incident),
            hours = hours_idle.round() as i64,
            severity = incident.severity,
            priority = incident.priority_score.unwrap_or(1),
            address = incident.location.address,
            description = incident.description,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EscalationStatus, IncidentStatus, Location, Severity};
    use chrono::Utc;
    use uuid::Uuid;

    fn incident() -> Incident {
        Incident {
            id: Uuid::new_v4(),
            severity: Severity::Severe,
            location: Location {
                address: "5 Oak Ave".to_string(),
                latitude: None,
                longitude: None,
            },
            description: "dog bite reported".to_string(),
            status: IncidentStatus::Reported,
            priority_score: Some(9),
            escalation_status: EscalationStatus::Escalated,
            created_at: Utc::now(),
            last_action_at: None,
            recommendations: vec![],
            assigned_resources: vec![],
            contacted_responders: vec![],
        }
    }

    #[test]
    fn sms_carries_every_wire_contract_field() {
        let i = incident();
        let sms = NotificationTemplates::escalation_sms(&i, Urgency::Critical, 29.6);
        assert!(sms.contains(&NotificationTemplates::short_id(&i)));
        assert_eq!(NotificationTemplates::short_id(&i).len(), 8);
        assert!(sms.contains("Severe"));
        assert!(sms.contains("9/10"));
        assert!(sms.contains("5 Oak Ave"));
        assert!(sms.contains("Idle 30h")); // rounded
        assert!(sms.contains("🚨"));
        assert!(sms.contains("CRITICAL"));
    }

    #[test]
    fn email_and_subject_carry_urgency_word() {
        let i = incident();
        let subject = NotificationTemplates::escalation_subject(&i, Urgency::High);
        assert!(subject.contains("HIGH"));
        assert!(subject.contains("⚠️"));

        let email = NotificationTemplates::escalation_email(&i, Urgency::High, 25.0);
        assert!(email.contains("HIGH"));
        assert!(email.contains("5 Oak Ave"));
        assert!(email.contains("dog bite reported"));
    }
}
