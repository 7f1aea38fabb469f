use std::env;

use async_trait::async_trait;
use sendgrid::SGClient;
use sendgrid::{Destination, Mail};
use tracing::{error, info, warn};

/// Outbound notification transport. Each channel returns whether the send
/// succeeded; an unconfigured transport reports `false` immediately instead
/// of erroring, so the dispatcher can fall through to the other channel.
#[async_trait]
pub trait NotificationGateway: Send + Sync {
    async fn send_sms(&self, to_number: &str, body: &str) -> bool;
    async fn send_email(&self, to_address: &str, subject: &str, body: &str) -> bool;
}

#[derive(Clone)]
pub struct TwilioGateway {
    sendgrid_client: Option<SGClient>,
    twilio_client: Option<twilio::Client>,
    sms_from: String,
    email_from: String,
}

impl TwilioGateway {
    pub fn from_env() -> Self {
        let sendgrid_api_key = env::var("TWILIO_SENDGRID_API_KEY").ok();
        let twilio_account_sid = env::var("TWILIO_ACCOUNT_SID").ok();
        let twilio_auth_token = env::var("TWILIO_AUTH_TOKEN").ok();
        let sms_from = env::var("TWILIO_SMS_FROM_NUMBER").unwrap_or_default();
        let email_from = env::var("NOTIFICATION_EMAIL_FROM")
            .unwrap_or_else(|_| "alerts@dogwatch.gov".to_string());

        let sendgrid_client = sendgrid_api_key.map(SGClient::new);

        let twilio_client =
            if let (Some(sid), Some(token)) = (twilio_account_sid, twilio_auth_token) {
                Some(twilio::Client::new(&sid, &token))
            } else {
                None
            };

        if sendgrid_client.is_none() {
            warn!("SendGrid API key not found; email channel disabled");
        }
        if twilio_client.is_none() {
            warn!("Twilio credentials not found; SMS channel disabled");
        }

        Self {
            sendgrid_client,
            twilio_client,
            sms_from,
            email_from,
        }
    }
}

#[async_trait]
impl NotificationGateway for TwilioGateway {
    async fn send_sms(&self, to_number: &str, body: &str) -> bool {
        let Some(client) = &self.twilio_client else {
            warn!("SMS transport not configured; skipping send to {}", to_number);
            return false;
        };
        if self.sms_from.is_empty() {
            warn!("TWILIO_SMS_FROM_NUMBER not set; skipping send to {}", to_number);
            return false;
        }

        match client
            .send_message(twilio::OutboundMessage::new(&self.sms_from, to_number, body))
            .await
        {
            Ok(_) => {
                info!("SMS sent to {}", to_number);
                crate::metrics::increment_notifications_sent("sms");
                true
            }
            Err(e) => {
                error!("Failed to send SMS to {}: {}", to_number, e);
                crate::metrics::increment_notifications_failed("sms");
                false
            }
        }
    }

    async fn send_email(&self, to_address: &str, subject: &str, body: &str) -> bool {
        let Some(client) = &self.sendgrid_client else {
            warn!(
                "Email transport not configured; skipping send to {}",
                to_address
            );
            return false;
        };

        // The sendgrid client is blocking, and Mail borrows its fields, so
        // everything moves into the blocking task.
        let to_address = to_address.to_string();
        let subject = subject.to_string();
        let body = body.to_string();
        let email_from = self.email_from.clone();
        let client = client.clone();
        let to_address_log = to_address.clone();

        let result = tokio::task::spawn_blocking(move || {
            let mail = Mail::new()
                .add_to(Destination {
                    address: &to_address,
                    name: "Responder",
                })
                .add_from(&email_from)
                .add_subject(&subject)
                .add_html(&body);
            client.send(mail)
        })
        .await;

        match result {
            Ok(Ok(_)) => {
                info!("Email sent to {}", to_address_log);
                crate::metrics::increment_notifications_sent("email");
                true
            }
            Ok(Err(e)) => {
                error!("Failed to send email to {}: {}", to_address_log, e);
                crate::metrics::increment_notifications_failed("email");
                false
            }
            Err(e) => {
                error!("Email send task failed: {}", e);
                crate::metrics::increment_notifications_failed("email");
                false
            }
        }
    }
}
