use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use crate::entities::{incident, resource, responder};

pub async fn init_metrics(db: &DatabaseConnection) {
    let incident_count = incident::Entity::find().count(db).await.unwrap_or(0);
    metrics::gauge!("dogwatch_incidents_total").set(incident_count as f64);

    let resource_count = resource::Entity::find().count(db).await.unwrap_or(0);
    metrics::gauge!("dogwatch_resources_total").set(resource_count as f64);

    let responder_count = responder::Entity::find().count(db).await.unwrap_or(0);
    metrics::gauge!("dogwatch_responders_total").set(responder_count as f64);

    tracing::info!(
        "Initialized metrics: Incidents={}, Resources={}, Responders={}",
        incident_count,
        resource_count,
        responder_count
    );
}

pub fn increment_triage_runs(outcome: &str) {
    metrics::counter!("dogwatch_triage_runs_total", "outcome" => outcome.to_string()).increment(1);
}

pub fn increment_escalations() {
    metrics::counter!("dogwatch_escalations_total").increment(1);
}

pub fn increment_notifications_sent(channel: &str) {
    metrics::counter!("dogwatch_notifications_sent_total", "channel" => channel.to_string())
        .increment(1);
}

pub fn increment_notifications_failed(channel: &str) {
    metrics::counter!("dogwatch_notifications_failed_total", "channel" => channel.to_string())
        .increment(1);
}

pub fn record_dispatch_fanout(contacted: u32, failed: u32) {
    metrics::counter!("dogwatch_responders_contacted_total").increment(contacted as u64);
    metrics::counter!("dogwatch_responders_unreachable_total").increment(failed as u64);
}

pub fn increment_advisory_cache(result: &str) {
    metrics::counter!("dogwatch_advisory_cache_total", "result" => result.to_string()).increment(1);
}
