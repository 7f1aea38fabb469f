pub mod cache;

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;
use uuid::Uuid;

use crate::domain::{
    AdvisorySuggestion, Severity, SuggestedAction, SuggestionCategory, SuggestionPriority,
};

pub use cache::{AdvisoryCache, MemoryAdvisoryCache, RedisAdvisoryCache};

/// How long a cached advisory response stays valid. Stale advisory content
/// for a few minutes is an accepted tradeoff.
pub const ADVISORY_CACHE_TTL: Duration = Duration::from_secs(300);

/// Nearby-incident count at which the density suggestion fires.
const NEARBY_DENSITY_THRESHOLD: u32 = 3;

/// Partial form state of a report still being drafted. Everything is
/// optional or defaulted; the citizen may not have filled much in yet.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftFeatures {
    pub severity: Option<Severity>,
    #[serde(default)]
    pub has_location: bool,
    #[serde(default)]
    pub rabies_concern: bool,
    #[serde(default)]
    pub children_at_risk: bool,
    #[serde(default)]
    pub repeat_offender: bool,
    #[serde(default)]
    pub recent_incidents_nearby: u32,
    #[serde(default)]
    pub dog_type: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdvisoryResponse {
    pub suggestions: Vec<AdvisorySuggestion>,
    pub cached: bool,
}

/// Digest over the fields that shape the suggestion set. Location presence
/// and dog type are deliberately excluded: they produce static guidance that
/// does not justify a separate cache entry per address or breed spelling.
pub fn feature_digest(features: &DraftFeatures) -> String {
    let mut hasher = Sha256::new();
    hasher.update(
        format!(
            "{:?}|{}|{}|{}|{}",
            features.severity,
            features.rabies_concern,
            features.repeat_offender,
            features.children_at_risk,
            features.recent_incidents_nearby,
        )
        .as_bytes(),
    );
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn suggestion(
    category: SuggestionCategory,
    priority: SuggestionPriority,
    confidence: f64,
    title: &str,
    message: &str,
    action: Option<SuggestedAction>,
) -> AdvisorySuggestion {
    AdvisorySuggestion {
        id: Uuid::new_v4(),
        category,
        title: title.to_string(),
        message: message.to_string(),
        confidence,
        priority,
        action,
    }
}

/// Independent, order-insensitive rule checks over the draft. Pure; the
/// result is sorted by priority rank (critical first), stable otherwise.
pub fn generate_suggestions(features: &DraftFeatures) -> Vec<AdvisorySuggestion> {
    let mut suggestions = Vec::new();

    match features.severity {
        Some(Severity::Severe) => suggestions.push(suggestion(
            SuggestionCategory::Safety,
            SuggestionPriority::Critical,
            0.95,
            "Keep your distance",
            "This sounds like a dangerous situation. Move yourself and others away from the dog and wait for responders.",
            Some(SuggestedAction {
                label: "Call the animal emergency line".to_string(),
                phone: Some("311".to_string()),
                url: None,
            }),
        )),
        Some(Severity::Moderate) => suggestions.push(suggestion(
            SuggestionCategory::Safety,
            SuggestionPriority::Medium,
            0.85,
            "Avoid approaching the dog",
            "Keep a safe distance and avoid sudden movements while completing this report.",
            None,
        )),
        Some(Severity::Minor) | None => {}
    }

    if features.rabies_concern {
        suggestions.push(suggestion(
            SuggestionCategory::Priority,
            SuggestionPriority::Critical,
            0.95,
            "Possible rabies exposure",
            "If anyone was bitten or scratched, seek medical attention immediately. This report will be prioritized.",
            Some(SuggestedAction {
                label: "Contact public health".to_string(),
                phone: Some("311".to_string()),
                url: None,
            }),
        ));
    }

    if features.children_at_risk {
        suggestions.push(suggestion(
            SuggestionCategory::Priority,
            SuggestionPriority::High,
            0.9,
            "Children in the area",
            "Reports involving children at risk are escalated. Keep children indoors until responders arrive.",
            None,
        ));
    }

    if features.repeat_offender {
        suggestions.push(suggestion(
            SuggestionCategory::Priority,
            SuggestionPriority::High,
            0.8,
            "Previously reported animal",
            "This dog may have prior reports on file, which raises the triage priority of your report.",
            None,
        ));
    }

    if features.recent_incidents_nearby >= NEARBY_DENSITY_THRESHOLD {
        suggestions.push(suggestion(
            SuggestionCategory::Similar,
            SuggestionPriority::Medium,
            0.75,
            "Multiple recent incidents nearby",
            &format!(
                "{} incidents were reported near this area recently. Your report helps responders spot the pattern.",
                features.recent_incidents_nearby
            ),
            None,
        ));
    }

    if !features.has_location {
        suggestions.push(suggestion(
            SuggestionCategory::Guidance,
            SuggestionPriority::Medium,
            0.9,
            "Add a location",
            "A street address or map pin lets responders reach the scene much faster.",
            None,
        ));
    }

    if let Some(dog_type) = features.dog_type.as_deref() {
        if dog_type.eq_ignore_ascii_case("stray") {
            suggestions.push(suggestion(
                SuggestionCategory::Resource,
                SuggestionPriority::Low,
                0.7,
                "Stray pickup available",
                "Animal control can collect stray dogs. Note any identifying marks or a collar in your description.",
                None,
            ));
        } else if !dog_type.is_empty() {
            suggestions.push(suggestion(
                SuggestionCategory::Guidance,
                SuggestionPriority::Low,
                0.6,
                "Describe the dog",
                &format!(
                    "Details about the {dog_type} (size, color, collar) help responders identify it on arrival."
                ),
                None,
            ));
        }
    }

    suggestions.sort_by_key(|s| s.priority.rank());
    suggestions
}

/// Real-time advisory generator consumed while a report is still a draft.
/// Nothing here touches the incident store.
pub struct AdvisoryService {
    cache: Arc<dyn AdvisoryCache>,
}

impl AdvisoryService {
    pub fn new(cache: Arc<dyn AdvisoryCache>) -> Self {
        Self { cache }
    }

    pub async fn suggest(&self, features: &DraftFeatures) -> AdvisoryResponse {
        let key = feature_digest(features);

        if let Some(suggestions) = self.cache.get(&key).await {
            crate::metrics::increment_advisory_cache("hit");
            debug!(key = %key, "advisory served from cache");
            return AdvisoryResponse {
                suggestions,
                cached: true,
            };
        }

        let suggestions = generate_suggestions(features);
        self.cache.set(&key, &suggestions).await;
        crate::metrics::increment_advisory_cache("miss");
        AdvisoryResponse {
            suggestions,
            cached: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn severe_draft() -> DraftFeatures {
        DraftFeatures {
            severity: Some(Severity::Severe),
            has_location: true,
            rabies_concern: true,
            children_at_risk: true,
            repeat_offender: false,
            recent_incidents_nearby: 4,
            dog_type: Some("stray".to_string()),
        }
    }

    #[test]
    fn suggestions_are_sorted_critical_first() {
        let suggestions = generate_suggestions(&severe_draft());
        assert!(suggestions.len() >= 4);
        let ranks: Vec<u8> = suggestions.iter().map(|s| s.priority.rank()).collect();
        let mut sorted = ranks.clone();
        sorted.sort();
        assert_eq!(ranks, sorted);
        assert_eq!(suggestions[0].priority, SuggestionPriority::Critical);
    }

    #[test]
    fn empty_draft_still_gets_location_guidance() {
        let suggestions = generate_suggestions(&DraftFeatures::default());
        assert_eq!(suggestions.len(), 1);
        assert_eq!(suggestions[0].category, SuggestionCategory::Guidance);
        assert_eq!(suggestions[0].title, "Add a location");
    }

    #[test]
    fn digest_ignores_location_and_dog_type() {
        let a = severe_draft();
        let mut b = severe_draft();
        b.has_location = false;
        b.dog_type = None;
        assert_eq!(feature_digest(&a), feature_digest(&b));

        let mut c = severe_draft();
        c.recent_incidents_nearby = 0;
        assert_ne!(feature_digest(&a), feature_digest(&c));
    }

    #[tokio::test]
    async fn identical_drafts_hit_the_cache_within_ttl() {
        let service = AdvisoryService::new(Arc::new(MemoryAdvisoryCache::new(ADVISORY_CACHE_TTL)));
        let first = service.suggest(&severe_draft()).await;
        assert!(!first.cached);
        let second = service.suggest(&severe_draft()).await;
        assert!(second.cached);
        assert_eq!(first.suggestions.len(), second.suggestions.len());
    }

    #[tokio::test]
    async fn expired_entries_recompute() {
        let service = AdvisoryService::new(Arc::new(MemoryAdvisoryCache::new(
            Duration::from_secs(0),
        )));
        service.suggest(&severe_draft()).await;
        let again = service.suggest(&severe_draft()).await;
        assert!(!again.cached);
    }

    #[test]
    fn rabies_concern_outranks_density_suggestion() {
        let features = DraftFeatures {
            rabies_concern: true,
            recent_incidents_nearby: 5,
            has_location: true,
            ..Default::default()
        };
        let suggestions = generate_suggestions(&features);
        assert_eq!(suggestions[0].category, SuggestionCategory::Priority);
        assert_eq!(suggestions[0].priority, SuggestionPriority::Critical);
    }
}
