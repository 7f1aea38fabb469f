use serde::Serialize;

use crate::domain::{AgentKind, AssignedResource, Resource, ResourceKind};
use crate::triage::TriageAgent;

/// At most this many resources are attached to one incident.
pub const MAX_ALLOCATED_RESOURCES: usize = 3;

#[derive(Debug, Clone)]
pub struct AllocatorInput {
    pub priority_score: u8,
    pub required_kinds: Vec<ResourceKind>,
    /// Available candidates already fetched from the pool, pre-filtered to
    /// the required kinds.
    pub candidates: Vec<Resource>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Allocation {
    pub resources: Vec<AssignedResource>,
    pub rationale: String,
    pub confidence: f64,
}

pub struct ResourceAllocator;

impl TriageAgent for ResourceAllocator {
    type Input = AllocatorInput;
    type Output = Allocation;

    fn kind(&self) -> AgentKind {
        AgentKind::Resource
    }

    fn evaluate(&self, input: &AllocatorInput) -> Allocation {
        let resources: Vec<AssignedResource> = input
            .candidates
            .iter()
            .take(MAX_ALLOCATED_RESOURCES)
            .map(|r| AssignedResource {
                resource_id: r.id,
                kind: r.kind,
                name: r.name.clone(),
                // No routing backend; the distance estimate is unavailable.
                distance_km: None,
            })
            .collect();

        let kinds = input
            .required_kinds
            .iter()
            .map(|k| k.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let rationale = format!(
            "Selected {} of {} available resource(s) for kinds [{}] at priority {}/10; distance estimates unavailable",
            resources.len(),
            input.candidates.len(),
            kinds,
            input.priority_score,
        );

        Allocation {
            resources,
            rationale,
            confidence: 0.8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn candidate(kind: ResourceKind, name: &str) -> Resource {
        Resource {
            id: Uuid::new_v4(),
            kind,
            name: name.to_string(),
            available: true,
        }
    }

    #[test]
    fn allocates_at_most_three_resources() {
        let candidates = vec![
            candidate(ResourceKind::Rescue, "Rescue Unit 1"),
            candidate(ResourceKind::Rescue, "Rescue Unit 2"),
            candidate(ResourceKind::Veterinary, "Vet Clinic North"),
            candidate(ResourceKind::AnimalControl, "Control Unit 7"),
            candidate(ResourceKind::AnimalControl, "Control Unit 8"),
        ];
        let allocation = ResourceAllocator.evaluate(&AllocatorInput {
            priority_score: 9,
            required_kinds: vec![
                ResourceKind::Rescue,
                ResourceKind::Veterinary,
                ResourceKind::AnimalControl,
            ],
            candidates,
        });
        assert_eq!(allocation.resources.len(), 3);
    }

    #[test]
    fn distance_is_an_explicit_unavailable_marker() {
        let allocation = ResourceAllocator.evaluate(&AllocatorInput {
            priority_score: 5,
            required_kinds: vec![ResourceKind::AnimalControl],
            candidates: vec![candidate(ResourceKind::AnimalControl, "Control Unit 1")],
        });
        assert!(allocation.resources.iter().all(|r| r.distance_km.is_none()));
    }

    #[test]
    fn empty_pool_yields_empty_allocation_with_rationale() {
        let allocation = ResourceAllocator.evaluate(&AllocatorInput {
            priority_score: 2,
            required_kinds: vec![ResourceKind::AnimalControl],
            candidates: vec![],
        });
        assert!(allocation.resources.is_empty());
        assert!(allocation.rationale.contains("Selected 0 of 0"));
    }
}
