use serde::{Deserialize, Serialize};

use crate::domain::{AgentKind, Severity};
use crate::triage::TriageAgent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    Immediate,
    Urgent,
    Standard,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendedAction {
    pub action: String,
    pub priority: ActionPriority,
    pub estimated_time: String,
}

impl RecommendedAction {
    fn new(action: &str, priority: ActionPriority, estimated_time: &str) -> Self {
        Self {
            action: action.to_string(),
            priority,
            estimated_time: estimated_time.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RecommenderInput {
    pub severity: Severity,
    pub priority_score: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionPlan {
    pub actions: Vec<RecommendedAction>,
    pub rationale: String,
    pub confidence: f64,
}

pub struct ActionRecommender;

impl TriageAgent for ActionRecommender {
    type Input = RecommenderInput;
    type Output = ActionPlan;

    fn kind(&self) -> AgentKind {
        AgentKind::Action
    }

    // First matching branch wins, evaluated top-down.
    fn evaluate(&self, input: &RecommenderInput) -> ActionPlan {
        let actions = if input.severity == Severity::Severe || input.priority_score >= 8 {
            vec![
                RecommendedAction::new(
                    "Dispatch emergency response team",
                    ActionPriority::Immediate,
                    "within 1 hour",
                ),
                RecommendedAction::new(
                    "Alert nearby medical facilities",
                    ActionPriority::Immediate,
                    "within 1 hour",
                ),
                RecommendedAction::new(
                    "Notify animal containment unit",
                    ActionPriority::Urgent,
                    "within 4 hours",
                ),
            ]
        } else if input.severity == Severity::Moderate || input.priority_score >= 5 {
            vec![
                RecommendedAction::new(
                    "Assign field agent for assessment",
                    ActionPriority::Urgent,
                    "within 8 hours",
                ),
                RecommendedAction::new(
                    "Check shelter availability",
                    ActionPriority::Standard,
                    "within 24 hours",
                ),
            ]
        } else {
            vec![RecommendedAction::new(
                "Schedule routine inspection",
                ActionPriority::Standard,
                "within 72 hours",
            )]
        };

        let immediate = actions
            .iter()
            .any(|a| a.priority == ActionPriority::Immediate);
        let rationale = format!(
            "{} action(s) recommended; immediate response {}",
            actions.len(),
            if immediate { "required" } else { "not required" },
        );

        ActionPlan {
            actions,
            rationale,
            confidence: 0.85,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(severity: Severity, priority_score: u8) -> ActionPlan {
        ActionRecommender.evaluate(&RecommenderInput {
            severity,
            priority_score,
        })
    }

    #[test]
    fn severe_always_includes_an_immediate_action() {
        for score in 1..=10u8 {
            let p = plan(Severity::Severe, score);
            assert!(
                p.actions
                    .iter()
                    .any(|a| a.priority == ActionPriority::Immediate),
                "no immediate action at score {score}"
            );
        }
    }

    #[test]
    fn severe_branch_yields_two_immediate_and_one_urgent() {
        let p = plan(Severity::Severe, 3);
        assert_eq!(p.actions.len(), 3);
        let immediate = p
            .actions
            .iter()
            .filter(|a| a.priority == ActionPriority::Immediate)
            .count();
        assert_eq!(immediate, 2);
        assert_eq!(p.actions[2].priority, ActionPriority::Urgent);
        assert!(p.rationale.contains("immediate response required"));
    }

    #[test]
    fn high_score_escalates_regardless_of_severity() {
        let p = plan(Severity::Minor, 8);
        assert!(p
            .actions
            .iter()
            .any(|a| a.priority == ActionPriority::Immediate));
    }

    #[test]
    fn minor_low_score_gets_exactly_one_standard_action() {
        for score in 1..5u8 {
            let p = plan(Severity::Minor, score);
            assert_eq!(p.actions.len(), 1);
            assert_eq!(p.actions[0].priority, ActionPriority::Standard);
        }
        let p = plan(Severity::Minor, 4);
        assert!(p.rationale.contains("immediate response not required"));
    }

    #[test]
    fn moderate_branch_yields_urgent_then_standard() {
        let p = plan(Severity::Moderate, 3);
        assert_eq!(p.actions.len(), 2);
        assert_eq!(p.actions[0].priority, ActionPriority::Urgent);
        assert_eq!(p.actions[1].priority, ActionPriority::Standard);
    }

    #[test]
    fn minor_with_mid_score_takes_moderate_branch() {
        let p = plan(Severity::Minor, 5);
        assert_eq!(p.actions.len(), 2);
        assert_eq!(p.actions[0].priority, ActionPriority::Urgent);
    }
}
