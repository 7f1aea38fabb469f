use serde::{Deserialize, Serialize};

use crate::domain::{AgentKind, Severity};
use crate::triage::TriageAgent;

/// Urgency label derived from the 1-10 priority score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    /// Threshold table: >=9 critical, >=7 high, >=4 medium, else low.
    pub fn for_score(score: u8) -> Self {
        if score >= 9 {
            Urgency::Critical
        } else if score >= 7 {
            Urgency::High
        } else if score >= 4 {
            Urgency::Medium
        } else {
            Urgency::Low
        }
    }

    /// Uppercase urgency word used in outbound notification payloads.
    pub fn as_upper(&self) -> &'static str {
        match self {
            Urgency::Critical => "CRITICAL",
            Urgency::High => "HIGH",
            Urgency::Medium => "MEDIUM",
            Urgency::Low => "LOW",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Urgency::Critical => "🚨",
            Urgency::High => "⚠️",
            Urgency::Medium => "📢",
            Urgency::Low => "ℹ️",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScorerInput {
    pub severity: Severity,
    /// Bounded small integer, 0..=3. Derived by the caller from incident
    /// density at the same address.
    pub location_risk: u8,
    pub age_hours: f64,
    /// Bounded small integer, 0..=2. Higher means fewer matching resources
    /// are available.
    pub resource_pressure: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScoreOutput {
    pub score: u8,
    pub urgency: Urgency,
    pub rationale: String,
    pub confidence: f64,
}

/// Discrete, saturating age contribution. An incident that sits unactioned
/// keeps climbing until the step table tops out.
fn time_urgency(age_hours: f64) -> u8 {
    if age_hours < 6.0 {
        2
    } else if age_hours < 24.0 {
        3
    } else {
        4
    }
}

pub struct PriorityScorer;

impl TriageAgent for PriorityScorer {
    type Input = ScorerInput;
    type Output = ScoreOutput;

    fn kind(&self) -> AgentKind {
        AgentKind::Priority
    }

    fn evaluate(&self, input: &ScorerInput) -> ScoreOutput {
        let age_step = time_urgency(input.age_hours);
        let raw = input.severity.weight() + input.location_risk + age_step + input.resource_pressure;
        let score = raw.clamp(1, 10);
        let urgency = Urgency::for_score(score);

        let rationale = format!(
            "{} severity (+{}), location risk +{}, age {:.0}h (+{}), resource pressure +{} -> priority {}/10 ({})",
            input.severity,
            input.severity.weight(),
            input.location_risk,
            input.age_hours,
            age_step,
            input.resource_pressure,
            score,
            urgency.as_upper(),
        );

        ScoreOutput {
            score,
            urgency,
            rationale,
            confidence: 0.9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(severity: Severity, location_risk: u8, age_hours: f64, pressure: u8) -> ScoreOutput {
        PriorityScorer.evaluate(&ScorerInput {
            severity,
            location_risk,
            age_hours,
            resource_pressure: pressure,
        })
    }

    #[test]
    fn score_stays_in_range_for_all_inputs() {
        for severity in [Severity::Minor, Severity::Moderate, Severity::Severe] {
            for risk in 0..=3u8 {
                for pressure in 0..=2u8 {
                    for age in [0.0, 5.9, 6.0, 23.9, 24.0, 100.0, 10_000.0] {
                        let out = score(severity, risk, age, pressure);
                        assert!(
                            (1..=10).contains(&out.score),
                            "score {} out of range for {severity:?} risk={risk} age={age} pressure={pressure}",
                            out.score
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn urgency_boundary_table_is_exact() {
        assert_eq!(Urgency::for_score(9), Urgency::Critical);
        assert_eq!(Urgency::for_score(8), Urgency::High);
        assert_eq!(Urgency::for_score(7), Urgency::High);
        assert_eq!(Urgency::for_score(6), Urgency::Medium);
        assert_eq!(Urgency::for_score(4), Urgency::Medium);
        assert_eq!(Urgency::for_score(3), Urgency::Low);
        assert_eq!(Urgency::for_score(10), Urgency::Critical);
        assert_eq!(Urgency::for_score(1), Urgency::Low);
    }

    #[test]
    fn severe_fresh_incident_clamps_at_ten() {
        // Severe(3) + risk 3 + fresh age step 2 + pressure 2 = 10.
        let out = score(Severity::Severe, 3, 0.0, 2);
        assert_eq!(out.score, 10);
        assert_eq!(out.urgency, Urgency::Critical);
    }

    #[test]
    fn time_urgency_saturates() {
        assert_eq!(time_urgency(0.0), 2);
        assert_eq!(time_urgency(6.0), 3);
        assert_eq!(time_urgency(24.0), 4);
        assert_eq!(time_urgency(24.0 * 365.0), 4);
    }

    #[test]
    fn rationale_names_the_score_and_urgency() {
        let out = score(Severity::Moderate, 0, 1.0, 0);
        assert!(out.rationale.contains(&format!("priority {}/10", out.score)));
        assert!(out.rationale.contains(out.urgency.as_upper()));
    }
}
