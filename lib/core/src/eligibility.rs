//! Rule-based eligibility classification.
//!
//! Each structured constraint a scheme declares is checked against the
//! profile and comes out as pass, unknown (profile lacks the field) or fail.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{SchemeRecord, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityStatus {
    LikelyEligible,
    PossiblyEligible,
    Unlikely,
    /// The scheme declares no structured constraints
    Unknown,
}

impl EligibilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EligibilityStatus::LikelyEligible => "likely_eligible",
            EligibilityStatus::PossiblyEligible => "possibly_eligible",
            EligibilityStatus::Unlikely => "unlikely",
            EligibilityStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EligibilityStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOutcome {
    Pass,
    Unknown,
    Fail,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityAssessment {
    pub status: EligibilityStatus,
    pub reasons: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EligibilityAssessor;

impl EligibilityAssessor {
    pub fn new() -> Self {
        Self
    }

    pub fn assess(&self, profile: &UserProfile, scheme: &SchemeRecord) -> EligibilityStatus {
        self.explain(profile, scheme).status
    }

    /// Status plus one reason line per evaluated constraint
    pub fn explain(&self, profile: &UserProfile, scheme: &SchemeRecord) -> EligibilityAssessment {
        let constraints = &scheme.eligibility_constraints;
        let mut outcomes = Vec::new();
        let mut reasons = Vec::new();

        if let Some(range) = constraints.age.filter(|r| !r.is_open()) {
            let (outcome, reason) = match profile.age {
                None => (ConstraintOutcome::Unknown, "Age not provided".to_string()),
                Some(age) if range.contains(age) => {
                    (ConstraintOutcome::Pass, format!("Age {age} meets the requirement"))
                }
                Some(age) => match (range.min, range.max) {
                    (Some(min), _) if age < min => {
                        (ConstraintOutcome::Fail, format!("Age {age} is below the minimum {min}"))
                    }
                    (_, Some(max)) => {
                        (ConstraintOutcome::Fail, format!("Age {age} is above the maximum {max}"))
                    }
                    _ => (ConstraintOutcome::Fail, format!("Age {age} is outside the allowed range")),
                },
            };
            outcomes.push(outcome);
            reasons.push(reason);
        }

        if let Some(range) = constraints.land_acres.filter(|r| !r.is_open()) {
            let (outcome, reason) = match profile.land_size_acres {
                None => (ConstraintOutcome::Unknown, "Land size not provided".to_string()),
                Some(land) if range.contains(land) => (
                    ConstraintOutcome::Pass,
                    format!("Land size {land} acres meets the requirement"),
                ),
                Some(land) => (
                    ConstraintOutcome::Fail,
                    format!("Land size {land} acres is outside the allowed range"),
                ),
            };
            outcomes.push(outcome);
            reasons.push(reason);
        }

        if let Some(ceiling) = constraints.income_ceiling {
            let (outcome, reason) = match profile.income {
                None => (ConstraintOutcome::Unknown, "Income not provided".to_string()),
                Some(income) if income <= ceiling => {
                    (ConstraintOutcome::Pass, "Income within the limit".to_string())
                }
                Some(_) => (
                    ConstraintOutcome::Fail,
                    format!("Income exceeds the limit of {ceiling}"),
                ),
            };
            outcomes.push(outcome);
            reasons.push(reason);
        }

        if !constraints.target_groups.is_empty() {
            let (outcome, reason) = match profile.target_group {
                None => (ConstraintOutcome::Unknown, "Target group not specified".to_string()),
                Some(group) if constraints.target_groups.contains(&group) => {
                    (ConstraintOutcome::Pass, format!("Target group {group} matches"))
                }
                Some(group) => (
                    ConstraintOutcome::Fail,
                    format!("Scheme is not meant for target group {group}"),
                ),
            };
            outcomes.push(outcome);
            reasons.push(reason);
        }

        let status = classify(&outcomes);
        if outcomes.is_empty() {
            reasons.push("No eligibility criteria available".to_string());
        }
        EligibilityAssessment { status, reasons }
    }
}

/// Fold per-constraint outcomes into an overall status
pub fn classify(outcomes: &[ConstraintOutcome]) -> EligibilityStatus {
    if outcomes.is_empty() {
        EligibilityStatus::Unknown
    } else if outcomes.contains(&ConstraintOutcome::Fail) {
        EligibilityStatus::Unlikely
    } else if outcomes.contains(&ConstraintOutcome::Unknown) {
        EligibilityStatus::PossiblyEligible
    } else {
        EligibilityStatus::LikelyEligible
    }
}
