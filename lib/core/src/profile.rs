use serde::{Deserialize, Serialize};
use std::fmt;

use crate::catalog::CatalogKey;
use std::str::FromStr;

/// Visibility filter over schemes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    #[default]
    All,
    StateOnly,
    CentralOnly,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::All => "all",
            Scope::StateOnly => "state_only",
            Scope::CentralOnly => "central_only",
        }
    }

    /// Whether state-owned schemes are visible under this scope
    pub fn includes_state(&self) -> bool {
        matches!(self, Scope::All | Scope::StateOnly)
    }

    /// Whether central schemes are visible under this scope
    pub fn includes_central(&self) -> bool {
        matches!(self, Scope::All | Scope::CentralOnly)
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Scope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" | "both" => Ok(Scope::All),
            "state_only" | "state" => Ok(Scope::StateOnly),
            "central_only" | "central" => Ok(Scope::CentralOnly),
            other => Err(format!("unknown scope: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetGroup {
    #[serde(rename = "SC")]
    ScheduledCaste,
    #[serde(rename = "ST")]
    ScheduledTribe,
    #[serde(rename = "OBC")]
    Obc,
    General,
    #[serde(rename = "BPL")]
    Bpl,
    #[serde(alias = "Women")]
    Woman,
    SmallFarmer,
    MarginalFarmer,
    Landless,
    #[serde(alias = "PWD")]
    Disabled,
}

impl TargetGroup {
    pub fn label(&self) -> &'static str {
        match self {
            TargetGroup::ScheduledCaste => "SC",
            TargetGroup::ScheduledTribe => "ST",
            TargetGroup::Obc => "OBC",
            TargetGroup::General => "General",
            TargetGroup::Bpl => "BPL",
            TargetGroup::Woman => "Woman",
            TargetGroup::SmallFarmer => "Small farmer",
            TargetGroup::MarginalFarmer => "Marginal farmer",
            TargetGroup::Landless => "Landless",
            TargetGroup::Disabled => "Disabled",
        }
    }
}

impl fmt::Display for TargetGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TargetGroup {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', '-'], " ");
        match normalized.as_str() {
            "sc" | "scheduled caste" => Ok(TargetGroup::ScheduledCaste),
            "st" | "scheduled tribe" => Ok(TargetGroup::ScheduledTribe),
            "obc" | "other backward class" => Ok(TargetGroup::Obc),
            "general" => Ok(TargetGroup::General),
            "bpl" | "below poverty line" => Ok(TargetGroup::Bpl),
            "woman" | "women" | "female" => Ok(TargetGroup::Woman),
            "small farmer" | "small" => Ok(TargetGroup::SmallFarmer),
            "marginal farmer" | "marginal" => Ok(TargetGroup::MarginalFarmer),
            "landless" => Ok(TargetGroup::Landless),
            "disabled" | "pwd" => Ok(TargetGroup::Disabled),
            other => Err(format!("unknown target group: {other}")),
        }
    }
}

/// Marks whether a turn was understood on the full extraction path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    #[default]
    Normal,
    /// The language service failed or timed out and rules were used instead
    Degraded,
}

/// A question the caller must put back to the user before continuing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Clarification {
    AmbiguousState { candidates: Vec<String> },
    OutOfRangeSelection { requested: i64, available: usize },
    /// The numbers the user saw belong to a menu that is no longer active
    SelectionKeyMismatch { produced_by: String, active: String },
}

impl fmt::Display for Clarification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Clarification::AmbiguousState { candidates } => {
                write!(f, "Which state did you mean: {}?", candidates.join(" or "))
            }
            Clarification::OutOfRangeSelection { requested, available } => write!(
                f,
                "Option {requested} is not on the menu; please pick a number from 1 to {available}"
            ),
            Clarification::SelectionKeyMismatch { .. } => f.write_str(
                "The list of categories has changed since it was shown; please look at the new list and pick again",
            ),
        }
    }
}

/// Fields extracted from a single turn. `None` means "no update this turn".
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PartialProfile {
    pub state: Option<String>,
    pub subcategory: Option<String>,
    pub category: Option<String>,
    pub age: Option<u32>,
    pub land_size_acres: Option<f64>,
    pub income: Option<f64>,
    pub target_group: Option<TargetGroup>,
    pub scope: Option<Scope>,
    #[serde(default)]
    pub crops: Vec<String>,
    /// Bare numeric menu selection; never set when the turn matched an age pattern
    pub selection: Option<i64>,
    #[serde(default)]
    pub confidence: Confidence,
}

impl PartialProfile {
    /// True when nothing at all was recognized
    pub fn is_empty(&self) -> bool {
        self.state.is_none()
            && self.subcategory.is_none()
            && self.category.is_none()
            && self.age.is_none()
            && self.land_size_acres.is_none()
            && self.income.is_none()
            && self.target_group.is_none()
            && self.scope.is_none()
            && self.crops.is_empty()
            && self.selection.is_none()
    }
}

/// The running profile of one conversation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub state: Option<String>,
    pub subcategory: Option<String>,
    pub category: Option<String>,
    pub age: Option<u32>,
    pub land_size_acres: Option<f64>,
    pub income: Option<f64>,
    pub target_group: Option<TargetGroup>,
    pub scope: Scope,
    pub crops: Vec<String>,
    pub turn_history: Vec<String>,
    pub clarification: Option<Clarification>,
    pub confidence: Confidence,
    /// Key of the last menu shown to the user; menu numbers refer to it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub menu: Option<CatalogKey>,
}

impl UserProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn needs_clarification(&self) -> bool {
        self.clarification.is_some()
    }

    /// Profile equality ignoring `turn_history`
    pub fn same_fields(&self, other: &UserProfile) -> bool {
        let mut a = self.clone();
        a.turn_history.clear();
        let mut b = other.clone();
        b.turn_history.clear();
        a == b
    }
}
