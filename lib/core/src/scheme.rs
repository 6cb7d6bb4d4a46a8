use serde::{Deserialize, Deserializer, Serialize};

use crate::profile::TargetGroup;
use crate::vector::Vector;

/// An inclusive numeric range where either bound may be open
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Range<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<T>,
}

impl<T: PartialOrd + Copy> Range<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    pub fn between(min: T, max: T) -> Self {
        Self::new(Some(min), Some(max))
    }

    pub fn at_least(min: T) -> Self {
        Self::new(Some(min), None)
    }

    pub fn at_most(max: T) -> Self {
        Self::new(None, Some(max))
    }

    /// A range with neither bound carries no constraint
    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn contains(&self, value: T) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }
}

/// Structured eligibility rules declared by a scheme. Every part is optional.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EligibilityConstraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<Range<u32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_acres: Option<Range<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub income_ceiling: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_groups: Vec<TargetGroup>,
}

impl EligibilityConstraints {
    /// True when the scheme declares nothing that can be checked
    pub fn is_empty(&self) -> bool {
        self.age.map_or(true, |r| r.is_open())
            && self.land_acres.map_or(true, |r| r.is_open())
            && self.income_ceiling.is_none()
            && self.target_groups.is_empty()
    }
}

/// A government scheme as held in the corpus snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemeRecord {
    pub id: String,
    pub name: String,
    /// `None` marks a central scheme
    #[serde(
        default,
        alias = "state",
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub owning_state: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, alias = "sub_category")]
    pub subcategories: Vec<String>,
    #[serde(default)]
    pub eligibility_constraints: EligibilityConstraints,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub benefit_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vector>,
}

fn empty_as_none<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }))
}

impl SchemeRecord {
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            owning_state: None,
            category: None,
            subcategories: Vec::new(),
            eligibility_constraints: EligibilityConstraints::default(),
            description: String::new(),
            benefit_text: String::new(),
            embedding: None,
        }
    }

    #[must_use]
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.owning_state = Some(state.into());
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_subcategories<I, S>(mut self, subcategories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subcategories = subcategories.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_benefits(mut self, benefit_text: impl Into<String>) -> Self {
        self.benefit_text = benefit_text.into();
        self
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: EligibilityConstraints) -> Self {
        self.eligibility_constraints = constraints;
        self
    }

    #[must_use]
    pub fn with_embedding(mut self, embedding: Vector) -> Self {
        self.embedding = Some(embedding);
        self
    }

    #[inline]
    pub fn is_central(&self) -> bool {
        self.owning_state.is_none()
    }

    #[inline]
    pub fn is_owned_by(&self, state: &str) -> bool {
        self.owning_state
            .as_deref()
            .map_or(false, |owner| owner.eq_ignore_ascii_case(state))
    }

    /// Text used for keyword ranking and on-the-fly embedding
    pub fn search_text(&self) -> String {
        if self.description.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.name, self.description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_range_contains_is_inclusive() {
        let r = Range::between(18u32, 60);
        assert!(r.contains(18));
        assert!(r.contains(60));
        assert!(!r.contains(17));
        assert!(!r.contains(61));
        assert!(Range::<u32>::at_least(18).contains(99));
        assert!(Range::<f64>::at_most(2.0).contains(0.5));
    }

    #[test]
    fn test_empty_state_deserializes_as_central() {
        let record: SchemeRecord = serde_json::from_value(json!({
            "id": "pm-kisan",
            "name": "PM Kisan",
            "state": "",
            "sub_category": ["Financial assistance"]
        }))
        .unwrap();
        assert!(record.is_central());
        assert_eq!(record.subcategories, vec!["Financial assistance".to_string()]);
    }

    #[test]
    fn test_owning_state_is_case_insensitive() {
        let record = SchemeRecord::new("g1", "Goa Dairy").with_state("Goa");
        assert!(record.is_owned_by("goa"));
        assert!(!record.is_owned_by("Kerala"));
    }

    #[test]
    fn test_constraints_emptiness() {
        assert!(EligibilityConstraints::default().is_empty());
        let open = EligibilityConstraints {
            age: Some(Range::new(None, None)),
            ..Default::default()
        };
        assert!(open.is_empty());
        let c = EligibilityConstraints {
            income_ceiling: Some(200_000.0),
            ..Default::default()
        };
        assert!(!c.is_empty());
    }
}
