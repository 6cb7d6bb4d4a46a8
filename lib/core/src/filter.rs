// Scheme filters derived from the conversation profile
use crate::{Scope, SchemeRecord, UserProfile};

pub trait Filter {
    fn matches(&self, scheme: &SchemeRecord) -> bool;
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    /// Visibility of a scheme under a scope, relative to the user's state
    Visible { scope: Scope, state: Option<String> },
    Subcategory(String),
    Category(String),
    And(Vec<FilterCondition>),
}

pub struct SchemeFilter {
    condition: FilterCondition,
}

impl SchemeFilter {
    pub fn new(condition: FilterCondition) -> Self {
        Self { condition }
    }

    /// State, scope, subcategory and category restrictions of a profile
    pub fn for_profile(profile: &UserProfile) -> Self {
        let mut conditions = vec![FilterCondition::Visible {
            scope: profile.scope,
            state: profile.state.clone(),
        }];
        if let Some(subcategory) = &profile.subcategory {
            conditions.push(FilterCondition::Subcategory(subcategory.clone()));
        }
        if let Some(category) = &profile.category {
            conditions.push(FilterCondition::Category(category.clone()));
        }
        Self::new(FilterCondition::And(conditions))
    }

    pub fn condition(&self) -> &FilterCondition {
        &self.condition
    }

    fn visible(scheme: &SchemeRecord, scope: Scope, state: Option<&str>) -> bool {
        match (scope, state) {
            (Scope::All, Some(state)) => scheme.is_central() || scheme.is_owned_by(state),
            (Scope::StateOnly, Some(state)) => scheme.is_owned_by(state),
            // no state to attribute state schemes to
            (Scope::StateOnly, None) => false,
            (Scope::All, None) | (Scope::CentralOnly, _) => scheme.is_central(),
        }
    }

    fn matches_condition(condition: &FilterCondition, scheme: &SchemeRecord) -> bool {
        match condition {
            FilterCondition::Visible { scope, state } => {
                Self::visible(scheme, *scope, state.as_deref())
            }
            FilterCondition::Subcategory(name) => matched_subcategory(scheme, name).is_some(),
            FilterCondition::Category(name) => scheme
                .category
                .as_deref()
                .map(|c| names_match(c, name))
                .unwrap_or(false),
            FilterCondition::And(conditions) => {
                conditions.iter().all(|c| Self::matches_condition(c, scheme))
            }
        }
    }
}

impl Filter for SchemeFilter {
    fn matches(&self, scheme: &SchemeRecord) -> bool {
        Self::matches_condition(&self.condition, scheme)
    }
}

/// First subcategory of `scheme` matching `wanted`; exact matches win over fuzzy ones
pub fn matched_subcategory<'a>(scheme: &'a SchemeRecord, wanted: &str) -> Option<&'a str> {
    scheme
        .subcategories
        .iter()
        .find(|s| s.trim().eq_ignore_ascii_case(wanted.trim()))
        .or_else(|| scheme.subcategories.iter().find(|s| names_match(s, wanted)))
        .map(String::as_str)
}

/// Loose name equality: case-insensitive, substring either way, or two shared words
pub fn names_match(a: &str, b: &str) -> bool {
    let a = a.trim().to_lowercase();
    let b = b.trim().to_lowercase();
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b || a.contains(&b) || b.contains(&a) {
        return true;
    }
    let words_a: ahash::AHashSet<&str> = a.split_whitespace().collect();
    let shared = b
        .split_whitespace()
        .collect::<ahash::AHashSet<&str>>()
        .intersection(&words_a)
        .count();
    shared >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<SchemeRecord> {
        vec![
            SchemeRecord::new("goa-dairy", "Goa Dairy Support")
                .with_state("Goa")
                .with_subcategories(["Animal husbandry"]),
            SchemeRecord::new("kerala-fish", "Kerala Fisheries Aid")
                .with_state("Kerala")
                .with_subcategories(["Fishing and hunting"]),
            SchemeRecord::new("pmfby", "Crop Insurance Scheme")
                .with_category("Agriculture,Rural & Environment")
                .with_subcategories(["Crop insurance"]),
        ]
    }

    fn ids(filter: &SchemeFilter) -> Vec<String> {
        corpus()
            .into_iter()
            .filter(|s| filter.matches(s))
            .map(|s| s.id)
            .collect()
    }

    #[test]
    fn test_scope_all_with_state() {
        let profile = UserProfile {
            state: Some("goa".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&SchemeFilter::for_profile(&profile)), vec!["goa-dairy", "pmfby"]);
    }

    #[test]
    fn test_scope_all_without_state() {
        // same pool the menu offers when no state is known
        assert_eq!(ids(&SchemeFilter::for_profile(&UserProfile::new())), vec!["pmfby"]);
    }

    #[test]
    fn test_state_only_and_central_only() {
        let mut profile = UserProfile {
            state: Some("Kerala".to_string()),
            scope: Scope::StateOnly,
            ..Default::default()
        };
        assert_eq!(ids(&SchemeFilter::for_profile(&profile)), vec!["kerala-fish"]);
        profile.scope = Scope::CentralOnly;
        assert_eq!(ids(&SchemeFilter::for_profile(&profile)), vec!["pmfby"]);
        profile.scope = Scope::StateOnly;
        profile.state = None;
        assert!(ids(&SchemeFilter::for_profile(&profile)).is_empty());
    }

    #[test]
    fn test_subcategory_and_category() {
        let profile = UserProfile {
            subcategory: Some("crop insurance".to_string()),
            category: Some("agriculture".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&SchemeFilter::for_profile(&profile)), vec!["pmfby"]);
    }

    #[test]
    fn test_names_match() {
        assert!(names_match("Fishing and hunting", "fishing"));
        assert!(names_match("Land and water resources", "water and land"));
        assert!(!names_match("Irrigation", "Soil health"));
        assert!(!names_match("", "Soil health"));
    }
}
