//! Turn-by-turn profile merging.
//!
//! A turn never clears a field: anything the interpreter did not recognize is
//! `None` in the [`PartialProfile`] and leaves the stored value alone. `state`
//! is only ever replaced by an explicit new state mention.

use crate::profile::{Clarification, PartialProfile, UserProfile};

/// Merge one turn's extraction into the running profile.
///
/// The selection index is not merged here: the caller resolves it against the
/// active catalog first and feeds the resolved subcategory back through
/// `partial.subcategory`.
#[must_use]
pub fn merge(profile: &UserProfile, partial: &PartialProfile, turn_text: &str) -> UserProfile {
    let mut next = profile.clone();

    if let Some(state) = &partial.state {
        next.state = Some(state.clone());
    }
    if let Some(subcategory) = &partial.subcategory {
        next.subcategory = Some(subcategory.clone());
    }
    if let Some(category) = &partial.category {
        next.category = Some(category.clone());
    }
    if let Some(age) = partial.age {
        next.age = Some(age);
    }
    if let Some(land) = partial.land_size_acres {
        next.land_size_acres = Some(land);
    }
    if let Some(income) = partial.income {
        next.income = Some(income);
    }
    if let Some(group) = partial.target_group {
        next.target_group = Some(group);
    }
    if let Some(scope) = partial.scope {
        next.scope = scope;
    }
    for crop in &partial.crops {
        if !next.crops.iter().any(|c| c.eq_ignore_ascii_case(crop)) {
            next.crops.push(crop.clone());
        }
    }

    next.confidence = partial.confidence;
    next.clarification = None;
    next.turn_history.push(turn_text.to_string());
    next
}

/// Record a turn that could not be applied. Every stored field is preserved;
/// only the history grows and the clarification request is set.
#[must_use]
pub fn reject(profile: &UserProfile, turn_text: &str, clarification: Clarification) -> UserProfile {
    let mut next = profile.clone();
    next.turn_history.push(turn_text.to_string());
    next.clarification = Some(clarification);
    next
}
