use crate::gazetteer::Gazetteer;
use crate::interpreter::Vocabulary;
use crate::{keywords, patterns};
use ahash::AHashSet;
use tracing::debug;
use yojana_core::filter::names_match;
use yojana_core::{Error, PartialProfile, Result};

/// Deterministic, local turn extraction.
///
/// Always available; the interpreter falls back to it whenever the
/// language service is missing, slow or broken.
#[derive(Debug, Clone)]
pub struct RuleExtractor {
    gazetteer: Gazetteer,
}

impl Default for RuleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl RuleExtractor {
    pub fn new() -> Self {
        Self::with_gazetteer(Gazetteer::india())
    }

    pub fn with_gazetteer(gazetteer: Gazetteer) -> Self {
        Self { gazetteer }
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Extract every recognizable field from one turn.
    ///
    /// Fails only with `AmbiguousState` when several distinct states are named.
    pub fn extract(&self, text: &str, vocabulary: Vocabulary<'_>) -> Result<PartialProfile> {
        let mut partial = PartialProfile::default();
        if text.trim().is_empty() {
            return Ok(partial);
        }

        let lower = text.to_lowercase();

        let mut states = self.gazetteer.detect(&lower);
        if states.len() > 1 {
            return Err(Error::AmbiguousState { candidates: states });
        }
        partial.state = states.pop();

        // Age first: a turn that states an age is never a menu selection
        let mut masked = lower.clone();
        match patterns::find_age(&lower) {
            Some(found) => {
                partial.age = Some(found.age);
                patterns::mask(&mut masked, found.span);
            }
            None => partial.selection = patterns::bare_integer(text),
        }

        if let Some((acres, span)) = patterns::find_land(&masked) {
            partial.land_size_acres = Some(acres);
            patterns::mask(&mut masked, span);
        }
        partial.income = patterns::find_income(&masked);

        partial.subcategory = match_subcategory(&lower, vocabulary.subcategories);
        partial.category = match_category(&lower, vocabulary.categories);
        partial.target_group = keywords::target_group(&lower);
        partial.crops = keywords::crops(&lower);
        partial.scope = keywords::scope(&lower);

        debug!(?partial, "rule extraction");
        Ok(partial)
    }
}

/// Match a turn against the corpus subcategory names.
///
/// Tiers, first hit wins: whole phrase (longest name first), every word of
/// more than two letters, more than half of the words of more than three
/// letters, then the keyword table.
pub fn match_subcategory(text: &str, vocabulary: &[String]) -> Option<String> {
    let mut by_length: Vec<&String> = vocabulary.iter().collect();
    by_length.sort_by(|a, b| b.len().cmp(&a.len()));

    if let Some(name) = by_length.iter().find(|name| contains_phrase(text, &name.to_lowercase())) {
        return Some((*name).clone());
    }

    let tokens = words(text);

    let mut best: Option<(&String, usize)> = None;
    for name in &by_length {
        let significant = significant_words(name, 2);
        if significant.is_empty() || !significant.iter().all(|w| word_present(&tokens, w)) {
            continue;
        }
        if best.map(|(_, n)| significant.len() > n).unwrap_or(true) {
            best = Some((*name, significant.len()));
        }
    }
    if let Some((name, _)) = best {
        return Some(name.clone());
    }

    let mut best: Option<(&String, f64)> = None;
    for name in &by_length {
        let significant = significant_words(name, 3);
        if significant.is_empty() {
            continue;
        }
        let hits = significant.iter().filter(|w| word_present(&tokens, w)).count();
        let score = hits as f64 / significant.len() as f64;
        if score > 0.5 && best.map(|(_, s)| score > s).unwrap_or(true) {
            best = Some((*name, score));
        }
    }
    if let Some((name, _)) = best {
        return Some(name.clone());
    }

    keywords::subcategory_keyword(text).find_map(|target| {
        if vocabulary.is_empty() {
            Some(target.to_string())
        } else {
            vocabulary
                .iter()
                .find(|name| name.eq_ignore_ascii_case(target))
                .cloned()
        }
    })
}

/// Category named outright, or through the keyword table when the corpus has it
pub fn match_category(text: &str, categories: &[String]) -> Option<String> {
    let mut by_length: Vec<&String> = categories.iter().collect();
    by_length.sort_by(|a, b| b.len().cmp(&a.len()));
    if let Some(name) = by_length.iter().find(|name| contains_phrase(text, &name.to_lowercase())) {
        return Some((*name).clone());
    }

    keywords::category_keyword(text).find_map(|target| {
        categories
            .iter()
            .find(|name| names_match(name, target))
            .cloned()
    })
}

/// `phrase` occurs in `text` with non-alphanumeric characters (or the ends) on both sides
fn contains_phrase(text: &str, phrase: &str) -> bool {
    if phrase.is_empty() {
        return false;
    }
    text.match_indices(phrase).any(|(start, _)| {
        let before = text[..start].chars().next_back();
        let after = text[start + phrase.len()..].chars().next();
        !before.map(char::is_alphanumeric).unwrap_or(false)
            && !after.map(char::is_alphanumeric).unwrap_or(false)
    })
}

fn words(text: &str) -> AHashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn significant_words(name: &str, min_len: usize) -> Vec<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > min_len)
        .map(str::to_lowercase)
        .collect()
}

// plural forms count as the word itself
fn word_present(tokens: &AHashSet<String>, word: &str) -> bool {
    tokens.contains(word)
        || tokens.contains(&format!("{word}s"))
        || tokens.contains(&format!("{word}es"))
}
