use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;
use yojana_core::{Error, Result};

/// The 28 states plus the union territories schemes are published for
pub const INDIAN_STATES: &[&str] = &[
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Delhi",
    "Jammu and Kashmir",
    "Ladakh",
    "Puducherry",
];

/// Older or informal spellings, mapped to their canonical state
const ALIASES: &[(&str, &str)] = &[
    ("orissa", "Odisha"),
    ("pondicherry", "Puducherry"),
    ("uttaranchal", "Uttarakhand"),
    ("jammu & kashmir", "Jammu and Kashmir"),
];

static INDIA: Lazy<Gazetteer> = Lazy::new(|| Gazetteer::new(INDIAN_STATES.iter().copied()).unwrap());

/// Word-bounded, case-insensitive state name matcher.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    pattern: Regex,
    canonical: AHashMap<String, String>,
}

impl Gazetteer {
    /// Gazetteer over [`INDIAN_STATES`] and the built-in aliases
    pub fn india() -> Self {
        INDIA.clone()
    }

    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut canonical = AHashMap::new();
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() {
                canonical.insert(normalize(name), name.to_string());
            }
        }
        if canonical.is_empty() {
            return Err(Error::InvalidConfig("gazetteer needs at least one state name".into()));
        }
        for (alias, target) in ALIASES {
            if let Some(state) = canonical.get(&normalize(target)).cloned() {
                canonical.insert(normalize(alias), state);
            }
        }

        // Longest names first so "Jammu and Kashmir" wins over any shorter prefix
        let mut keys: Vec<&String> = canonical.keys().collect();
        keys.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        let alternation = keys
            .iter()
            .map(|k| regex::escape(k).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = Regex::new(&format!(r"(?i)\b(?:{alternation})\b"))
            .map_err(|e| Error::InvalidConfig(format!("invalid gazetteer pattern: {e}")))?;

        Ok(Self { pattern, canonical })
    }

    /// Distinct canonical states mentioned in `text`, in order of first mention
    pub fn detect(&self, text: &str) -> Vec<String> {
        let mut found: Vec<String> = Vec::new();
        for m in self.pattern.find_iter(text) {
            if let Some(state) = self.canonical.get(&normalize(m.as_str())) {
                if !found.contains(state) {
                    found.push(state.clone());
                }
            }
        }
        found
    }

    /// Canonical spelling of a state name or alias
    pub fn canonicalize(&self, name: &str) -> Option<&str> {
        self.canonical.get(&normalize(name)).map(String::as_str)
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_multi_word_states() {
        let gazetteer = Gazetteer::india();
        assert_eq!(
            gazetteer.detect("I farm in himachal   pradesh"),
            vec!["Himachal Pradesh".to_string()]
        );
        assert_eq!(gazetteer.detect("from Jammu and Kashmir"), vec!["Jammu and Kashmir".to_string()]);
    }

    #[test]
    fn test_word_bounded() {
        let gazetteer = Gazetteer::india();
        assert!(gazetteer.detect("goats and assamese tea").is_empty());
    }

    #[test]
    fn test_multiple_states_are_reported_once_each() {
        let gazetteer = Gazetteer::india();
        assert_eq!(
            gazetteer.detect("Goa or Kerala, mostly Goa"),
            vec!["Goa".to_string(), "Kerala".to_string()]
        );
    }

    #[test]
    fn test_aliases_canonicalize() {
        let gazetteer = Gazetteer::india();
        assert_eq!(gazetteer.detect("orissa"), vec!["Odisha".to_string()]);
        assert_eq!(gazetteer.canonicalize("PONDICHERRY"), Some("Puducherry"));
        assert_eq!(gazetteer.canonicalize("tamil  nadu"), Some("Tamil Nadu"));
        assert_eq!(gazetteer.canonicalize("Atlantis"), None);
    }

    #[test]
    fn test_empty_gazetteer_is_rejected() {
        assert!(matches!(Gazetteer::new(Vec::<String>::new()), Err(Error::InvalidConfig(_))));
    }
}
