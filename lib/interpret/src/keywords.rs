// Static keyword tables for the fields that have no numeric form
use once_cell::sync::Lazy;
use regex::Regex;
use yojana_core::{Scope, TargetGroup};

/// Common farmer wording for the corpus subcategory names
pub const SUBCATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("soil health", "Soil health"),
    ("vermi-compost", "Soil health"),
    ("vermicompost", "Soil health"),
    ("compost", "Soil health"),
    ("soil", "Soil health"),
    ("husbandry", "Animal husbandry"),
    ("livestock", "Animal husbandry"),
    ("poultry", "Animal husbandry"),
    ("animal", "Animal husbandry"),
    ("dairy", "Animal husbandry"),
    ("financial", "Financial assistance"),
    ("subsidy", "Financial assistance"),
    ("loan", "Financial assistance"),
    ("fisheries", "Fishing and hunting"),
    ("fishing", "Fishing and hunting"),
    ("fertilizer", "Agricultural Inputs- seeds, fertilizer etc."),
    ("fertiliser", "Agricultural Inputs- seeds, fertilizer etc."),
    ("seeds", "Agricultural Inputs- seeds, fertilizer etc."),
    ("insurance", "Crop insurance"),
    ("irrigation", "Irrigation"),
    ("organic", "Organic farming"),
];

pub const CATEGORY_KEYWORDS: &[(&str, &str)] = &[
    ("agricultur", "Agriculture,Rural & Environment"),
    ("farming", "Agriculture,Rural & Environment"),
    ("rural", "Agriculture,Rural & Environment"),
    ("entrepreneur", "Business & Entrepreneurship"),
    ("start-up", "Business & Entrepreneurship"),
    ("startup", "Business & Entrepreneurship"),
    ("business", "Business & Entrepreneurship"),
    ("scholarship", "Education & Learning"),
    ("education", "Education & Learning"),
    ("housing", "Housing & Shelter"),
    ("skill", "Skills & Employment"),
];

pub const CROPS: &[&str] = &[
    "rice", "paddy", "wheat", "maize", "corn", "sugarcane", "cotton", "jute", "pulses",
    "oilseeds", "soybean", "groundnut", "mustard", "sunflower", "tomato", "potato", "onion",
    "chilli", "vegetables", "fruits", "mango", "banana", "apple", "orange", "grapes",
    "pomegranate", "coconut", "cashew", "tea", "coffee", "rubber", "spices", "dairy", "milk",
    "cattle", "buffalo", "goat", "sheep", "poultry", "chicken", "fish", "aquaculture", "prawn",
    "shrimp",
];

/// Prefix-bounded so plurals ("loans", "animals") still hit
static SUBCATEGORY_TABLE: Lazy<Vec<(Regex, &'static str)>> =
    Lazy::new(|| prefix_table(SUBCATEGORY_KEYWORDS));

static CATEGORY_TABLE: Lazy<Vec<(Regex, &'static str)>> =
    Lazy::new(|| prefix_table(CATEGORY_KEYWORDS));

static CROP_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let words = CROPS.iter().map(|c| regex::escape(c)).collect::<Vec<_>>().join("|");
    Regex::new(&format!(r"\b({words})(?:e?s)?\b")).unwrap()
});

// first match wins, so "small and marginal" lands on SmallFarmer
static TARGET_GROUPS: Lazy<Vec<(Regex, TargetGroup)>> = Lazy::new(|| {
    [
        (r"\b(?:sc|scheduled\s+castes?)\b", TargetGroup::ScheduledCaste),
        (r"\b(?:st|scheduled\s+tribes?)\b", TargetGroup::ScheduledTribe),
        (r"\b(?:obc|other\s+backward\s+class(?:es)?)\b", TargetGroup::Obc),
        (r"\b(?:bpl|below\s+(?:the\s+)?poverty\s+line)\b", TargetGroup::Bpl),
        (r"\b(?:woman|women|female|widow)\b", TargetGroup::Woman),
        (r"\b(?:small\s+farmers?|small\s+and\s+marginal)\b", TargetGroup::SmallFarmer),
        (r"\bmarginal\s+farmers?\b", TargetGroup::MarginalFarmer),
        (r"\blandless\b", TargetGroup::Landless),
        (r"\b(?:disabled|disability|divyang|pwd|handicapped)\b", TargetGroup::Disabled),
        (r"\bgeneral\s+(?:category|caste)\b", TargetGroup::General),
    ]
    .into_iter()
    .map(|(pattern, group)| (Regex::new(pattern).unwrap(), group))
    .collect()
});

static SCOPE_ALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*both\s*$|\bboth\s+(?:state|central|types?|kinds?|schemes?)\b|\b(?:state\s+and\s+central|central\s+and\s+state)\b|\ball\s+schemes\b",
    )
    .unwrap()
});

static SCOPE_STATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bstate\s+(?:schemes?\s+)?only\b|\bonly\s+state\b|\bstate\s+(?:schemes?|government)\b")
        .unwrap()
});

// "union territory" names a place, not a scope
static SCOPE_CENTRAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:central|centre)\b|\bunion\s+(?:government|govt|ministry|schemes?)\b|\bpan[\s-]india\b")
        .unwrap()
});

fn prefix_table(entries: &[(&'static str, &'static str)]) -> Vec<(Regex, &'static str)> {
    let mut sorted: Vec<_> = entries.to_vec();
    sorted.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    sorted
        .into_iter()
        .map(|(keyword, target)| (Regex::new(&format!(r"\b{}", regex::escape(keyword))).unwrap(), target))
        .collect()
}

/// Subcategory named by a table keyword, longest keyword first
pub fn subcategory_keyword(text: &str) -> impl Iterator<Item = &'static str> + '_ {
    SUBCATEGORY_TABLE
        .iter()
        .filter(move |(pattern, _)| pattern.is_match(text))
        .map(|(_, target)| *target)
}

pub fn category_keyword(text: &str) -> impl Iterator<Item = &'static str> + '_ {
    CATEGORY_TABLE
        .iter()
        .filter(move |(pattern, _)| pattern.is_match(text))
        .map(|(_, target)| *target)
}

pub fn target_group(text: &str) -> Option<TargetGroup> {
    TARGET_GROUPS
        .iter()
        .find(|(pattern, _)| pattern.is_match(text))
        .map(|(_, group)| *group)
}

/// Crops in order of mention, title-cased and de-duplicated
pub fn crops(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    for caps in CROP_PATTERN.captures_iter(text) {
        if let Some(word) = caps.get(1) {
            let crop = title_case(word.as_str());
            if !found.contains(&crop) {
                found.push(crop);
            }
        }
    }
    found
}

pub fn scope(text: &str) -> Option<Scope> {
    if SCOPE_ALL.is_match(text) {
        return Some(Scope::All);
    }
    match (SCOPE_STATE.is_match(text), SCOPE_CENTRAL.is_match(text)) {
        (true, true) => Some(Scope::All),
        (true, false) => Some(Scope::StateOnly),
        (false, true) => Some(Scope::CentralOnly),
        (false, false) => None,
    }
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
