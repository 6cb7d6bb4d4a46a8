// Numeric slot patterns. All matching runs on lower-cased text.
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

pub const ACRES_PER_HECTARE: f64 = 2.471;

const MAX_AGE: u32 = 120;

static AGE_YEARS_OLD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,3})\s*-?\s*(?:years?|yrs?)\s*-?\s*old\b").unwrap());

static AGE_YEARS_OF_AGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{1,3})\s+(?:years?|yrs?)\s+of\s+age\b").unwrap());

static AGE_AGED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\baged\s+(\d{1,3})\b").unwrap());

static AGE_LABELLED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bage\s*(?:is|:|=|of)?\s*(\d{1,3})\b").unwrap());

static AGE_I_AM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bi(?:\s+am|'m|’m)\s+(\d{1,3})\b(?:\s*-?\s*([a-z]+))?").unwrap()
});

static LAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d+(?:\.\d+)?)\s*(acres?|hectares?|ha|bighas?)\b").unwrap()
});

static INCOME_AFTER_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bincome\b[^\d]{0,30}?(\d[\d,]*(?:\.\d+)?)\s*(lakhs?|lacs?|thousand|crores?)?\b")
        .unwrap()
});

static INCOME_BEFORE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d+(?:\.\d+)?)\s*(lakhs?|lacs?)\b[^.]{0,30}?\bincome\b").unwrap()
});

static WHOLE_TURN_INTEGER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+$").unwrap());

/// Words that make "I am 5 ..." a quantity rather than an age
const UNIT_WORDS: &[&str] = &[
    "acre", "acres", "hectare", "hectares", "ha", "bigha", "bighas", "lakh", "lakhs", "lac",
    "lacs", "crore", "crores", "thousand", "rupees", "rs", "kg", "km", "percent", "months",
    "month", "days", "cows", "cattle", "goats",
];

/// An age and the span of text that stated it
#[derive(Debug, Clone, PartialEq)]
pub struct AgeMatch {
    pub age: u32,
    pub span: Range<usize>,
}

pub fn find_age(text: &str) -> Option<AgeMatch> {
    for pattern in [&*AGE_YEARS_OLD, &*AGE_YEARS_OF_AGE, &*AGE_AGED, &*AGE_LABELLED] {
        for caps in pattern.captures_iter(text) {
            if let Some(found) = age_from(&caps) {
                return Some(found);
            }
        }
    }

    for caps in AGE_I_AM.captures_iter(text) {
        let followed_by_unit = caps
            .get(2)
            .map(|w| UNIT_WORDS.contains(&w.as_str()) || w.as_str().starts_with("year"))
            .unwrap_or(false);
        if followed_by_unit {
            continue;
        }
        if let Some(mut found) = age_from(&caps) {
            // the trailing word is not part of the age statement
            if let Some(number) = caps.get(1) {
                found.span.end = number.end();
            }
            return Some(found);
        }
    }
    None
}

fn age_from(caps: &regex::Captures<'_>) -> Option<AgeMatch> {
    let whole = caps.get(0)?;
    let age: u32 = caps.get(1)?.as_str().parse().ok()?;
    if age == 0 || age > MAX_AGE {
        return None;
    }
    Some(AgeMatch {
        age,
        span: whole.range(),
    })
}

/// Land holding in acres plus the span it was read from
pub fn find_land(text: &str) -> Option<(f64, Range<usize>)> {
    let caps = LAND.captures(text)?;
    let value: f64 = caps.get(1)?.as_str().parse().ok()?;
    let unit = caps.get(2)?.as_str();
    let acres = if unit.starts_with('h') {
        value * ACRES_PER_HECTARE
    } else {
        // acres, and bighas which are recorded as given
        value
    };
    Some((acres, caps.get(0)?.range()))
}

/// Annual income in rupees
pub fn find_income(text: &str) -> Option<f64> {
    if let Some(caps) = INCOME_AFTER_KEYWORD.captures(text) {
        let amount = parse_amount(caps.get(1)?.as_str())?;
        return Some(amount * multiplier(caps.get(2).map(|m| m.as_str())));
    }
    let caps = INCOME_BEFORE_KEYWORD.captures(text)?;
    let amount = parse_amount(caps.get(1)?.as_str())?;
    Some(amount * multiplier(caps.get(2).map(|m| m.as_str())))
}

fn parse_amount(raw: &str) -> Option<f64> {
    raw.replace(',', "").parse().ok()
}

fn multiplier(unit: Option<&str>) -> f64 {
    match unit {
        Some(u) if u.starts_with("lakh") || u.starts_with("lac") => 100_000.0,
        Some(u) if u.starts_with("crore") => 10_000_000.0,
        Some("thousand") => 1_000.0,
        _ => 1.0,
    }
}

/// The turn as a menu selection, when the whole turn is one integer literal
pub fn bare_integer(turn: &str) -> Option<i64> {
    let trimmed = turn.trim();
    if WHOLE_TURN_INTEGER.is_match(trimmed) {
        trimmed.parse().ok()
    } else {
        None
    }
}

/// Blank out `span` in place so later patterns cannot read it again
pub fn mask(text: &mut String, span: Range<usize>) {
    let width = span.len();
    text.replace_range(span, &" ".repeat(width));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_forms() {
        assert_eq!(find_age("i'm 45 years old").map(|m| m.age), Some(45));
        assert_eq!(find_age("a 30-year-old farmer").map(|m| m.age), Some(30));
        assert_eq!(find_age("age 62").map(|m| m.age), Some(62));
        assert_eq!(find_age("my age is 38").map(|m| m.age), Some(38));
        assert_eq!(find_age("aged 50, from goa").map(|m| m.age), Some(50));
        assert_eq!(find_age("55 years of age").map(|m| m.age), Some(55));
        assert_eq!(find_age("i am 41 and grow rice").map(|m| m.age), Some(41));
    }

    #[test]
    fn test_i_am_followed_by_unit_is_not_age() {
        assert_eq!(find_age("i am 5 acres short"), None);
        assert_eq!(find_age("i'm 2 lakh in debt"), None);
    }

    #[test]
    fn test_implausible_age_is_ignored() {
        assert_eq!(find_age("age 0"), None);
        assert_eq!(find_age("age 450"), None);
    }

    #[test]
    fn test_land_units() {
        assert_eq!(find_land("i own 3 acres").map(|(a, _)| a), Some(3.0));
        let (hectares, _) = find_land("2 hectares of paddy").unwrap();
        assert!((hectares - 4.942).abs() < 1e-9);
        assert_eq!(find_land("5 bighas").map(|(a, _)| a), Some(5.0));
        assert_eq!(find_land("no land"), None);
    }

    #[test]
    fn test_income_forms() {
        assert_eq!(find_income("annual income is 1.5 lakh"), Some(150_000.0));
        assert_eq!(find_income("income 80,000"), Some(80_000.0));
        assert_eq!(find_income("2 lakh yearly income"), Some(200_000.0));
        assert_eq!(find_income("we earn well"), None);
    }

    #[test]
    fn test_bare_integer() {
        assert_eq!(bare_integer(" 3 "), Some(3));
        assert_eq!(bare_integer("-1"), Some(-1));
        assert_eq!(bare_integer("scheme 3 please"), None);
        assert_eq!(bare_integer("3.5"), None);
        assert_eq!(bare_integer(""), None);
    }

    #[test]
    fn test_mask_preserves_offsets() {
        let mut text = "age 45 with 2 acres".to_string();
        let found = find_age(&text).unwrap();
        mask(&mut text, found.span);
        assert_eq!(text.len(), "age 45 with 2 acres".len());
        assert_eq!(find_age(&text), None);
        assert_eq!(find_land(&text).map(|(a, _)| a), Some(2.0));
    }
}
