// Keyword tokenization and set overlap for the non-embedding ranking path
use ahash::AHashSet;
use once_cell::sync::Lazy;

static STOP_WORDS: Lazy<AHashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "all", "an", "and", "any", "are", "as", "at", "be", "by", "can", "for",
        "from", "get", "give", "has", "have", "i", "im", "in", "into", "is", "it", "its", "me",
        "my", "need", "of", "on", "or", "our", "please", "show", "that", "the", "their", "them",
        "there", "these", "this", "to", "under", "want", "was", "we", "what", "which", "who",
        "will", "with", "you", "your",
    ]
    .into_iter()
    .collect()
});

/// Lowercase, split on whitespace and punctuation, drop single characters
#[inline]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .map(|s| s.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|s| !s.is_empty() && s.len() > 1)
        .collect()
}

#[inline]
pub fn is_stop_word(token: &str) -> bool {
    STOP_WORDS.contains(token)
}

/// Distinct content tokens of `text`
pub fn token_set(text: &str) -> AHashSet<String> {
    tokenize(text)
        .into_iter()
        .filter(|t| !is_stop_word(t))
        .collect()
}

/// Jaccard similarity |a ∩ b| / |a ∪ b|. Two empty sets are identical.
pub fn jaccard(a: &AHashSet<String>, b: &AHashSet<String>) -> f32 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.union(b).count();

    if union == 0 {
        0.0
    } else {
        intersection as f32 / union as f32
    }
}

/// Jaccard similarity between the content tokens of two texts
pub fn keyword_similarity(a: &str, b: &str) -> f32 {
    jaccard(&token_set(a), &token_set(b))
}
