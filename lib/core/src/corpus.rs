use crate::{Error, Result, SchemeRecord};

/// An immutable, versioned view of the scheme corpus.
///
/// Snapshots are shared behind `Arc` and never mutated; a refresh produces a
/// new snapshot with a higher version.
#[derive(Debug, Clone, Default)]
pub struct CorpusSnapshot {
    version: u64,
    schemes: Vec<SchemeRecord>,
    vocabulary: Vec<String>,
    categories: Vec<String>,
}

impl CorpusSnapshot {
    pub fn new(version: u64, schemes: Vec<SchemeRecord>) -> Self {
        let vocabulary = distinct_sorted(schemes.iter().flat_map(|s| s.subcategories.iter()));
        let categories = distinct_sorted(schemes.iter().filter_map(|s| s.category.as_ref()));
        Self {
            version,
            schemes,
            vocabulary,
            categories,
        }
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn schemes(&self) -> &[SchemeRecord] {
        &self.schemes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&SchemeRecord> {
        self.schemes.iter().find(|s| s.id == id)
    }

    /// Every distinct subcategory name in the corpus, sorted
    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }

    /// Every distinct scheme category in the corpus, sorted
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Fails with `DataUnavailable` when there is nothing to search
    pub fn ensure_available(&self) -> Result<&Self> {
        if self.is_empty() {
            Err(Error::DataUnavailable)
        } else {
            Ok(self)
        }
    }
}

fn distinct_sorted<'a>(values: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut seen = ahash::AHashSet::new();
    let mut names: Vec<String> = Vec::new();
    for name in values {
        let trimmed = name.trim();
        if !trimmed.is_empty() && seen.insert(trimmed.to_lowercase()) {
            names.push(trimmed.to_string());
        }
    }
    names.sort();
    names
}
