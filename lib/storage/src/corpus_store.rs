use crate::error::Result;
use parking_lot::RwLock;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;
use yojana_core::{CorpusSnapshot, SchemeRecord};

/// Source of the current corpus snapshot.
///
/// A caller takes one snapshot and uses it for the whole operation, so a
/// concurrent refresh is never observed half-way.
pub trait SchemeCorpusStore: Send + Sync {
    fn snapshot(&self) -> Arc<CorpusSnapshot>;

    /// Install a new corpus under a higher version and return it
    fn replace(&self, records: Vec<SchemeRecord>) -> Arc<CorpusSnapshot>;
}

/// In-memory corpus with atomic, versioned replacement
#[derive(Debug)]
pub struct SharedCorpus {
    current: RwLock<Arc<CorpusSnapshot>>,
}

impl Default for SharedCorpus {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl SharedCorpus {
    pub fn new(records: Vec<SchemeRecord>) -> Self {
        Self {
            current: RwLock::new(Arc::new(CorpusSnapshot::new(1, records))),
        }
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(load_records(path)?))
    }

    /// Swap in a new snapshot; readers holding the old one keep it until they drop it
    pub fn replace(&self, records: Vec<SchemeRecord>) -> Arc<CorpusSnapshot> {
        let mut current = self.current.write();
        let snapshot = Arc::new(CorpusSnapshot::new(current.version() + 1, records));
        *current = snapshot.clone();
        info!(
            version = snapshot.version(),
            schemes = snapshot.len(),
            "corpus snapshot replaced"
        );
        snapshot
    }

    #[inline]
    pub fn version(&self) -> u64 {
        self.current.read().version()
    }
}

impl SchemeCorpusStore for SharedCorpus {
    #[inline]
    fn snapshot(&self) -> Arc<CorpusSnapshot> {
        self.current.read().clone()
    }

    fn replace(&self, records: Vec<SchemeRecord>) -> Arc<CorpusSnapshot> {
        SharedCorpus::replace(self, records)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CorpusFile {
    Records(Vec<SchemeRecord>),
    Wrapped { schemes: Vec<SchemeRecord> },
}

/// Parse scheme records from JSON: either a bare array or `{"schemes": [...]}`
pub fn parse_records(json: &[u8]) -> Result<Vec<SchemeRecord>> {
    let records = match serde_json::from_slice(json)? {
        CorpusFile::Records(records) => records,
        CorpusFile::Wrapped { schemes } => schemes,
    };
    Ok(records)
}

pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<SchemeRecord>> {
    let bytes = fs::read(path.as_ref())?;
    let records = parse_records(&bytes)?;
    info!(path = %path.as_ref().display(), schemes = records.len(), "loaded scheme corpus");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_replace_bumps_version() {
        let corpus = SharedCorpus::new(vec![SchemeRecord::new("a", "A")]);
        let before = corpus.snapshot();
        assert_eq!(before.version(), 1);

        let after = corpus.replace(vec![SchemeRecord::new("b", "B"), SchemeRecord::new("c", "C")]);
        assert_eq!(after.version(), 2);
        assert_eq!(corpus.version(), 2);
        assert_eq!(corpus.snapshot().len(), 2);
        // the old snapshot is untouched
        assert_eq!(before.len(), 1);
        assert!(before.get("a").is_some());
    }

    #[test]
    fn test_parse_both_layouts() {
        let bare = br#"[{"id": "a", "name": "A", "state": "Goa"}]"#;
        let records = parse_records(bare).unwrap();
        assert_eq!(records[0].owning_state.as_deref(), Some("Goa"));

        let wrapped = br#"{"schemes": [{"id": "b", "name": "B"}]}"#;
        assert_eq!(parse_records(wrapped).unwrap()[0].id, "b");

        assert!(parse_records(b"{not json").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"id": "pmfby", "name": "Crop Insurance Scheme", "subcategories": ["Crop insurance"]}}]"#
        )
        .unwrap();

        let corpus = SharedCorpus::from_json_file(file.path()).unwrap();
        let snapshot = corpus.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.vocabulary(), &["Crop insurance".to_string()]);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_records("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
