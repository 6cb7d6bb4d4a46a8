use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Scheme corpus is empty or unavailable")]
    DataUnavailable,

    #[error("Ambiguous state: turn mentions {}", .candidates.join(", "))]
    AmbiguousState { candidates: Vec<String> },

    #[error("Selection {requested} is out of range: {available} options available")]
    OutOfRangeSelection { requested: i64, available: usize },

    #[error("Selection was made from menu {produced_by} but the active menu is {active}")]
    SelectionKeyMismatch { produced_by: String, active: String },

    #[error("Unknown subcategory: {0}")]
    UnknownSubcategory(String),

    #[error("Extraction service timed out after {timeout_ms}ms")]
    ExtractionTimeout { timeout_ms: u64 },

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
