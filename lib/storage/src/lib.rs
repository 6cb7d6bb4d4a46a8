//! # Yojana Storage
//!
//! Shared state behind the engine: the scheme corpus as an atomically
//! replaced, versioned snapshot, and the live conversation sessions with
//! idle eviction.

pub mod corpus_store;
pub mod error;
pub mod session;

pub use corpus_store::{load_records, parse_records, SchemeCorpusStore, SharedCorpus};
pub use error::{Error, Result};
pub use session::{Session, SessionId, SessionStore, DEFAULT_IDLE_TIMEOUT};
