//! # Yojana Core
//!
//! Core library for the Yojana scheme-discovery engine.
//!
//! This crate provides the data model and the pure, lock-free parts of a turn:
//!
//! - [`SchemeRecord`] - A scheme as held in the corpus
//! - [`CorpusSnapshot`] - Immutable, versioned view of the corpus
//! - [`UserProfile`] / [`PartialProfile`] - Running profile and one turn's extraction
//! - [`CatalogCache`] - Memoized subcategory menus per `(scope, state)`
//! - [`NumberSelectionResolver`] - Bounds-checked menu selection
//! - [`RetrievalEngine`] - Vector ranking with keyword fallback
//! - [`EligibilityAssessor`] - Constraint-based eligibility tagging
//!
//! ## Example
//!
//! ```rust
//! use yojana_core::{CorpusSnapshot, RetrievalEngine, SchemeRecord, UserProfile};
//!
//! let snapshot = CorpusSnapshot::new(1, vec![
//!     SchemeRecord::new("pmfby", "Crop Insurance Scheme"),
//!     SchemeRecord::new("nlm", "Animal Husbandry Grant"),
//! ]);
//!
//! let engine = RetrievalEngine::new();
//! let results = engine.search(&snapshot, &UserProfile::new(), "crop insurance", 10).unwrap();
//! assert_eq!(results[0].scheme_id, "pmfby");
//! ```

pub mod catalog;
pub mod conversation;
pub mod corpus;
pub mod eligibility;
pub mod embedding;
pub mod error;
pub mod filter;
pub mod profile;
pub mod retrieval;
pub mod scheme;
pub mod selection;
pub mod text;
pub mod vector;

pub use catalog::{Catalog, CatalogCache, CatalogKey, Origin, SubcategoryEntry};
pub use corpus::CorpusSnapshot;
pub use eligibility::{EligibilityAssessment, EligibilityAssessor, EligibilityStatus};
pub use embedding::{EmbeddingProvider, HashingEmbedder};
pub use error::{Error, Result};
pub use filter::{Filter, FilterCondition, SchemeFilter};
pub use profile::{Clarification, Confidence, PartialProfile, Scope, TargetGroup, UserProfile};
pub use retrieval::{MatchResult, RankingPath, RetrievalEngine, DEFAULT_TOP_K};
pub use scheme::{EligibilityConstraints, Range, SchemeRecord};
pub use selection::NumberSelectionResolver;
pub use vector::Vector;
