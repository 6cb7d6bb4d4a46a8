//! # Yojana
//!
//! A conversational engine for finding government schemes. Over several
//! turns it builds a farmer's profile (state, age, land, income, target
//! group, crops and the kind of support wanted), offers a numbered menu of
//! subcategories for their state and scope, and ranks schemes by relevance
//! with an eligibility verdict for each.
//!
//! ## Quick Start
//!
//! ### From the command line
//!
//! ```bash
//! yojana --corpus schemes.json
//! > I'm 45 years old from Himachal Pradesh, need animal husbandry schemes
//! > :schemes
//! ```
//!
//! ### As a Library
//!
//! ```rust
//! use yojana::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let engine = SchemeEngine::with_records(vec![
//!     SchemeRecord::new("pmfby", "Crop Insurance Scheme").with_subcategories(["Crop insurance"]),
//! ])
//! .unwrap();
//!
//! let session = SessionId::generate();
//! let profile = engine.interpret_turn(&session, "I need crop insurance").await.unwrap();
//! assert_eq!(profile.subcategory.as_deref(), Some("Crop insurance"));
//!
//! let results = engine.find_schemes(&session, None).await.unwrap();
//! assert_eq!(results[0].scheme_id, "pmfby");
//! # }
//! ```
//!
//! ## Crate Structure
//!
//! - `yojana-core` - Scheme records, profiles, catalogs, retrieval and eligibility
//! - `yojana-interpret` - Rule extraction and the language-service strategy
//! - `yojana-storage` - Corpus snapshots and session store
//! - `yojana-engine` - The session-aware [`SchemeEngine`]

// Re-export core types
pub use yojana_core::{
    Catalog, CatalogCache, Clarification, Confidence, CorpusSnapshot, EligibilityStatus,
    EmbeddingProvider, HashingEmbedder, MatchResult, PartialProfile, RankingPath, RetrievalEngine,
    SchemeRecord, Scope, SubcategoryEntry, TargetGroup, UserProfile, Vector,
};

// Re-export interpretation
pub use yojana_interpret::{LanguageUnderstandingService, QueryInterpreter, RuleExtractor, ServiceError};

// Re-export storage
pub use yojana_storage::{SchemeCorpusStore, SessionId, SessionStore, SharedCorpus};

// Re-export the engine
pub use yojana_engine::{EngineConfig, Error, Result, SchemeEngine};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        Clarification, EngineConfig, Error, MatchResult, Result, SchemeEngine, SchemeRecord,
        Scope, SessionId, SharedCorpus, UserProfile,
    };
}
