//! # Yojana Interpret
//!
//! Turn interpretation for the Yojana engine: rule-based slot extraction
//! (state, age, land, income, subcategory, scope, target group, crops and
//! bare menu selections) with an optional [`LanguageUnderstandingService`]
//! consulted under a timeout.
//!
//! ```rust
//! use yojana_interpret::{RuleExtractor, Vocabulary};
//!
//! let partial = RuleExtractor::new()
//!     .extract("45 years old, 3 acres in Goa", Vocabulary::default())
//!     .unwrap();
//! assert_eq!(partial.state.as_deref(), Some("Goa"));
//! assert_eq!(partial.age, Some(45));
//! assert_eq!(partial.land_size_acres, Some(3.0));
//! assert_eq!(partial.selection, None);
//! ```

pub mod error;
pub mod gazetteer;
pub mod interpreter;
pub mod keywords;
pub mod patterns;
pub mod rules;
pub mod service;

pub use error::ServiceError;
pub use gazetteer::{Gazetteer, INDIAN_STATES};
pub use interpreter::{QueryInterpreter, Vocabulary, DEFAULT_EXTRACTION_TIMEOUT};
pub use rules::RuleExtractor;
pub use service::LanguageUnderstandingService;
