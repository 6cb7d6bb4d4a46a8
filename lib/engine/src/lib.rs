//! # Yojana Engine
//!
//! [`SchemeEngine`] ties the pieces together: it keeps one profile per
//! session, interprets each turn, resolves menu selections against the
//! scope/state catalog and ranks schemes for the accumulated profile.

pub mod config;
pub mod engine;
pub mod error;

pub use config::EngineConfig;
pub use engine::SchemeEngine;
pub use error::{Error, Result};
