use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use yojana_core::embedding::DEFAULT_EMBEDDING_DIM;
use yojana_core::{Error, DEFAULT_TOP_K};

/// Engine tuning knobs. Every field has a default, so a config file only
/// needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Results returned by `find_schemes` when the caller gives no `top_k`
    pub default_top_k: usize,
    /// Upper bound on one language-service call
    pub extraction_timeout_ms: u64,
    pub session_idle_timeout_secs: u64,
    pub eviction_interval_secs: u64,
    /// Dimension of the built-in hashing embedder
    pub embedding_dim: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_top_k: DEFAULT_TOP_K,
            extraction_timeout_ms: 2_000,
            session_idle_timeout_secs: 30 * 60,
            eviction_interval_secs: 60,
            embedding_dim: DEFAULT_EMBEDDING_DIM,
        }
    }
}

impl EngineConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(yojana_storage::Error::from)?;
        let config: EngineConfig = serde_json::from_slice(&bytes).map_err(|e| {
            Error::InvalidConfig(format!("{}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> yojana_core::Result<()> {
        let zero = [
            ("default_top_k", self.default_top_k == 0),
            ("extraction_timeout_ms", self.extraction_timeout_ms == 0),
            ("session_idle_timeout_secs", self.session_idle_timeout_secs == 0),
            ("eviction_interval_secs", self.eviction_interval_secs == 0),
            ("embedding_dim", self.embedding_dim == 0),
        ];
        match zero.iter().find(|(_, is_zero)| *is_zero) {
            Some((field, _)) => Err(Error::InvalidConfig(format!("{field} must be greater than zero"))),
            None => Ok(()),
        }
    }

    #[inline]
    pub fn extraction_timeout(&self) -> Duration {
        Duration::from_millis(self.extraction_timeout_ms)
    }

    #[inline]
    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_secs)
    }

    #[inline]
    pub fn eviction_interval(&self) -> Duration {
        Duration::from_secs(self.eviction_interval_secs)
    }
}
