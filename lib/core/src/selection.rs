use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::{CatalogCache, CatalogKey, SubcategoryEntry};
use crate::{CorpusSnapshot, Error, Result, Scope};

/// Maps menu numbers and names onto the catalog of the active scope/state
#[derive(Clone)]
pub struct NumberSelectionResolver {
    cache: Arc<CatalogCache>,
}

impl NumberSelectionResolver {
    pub fn new(cache: Arc<CatalogCache>) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &Arc<CatalogCache> {
        &self.cache
    }

    /// Resolve a 1-based menu index. Out-of-range indices fail with the
    /// number of available entries; no default entry is ever substituted.
    pub fn resolve(
        &self,
        snapshot: &CorpusSnapshot,
        index: i64,
        scope: Scope,
        state: Option<&str>,
    ) -> Result<SubcategoryEntry> {
        let catalog = self.cache.load(snapshot, scope, state);
        match catalog.get(index) {
            Some(entry) => {
                debug!(index, name = %entry.name, key = %entry.key, "resolved menu selection");
                Ok(entry.clone())
            }
            None => {
                warn!(index, available = catalog.len(), key = %catalog.key(), "menu selection out of range");
                Err(Error::OutOfRangeSelection {
                    requested: index,
                    available: catalog.len(),
                })
            }
        }
    }

    /// Resolve `index` against the menu the user was shown, then confirm that
    /// menu is still the active one. Without a shown menu the active catalog
    /// is used. A stale menu fails with `SelectionKeyMismatch` even when the
    /// index would be out of range there.
    pub fn resolve_shown(
        &self,
        snapshot: &CorpusSnapshot,
        index: i64,
        shown: Option<&CatalogKey>,
        scope: Scope,
        state: Option<&str>,
    ) -> Result<SubcategoryEntry> {
        let Some(shown) = shown else {
            return self.resolve(snapshot, index, scope, state);
        };
        let entry = self
            .resolve(snapshot, index, shown.scope, shown.state.as_deref())
            .map_err(|e| match e {
                Error::OutOfRangeSelection { .. } if *shown != CatalogKey::new(scope, state) => {
                    mismatch(shown, &CatalogKey::new(scope, state))
                }
                e => e,
            })?;
        self.confirm(&entry, scope, state)?;
        Ok(entry)
    }

    /// Resolve a subcategory by name within the active catalog
    pub fn resolve_name(
        &self,
        snapshot: &CorpusSnapshot,
        name: &str,
        scope: Scope,
        state: Option<&str>,
    ) -> Result<SubcategoryEntry> {
        self.cache
            .load(snapshot, scope, state)
            .find(name)
            .cloned()
            .ok_or_else(|| Error::UnknownSubcategory(name.trim().to_string()))
    }

    /// Reject an entry that was numbered under a different scope/state
    pub fn confirm(&self, entry: &SubcategoryEntry, scope: Scope, state: Option<&str>) -> Result<()> {
        let active = CatalogKey::new(scope, state);
        if entry.key == active {
            Ok(())
        } else {
            Err(mismatch(&entry.key, &active))
        }
    }
}

fn mismatch(produced_by: &CatalogKey, active: &CatalogKey) -> Error {
    warn!(%produced_by, %active, "selection refers to a stale menu");
    Error::SelectionKeyMismatch {
        produced_by: produced_by.to_string(),
        active: active.to_string(),
    }
}
