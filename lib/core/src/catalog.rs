//! Scope-aware subcategory menus.
//!
//! A [`Catalog`] is the numbered list of subcategory names a user can pick
//! from for one `(scope, state)` pair. Numbers are only meaningful together
//! with the [`CatalogKey`] that produced them.
//!
//! Construction:
//!
//! - state pool: subcategories of schemes owned by the state (scopes `all`
//!   and `state_only`), first-seen corpus order, de-duplicated within the pool
//! - central pool: the same over central schemes (scopes `all` and
//!   `central_only`)
//! - `all` lists the state pool followed by the central pool; a name present
//!   in both pools appears twice with different [`Origin`]s

use ahash::{AHashMap, AHashSet};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::{CorpusSnapshot, SchemeRecord, Scope};

/// Identifies the menu a selection index belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatalogKey {
    pub scope: Scope,
    /// Lower-cased state name
    pub state: Option<String>,
}

impl CatalogKey {
    pub fn new(scope: Scope, state: Option<&str>) -> Self {
        Self {
            scope,
            state: state
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty()),
        }
    }
}

impl fmt::Display for CatalogKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.scope, self.state.as_deref().unwrap_or("-"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    State,
    Central,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubcategoryEntry {
    pub name: String,
    pub origin: Origin,
    /// 1-based menu position
    pub index: usize,
    pub key: CatalogKey,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    key: CatalogKey,
    version: u64,
    entries: Vec<SubcategoryEntry>,
}

impl Catalog {
    pub fn build(snapshot: &CorpusSnapshot, key: CatalogKey) -> Self {
        let mut pools: Vec<(String, Origin)> = Vec::new();

        if key.scope.includes_state() {
            if let Some(state) = key.state.as_deref() {
                collect_pool(
                    snapshot.schemes().iter().filter(|s| s.is_owned_by(state)),
                    Origin::State,
                    &mut pools,
                );
            }
        }
        if key.scope.includes_central() {
            collect_pool(
                snapshot.schemes().iter().filter(|s| s.is_central()),
                Origin::Central,
                &mut pools,
            );
        }

        let entries = pools
            .into_iter()
            .enumerate()
            .map(|(i, (name, origin))| SubcategoryEntry {
                name,
                origin,
                index: i + 1,
                key: key.clone(),
            })
            .collect();

        Self {
            key,
            version: snapshot.version(),
            entries,
        }
    }

    #[inline]
    pub fn key(&self) -> &CatalogKey {
        &self.key
    }

    /// Snapshot version the catalog was built from
    #[inline]
    pub fn version(&self) -> u64 {
        self.version
    }

    #[inline]
    pub fn entries(&self) -> &[SubcategoryEntry] {
        &self.entries
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at a 1-based menu position
    pub fn get(&self, index: i64) -> Option<&SubcategoryEntry> {
        if index < 1 {
            return None;
        }
        usize::try_from(index - 1)
            .ok()
            .and_then(|i| self.entries.get(i))
    }

    /// First entry whose name equals `name`, ignoring case
    pub fn find(&self, name: &str) -> Option<&SubcategoryEntry> {
        let wanted = name.trim();
        self.entries
            .iter()
            .find(|e| e.name.eq_ignore_ascii_case(wanted))
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }
}

fn collect_pool<'a>(
    schemes: impl Iterator<Item = &'a SchemeRecord>,
    origin: Origin,
    out: &mut Vec<(String, Origin)>,
) {
    let mut seen = AHashSet::new();
    for name in schemes.flat_map(|s| s.subcategories.iter()) {
        let trimmed = name.trim();
        if !trimmed.is_empty() && seen.insert(trimmed.to_lowercase()) {
            out.push((trimmed.to_string(), origin));
        }
    }
}

struct CacheState {
    version: Option<u64>,
    cells: AHashMap<CatalogKey, Arc<OnceCell<Arc<Catalog>>>>,
}

/// Memoized catalogs for one corpus version.
///
/// Concurrent first loads of the same key share a single build. A snapshot
/// with a newer version drops every cached key.
pub struct CatalogCache {
    state: Mutex<CacheState>,
    builds: AtomicU64,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(CacheState {
                version: None,
                cells: AHashMap::new(),
            }),
            builds: AtomicU64::new(0),
        }
    }

    pub fn load(&self, snapshot: &CorpusSnapshot, scope: Scope, state: Option<&str>) -> Arc<Catalog> {
        let key = CatalogKey::new(scope, state);

        let cell = {
            let mut guard = self.state.lock();
            let cached_version = guard.version;
            match cached_version {
                Some(current) if snapshot.version() < current => {
                    // A search still holding an older snapshot: serve it without caching.
                    drop(guard);
                    self.builds.fetch_add(1, Ordering::Relaxed);
                    return Arc::new(Catalog::build(snapshot, key));
                }
                Some(current) if snapshot.version() == current => {}
                previous => {
                    if previous.is_some() {
                        debug!(version = snapshot.version(), "corpus changed, dropping cached catalogs");
                    }
                    guard.cells.clear();
                    guard.version = Some(snapshot.version());
                }
            }
            guard
                .cells
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone()
        };

        cell.get_or_init(|| {
            self.builds.fetch_add(1, Ordering::Relaxed);
            let catalog = Catalog::build(snapshot, key);
            debug!(key = %catalog.key(), entries = catalog.len(), "built subcategory catalog");
            Arc::new(catalog)
        })
        .clone()
    }

    /// Drop every cached catalog
    pub fn invalidate(&self) {
        let mut guard = self.state.lock();
        guard.cells.clear();
        guard.version = None;
    }

    /// Number of catalog builds performed so far
    pub fn builds(&self) -> u64 {
        self.builds.load(Ordering::Relaxed)
    }

    pub fn cached_keys(&self) -> usize {
        self.state.lock().cells.len()
    }
}

impl Default for CatalogCache {
    fn default() -> Self {
        Self::new()
    }
}
