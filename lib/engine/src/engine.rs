use crate::config::EngineConfig;
use crate::error::{Error, Result};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use yojana_core::conversation::{merge, reject};
use yojana_core::retrieval::build_query;
use yojana_core::{
    Catalog, CatalogCache, Clarification, CorpusSnapshot, EmbeddingProvider, HashingEmbedder,
    MatchResult, NumberSelectionResolver, PartialProfile, RetrievalEngine, SchemeRecord,
    SubcategoryEntry, UserProfile,
};
use yojana_interpret::{LanguageUnderstandingService, QueryInterpreter, Vocabulary};
use yojana_storage::{SchemeCorpusStore, Session, SessionId, SessionStore, SharedCorpus};

/// Session-aware entry point: one instance serves every conversation.
///
/// Turns of the same session are serialized on the session lock; different
/// sessions only share the read-only corpus snapshot and the catalog cache.
pub struct SchemeEngine {
    config: EngineConfig,
    corpus: Arc<dyn SchemeCorpusStore>,
    sessions: Arc<SessionStore>,
    catalogs: Arc<CatalogCache>,
    resolver: NumberSelectionResolver,
    interpreter: QueryInterpreter,
    retrieval: RetrievalEngine,
}

impl SchemeEngine {
    pub fn new(config: EngineConfig, corpus: Arc<dyn SchemeCorpusStore>) -> Result<Self> {
        config.validate()?;
        let catalogs = Arc::new(CatalogCache::new());
        Ok(Self {
            sessions: Arc::new(SessionStore::new(config.session_idle_timeout())),
            resolver: NumberSelectionResolver::new(catalogs.clone()),
            catalogs,
            interpreter: QueryInterpreter::new(),
            retrieval: RetrievalEngine::new(),
            corpus,
            config,
        })
    }

    /// Engine over an in-memory corpus with default settings
    pub fn with_records(records: Vec<SchemeRecord>) -> Result<Self> {
        Self::new(EngineConfig::default(), Arc::new(SharedCorpus::new(records)))
    }

    /// Consult `service` on every turn, bounded by the configured timeout
    pub fn with_language_service(mut self, service: Arc<dyn LanguageUnderstandingService>) -> Self {
        self.interpreter = QueryInterpreter::with_service(service, self.config.extraction_timeout());
        self
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.retrieval = RetrievalEngine::with_embedder(embedder);
        self
    }

    /// Rank with the built-in [`HashingEmbedder`] at the configured dimension
    pub fn with_hashing_embedder(self) -> Result<Self> {
        let embedder = HashingEmbedder::new(self.config.embedding_dim)?;
        Ok(self.with_embedder(Arc::new(embedder)))
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    #[inline]
    pub fn catalog_cache(&self) -> &Arc<CatalogCache> {
        &self.catalogs
    }

    #[inline]
    pub fn snapshot(&self) -> Arc<CorpusSnapshot> {
        self.corpus.snapshot()
    }

    /// Start the periodic idle-session sweep on the current tokio runtime
    pub fn start_eviction(&self) -> JoinHandle<()> {
        self.sessions.spawn_eviction(self.config.eviction_interval())
    }

    /// Interpret one user turn and fold it into the session's profile.
    ///
    /// The session is created on first use. Ambiguous state mentions and
    /// out-of-range menu numbers do not fail the call: the profile comes back
    /// unchanged apart from its history, with `clarification` set.
    pub async fn interpret_turn(&self, session_id: &SessionId, text: &str) -> Result<UserProfile> {
        let session = self.sessions.get_or_create(session_id);
        let mut profile = session.lock().await;
        let snapshot = self.corpus.snapshot();

        let outcome = self
            .interpreter
            .interpret(text, &profile, Vocabulary::from_snapshot(&snapshot))
            .await;
        let next = match outcome {
            Ok(partial) => self.apply(&snapshot, &profile, partial, text)?,
            Err(yojana_core::Error::AmbiguousState { candidates }) => {
                info!(session = %session_id, ?candidates, "turn names several states");
                reject(&profile, text, Clarification::AmbiguousState { candidates })
            }
            Err(e) => return Err(e.into()),
        };

        // single assignment: a turn dropped before this point leaves no trace
        *profile = next.clone();
        debug!(session = %session_id, turns = next.turn_history.len(), "turn committed");
        Ok(next)
    }

    fn apply(
        &self,
        snapshot: &CorpusSnapshot,
        profile: &UserProfile,
        mut partial: PartialProfile,
        text: &str,
    ) -> Result<UserProfile> {
        if let Some(index) = partial.selection.take() {
            let resolved = self.resolver.resolve_shown(
                snapshot,
                index,
                profile.menu.as_ref(),
                profile.scope,
                profile.state.as_deref(),
            );
            let clarification = match resolved {
                Ok(entry) => {
                    partial.subcategory = Some(entry.name);
                    None
                }
                Err(yojana_core::Error::OutOfRangeSelection { requested, available }) => {
                    Some(Clarification::OutOfRangeSelection { requested, available })
                }
                Err(yojana_core::Error::SelectionKeyMismatch { produced_by, active }) => {
                    Some(Clarification::SelectionKeyMismatch { produced_by, active })
                }
                Err(e) => return Err(e.into()),
            };
            if let Some(clarification) = clarification {
                return Ok(reject(profile, text, clarification));
            }
        }
        Ok(merge(profile, &partial, text))
    }

    /// Pick entry `index` (1-based) of the session's current menu
    pub async fn resolve_selection(&self, session_id: &SessionId, index: i64) -> Result<SubcategoryEntry> {
        let session = self.session(session_id)?;
        let mut profile = session.lock().await;
        let snapshot = self.corpus.snapshot();
        let entry = self.resolver.resolve_shown(
            &snapshot,
            index,
            profile.menu.as_ref(),
            profile.scope,
            profile.state.as_deref(),
        )?;

        *profile = chosen(&profile, &entry);
        Ok(entry)
    }

    /// Pick a menu entry by name; names outside the menu fail with `UnknownSubcategory`
    pub async fn select_subcategory(&self, session_id: &SessionId, name: &str) -> Result<SubcategoryEntry> {
        let session = self.session(session_id)?;
        let mut profile = session.lock().await;
        let snapshot = self.corpus.snapshot();

        let entry = self
            .resolver
            .resolve_name(&snapshot, name, profile.scope, profile.state.as_deref())?;

        *profile = chosen(&profile, &entry);
        Ok(entry)
    }

    /// Rank schemes for the session's profile, querying with text built from it
    pub async fn find_schemes(&self, session_id: &SessionId, top_k: Option<usize>) -> Result<Vec<MatchResult>> {
        let profile = self.session(session_id)?.profile().await;
        let query = build_query(&profile);
        self.search_profile(&profile, &query, top_k)
    }

    /// Rank schemes for the session's profile against explicit query text
    pub async fn find_schemes_with_query(
        &self,
        session_id: &SessionId,
        query: &str,
        top_k: Option<usize>,
    ) -> Result<Vec<MatchResult>> {
        let profile = self.session(session_id)?.profile().await;
        self.search_profile(&profile, query, top_k)
    }

    fn search_profile(&self, profile: &UserProfile, query: &str, top_k: Option<usize>) -> Result<Vec<MatchResult>> {
        let snapshot = self.corpus.snapshot();
        let top_k = top_k.unwrap_or(self.config.default_top_k);
        debug!(query, top_k, version = snapshot.version(), "finding schemes");
        Ok(self.retrieval.search(&snapshot, profile, query, top_k)?)
    }

    /// The numbered subcategory menu for the session's scope and state.
    ///
    /// The menu's key is remembered on the session: later menu numbers are
    /// only accepted while that key is still the active one.
    pub async fn catalog(&self, session_id: &SessionId) -> Result<Arc<Catalog>> {
        let session = self.session(session_id)?;
        let mut profile = session.lock().await;
        let snapshot = self.corpus.snapshot();
        let catalog = self
            .catalogs
            .load(&snapshot, profile.scope, profile.state.as_deref());
        profile.menu = Some(catalog.key().clone());
        Ok(catalog)
    }

    /// Forget everything said in the session, keeping the session itself
    pub async fn reset(&self, session_id: &SessionId) -> Result<()> {
        let session = self.session(session_id)?;
        *session.lock().await = UserProfile::new();
        info!(session = %session_id, "session reset");
        Ok(())
    }

    pub async fn profile(&self, session_id: &SessionId) -> Result<UserProfile> {
        Ok(self.session(session_id)?.profile().await)
    }

    pub fn evict_idle(&self) -> usize {
        self.sessions.evict_idle()
    }

    /// Replace the corpus. Searches already running finish on the old snapshot.
    pub fn refresh_corpus(&self, records: Vec<SchemeRecord>) -> Arc<CorpusSnapshot> {
        let snapshot = self.corpus.replace(records);
        self.catalogs.invalidate();
        snapshot
    }

    fn session(&self, session_id: &SessionId) -> Result<Arc<Session>> {
        self.sessions
            .get(session_id)
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))
    }
}

fn chosen(profile: &UserProfile, entry: &SubcategoryEntry) -> UserProfile {
    let mut next = profile.clone();
    next.subcategory = Some(entry.name.clone());
    next.clarification = None;
    next
}
