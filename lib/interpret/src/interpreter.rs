use crate::rules::RuleExtractor;
use crate::service::LanguageUnderstandingService;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use yojana_core::filter::names_match;
use yojana_core::{Confidence, CorpusSnapshot, Error, PartialProfile, Result, UserProfile};

pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(2);

/// Corpus names a turn can be matched against
#[derive(Debug, Clone, Copy, Default)]
pub struct Vocabulary<'a> {
    pub subcategories: &'a [String],
    pub categories: &'a [String],
}

impl<'a> Vocabulary<'a> {
    pub fn new(subcategories: &'a [String], categories: &'a [String]) -> Self {
        Self {
            subcategories,
            categories,
        }
    }

    pub fn from_snapshot(snapshot: &'a CorpusSnapshot) -> Self {
        Self::new(snapshot.vocabulary(), snapshot.categories())
    }
}

/// Turns free text into a [`PartialProfile`].
///
/// Rules always run. When a language service is configured it is asked as
/// well, under a timeout; its answer wins field by field, and any failure
/// leaves the rule result in place tagged [`Confidence::Degraded`].
#[derive(Clone)]
pub struct QueryInterpreter {
    rules: RuleExtractor,
    service: Option<Arc<dyn LanguageUnderstandingService>>,
    timeout: Duration,
}

impl Default for QueryInterpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryInterpreter {
    pub fn new() -> Self {
        Self {
            rules: RuleExtractor::new(),
            service: None,
            timeout: DEFAULT_EXTRACTION_TIMEOUT,
        }
    }

    pub fn with_service(service: Arc<dyn LanguageUnderstandingService>, timeout: Duration) -> Self {
        Self {
            rules: RuleExtractor::new(),
            service: Some(service),
            timeout,
        }
    }

    pub fn with_rules(mut self, rules: RuleExtractor) -> Self {
        self.rules = rules;
        self
    }

    pub fn has_service(&self) -> bool {
        self.service.is_some()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn rules(&self) -> &RuleExtractor {
        &self.rules
    }

    /// Rule extraction only
    pub fn extract_local(&self, text: &str, vocabulary: Vocabulary<'_>) -> Result<PartialProfile> {
        self.rules.extract(text, vocabulary)
    }

    pub async fn interpret(
        &self,
        text: &str,
        prior: &UserProfile,
        vocabulary: Vocabulary<'_>,
    ) -> Result<PartialProfile> {
        // AmbiguousState is surfaced without consulting the service
        let local = self.rules.extract(text, vocabulary)?;

        let Some(service) = &self.service else {
            return Ok(local);
        };
        if text.trim().is_empty() || local.selection.is_some() {
            return Ok(local);
        }

        match tokio::time::timeout(self.timeout, service.extract(text, prior)).await {
            Ok(Ok(remote)) => {
                debug!(service = service.name(), ?remote, "language service extraction");
                Ok(self.combine(local, remote, vocabulary))
            }
            Ok(Err(err)) => {
                warn!(service = service.name(), error = %err, "language service failed, using rules");
                Ok(degraded(local))
            }
            Err(_) => {
                let err = Error::ExtractionTimeout {
                    timeout_ms: self.timeout.as_millis() as u64,
                };
                warn!(service = service.name(), error = %err, "using rules");
                Ok(degraded(local))
            }
        }
    }

    fn combine(
        &self,
        local: PartialProfile,
        remote: PartialProfile,
        vocabulary: Vocabulary<'_>,
    ) -> PartialProfile {
        let gazetteer = self.rules.gazetteer();
        let state = remote
            .state
            .as_deref()
            .and_then(|s| gazetteer.canonicalize(s))
            .map(str::to_string)
            .or(local.state);

        let subcategory = remote
            .subcategory
            .map(|name| corpus_spelling(name, vocabulary.subcategories))
            .or(local.subcategory);
        let category = remote
            .category
            .map(|name| corpus_spelling(name, vocabulary.categories))
            .or(local.category);

        let mut crops = local.crops;
        for crop in remote.crops {
            if !crops.iter().any(|c| c.eq_ignore_ascii_case(&crop)) {
                crops.push(crop);
            }
        }

        PartialProfile {
            state,
            subcategory,
            category,
            age: remote.age.or(local.age),
            land_size_acres: remote.land_size_acres.or(local.land_size_acres),
            income: remote.income.or(local.income),
            target_group: remote.target_group.or(local.target_group),
            scope: remote.scope.or(local.scope),
            crops,
            // selections are only ever read by the rules
            selection: local.selection,
            confidence: Confidence::Normal,
        }
    }
}

fn degraded(mut partial: PartialProfile) -> PartialProfile {
    partial.confidence = Confidence::Degraded;
    partial
}

fn corpus_spelling(name: String, names: &[String]) -> String {
    names
        .iter()
        .find(|n| n.eq_ignore_ascii_case(name.trim()))
        .or_else(|| names.iter().find(|n| names_match(n, &name)))
        .cloned()
        .unwrap_or(name)
}
