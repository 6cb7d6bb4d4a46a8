use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::eligibility::{EligibilityAssessor, EligibilityStatus};
use crate::embedding::EmbeddingProvider;
use crate::filter::{matched_subcategory, Filter, SchemeFilter};
use crate::text::{jaccard, token_set};
use crate::{CorpusSnapshot, Result, SchemeRecord, UserProfile, Vector};

pub const DEFAULT_TOP_K: usize = 10;

/// Query used when the profile carries nothing to search for
pub const FALLBACK_QUERY: &str = "government agricultural schemes";

/// Which ranking path produced a score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPath {
    Vector,
    Keyword,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub scheme_id: String,
    pub scheme_name: String,
    /// In [0, 1]
    pub relevance_score: f32,
    pub eligibility_status: EligibilityStatus,
    pub matched_subcategory: Option<String>,
    pub reasons: Vec<String>,
    pub ranking: RankingPath,
}

/// Filters a corpus snapshot by profile and ranks what is left.
///
/// Ranking uses cosine similarity when an embedding provider is configured
/// and every embedding call succeeds; otherwise it falls back to keyword
/// Jaccard overlap of the query against name and description.
#[derive(Clone, Default)]
pub struct RetrievalEngine {
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    assessor: EligibilityAssessor,
}

impl RetrievalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_embedder(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder: Some(embedder),
            assessor: EligibilityAssessor::new(),
        }
    }

    pub fn has_embedder(&self) -> bool {
        self.embedder.is_some()
    }

    pub fn search(
        &self,
        snapshot: &CorpusSnapshot,
        profile: &UserProfile,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<MatchResult>> {
        snapshot.ensure_available()?;

        let filter = SchemeFilter::for_profile(profile);
        let candidates: Vec<&SchemeRecord> = snapshot
            .schemes()
            .iter()
            .filter(|scheme| filter.matches(scheme))
            .collect();

        let (scores, ranking) = match self.vector_scores(query, &candidates) {
            Some(scores) => (scores, RankingPath::Vector),
            None => (keyword_scores(query, &candidates), RankingPath::Keyword),
        };

        let mut scored: Vec<(&SchemeRecord, f32)> = candidates.into_iter().zip(scores).collect();
        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| name_order(&a.0.name, &b.0.name))
                .then_with(|| a.0.id.cmp(&b.0.id))
        });
        scored.truncate(top_k);

        debug!(
            candidates = scored.len(),
            ?ranking,
            version = snapshot.version(),
            "scheme search complete"
        );

        Ok(scored
            .into_iter()
            .map(|(scheme, score)| {
                let assessment = self.assessor.explain(profile, scheme);
                MatchResult {
                    scheme_id: scheme.id.clone(),
                    scheme_name: scheme.name.clone(),
                    relevance_score: score.clamp(0.0, 1.0),
                    eligibility_status: assessment.status,
                    matched_subcategory: profile
                        .subcategory
                        .as_deref()
                        .and_then(|wanted| matched_subcategory(scheme, wanted))
                        .map(str::to_string),
                    reasons: assessment.reasons,
                    ranking,
                }
            })
            .collect())
    }

    /// Cosine scores for every candidate, or `None` if any embedding call fails
    fn vector_scores(&self, query: &str, candidates: &[&SchemeRecord]) -> Option<Vec<f32>> {
        let embedder = self.embedder.as_ref()?;

        let query_vector = match embedder.embed(query) {
            Ok(v) => v,
            Err(e) => {
                warn!(model = embedder.model_id(), error = %e, "query embedding failed, using keyword ranking");
                return None;
            }
        };

        let mut scores = Vec::with_capacity(candidates.len());
        for scheme in candidates {
            let score = match &scheme.embedding {
                Some(stored) if stored.dim() == query_vector.dim() => query_vector.relevance(stored),
                _ => {
                    let computed: Vector = match embedder.embed(&scheme.search_text()) {
                        Ok(v) => v,
                        Err(e) => {
                            warn!(scheme = %scheme.id, error = %e, "scheme embedding failed, using keyword ranking");
                            return None;
                        }
                    };
                    query_vector.relevance(&computed)
                }
            };
            scores.push(score);
        }
        Some(scores)
    }
}

fn keyword_scores(query: &str, candidates: &[&SchemeRecord]) -> Vec<f32> {
    let query_tokens = token_set(query);
    candidates
        .iter()
        .map(|scheme| jaccard(&query_tokens, &token_set(&scheme.search_text())))
        .collect()
}

/// Search text derived from the profile when the caller supplies none
pub fn build_query(profile: &UserProfile) -> String {
    let mut parts: Vec<String> = Vec::new();

    if let Some(subcategory) = &profile.subcategory {
        parts.push(subcategory.clone());
    }
    if let Some(category) = &profile.category {
        parts.push(category.clone());
    }
    if !profile.crops.is_empty() {
        parts.push(profile.crops.join(" "));
    }
    if let Some(group) = profile.target_group {
        parts.push(group.label().to_string());
    }
    if let Some(land) = profile.land_size_acres {
        parts.push(format!("land {land} acres"));
    }
    if let Some(state) = &profile.state {
        parts.push(state.clone());
    }

    if parts.is_empty() {
        FALLBACK_QUERY.to_string()
    } else {
        parts.join(" ")
    }
}

/// Case-insensitive name order used to break score ties
fn name_order(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}
