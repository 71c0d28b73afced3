//! Two-stage retrieval
//!
//! Similarity search is high-recall but imprecise: it finds the right
//! neighborhood, not the right numbers. The engine therefore over-fetches
//! candidates by vector similarity (optionally through paraphrase
//! queries against the child windows), widens child hits back to their
//! parent sections, drops boilerplate, and only then pays for the
//! cross-encoder, which rescores a few dozen passages instead of the
//! whole corpus.
//!
//! Stage order is strict: generate → resolve → filter → rerank →
//! truncate. A call is side-effect-free on the store and holds no state
//! across calls.

use crate::chunk::ChunkRecord;
use crate::config::{ExpansionConfig, RetrievalConfig};
use crate::error::{Error, Result};
use crate::expand::QueryExpander;
use crate::rerank::Reranker;
use crate::store::{ChunkFilter, ChunkStore, ScoredChunk};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Per-call retrieval knobs.
///
/// The simpler retrieval variants are configurations of this one engine:
/// turn off `expand_queries` for single-query recall, `resolve_parents`
/// to search whole records directly, `density_filter` to rerank
/// everything that similarity search returned.
#[derive(Debug, Clone)]
pub struct RetrieveOptions {
    /// Results returned to the caller
    pub top_k: usize,

    /// Candidates fetched per similarity query
    pub candidates: usize,

    /// Issue paraphrase queries derived by the expansion backend
    pub expand_queries: bool,

    /// Paraphrases derived per query
    pub max_expansions: usize,

    /// Search child windows and widen hits to their parent sections
    pub resolve_parents: bool,

    /// Drop boilerplate candidates before reranking
    pub density_filter: bool,

    /// Pipe count above which a candidate counts as tabular
    pub density_min_pipes: usize,

    /// Length above which a candidate counts as data-dense
    pub density_min_chars: usize,

    /// Caller-supplied cancellation point, checked between stages
    pub deadline: Option<Instant>,
}

impl RetrieveOptions {
    pub fn from_config(retrieval: &RetrievalConfig, expansion: &ExpansionConfig) -> Self {
        Self {
            top_k: retrieval.top_k,
            candidates: retrieval.candidates,
            expand_queries: retrieval.expand_queries,
            max_expansions: expansion.max_expansions,
            resolve_parents: retrieval.resolve_parents,
            density_filter: retrieval.density_filter,
            density_min_pipes: retrieval.density_min_pipes,
            density_min_chars: retrieval.density_min_chars,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn check_deadline(&self, next_stage: &str) -> Result<()> {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Err(Error::Cancelled(next_stage.to_string()));
            }
        }
        Ok(())
    }
}

/// Retrieval engine over an abstract chunk store
pub struct Retriever {
    store: Arc<dyn ChunkStore>,
    reranker: Arc<dyn Reranker>,
    expander: Option<Arc<dyn QueryExpander>>,
}

impl Retriever {
    pub fn new(store: Arc<dyn ChunkStore>, reranker: Arc<dyn Reranker>) -> Self {
        Self {
            store,
            reranker,
            expander: None,
        }
    }

    pub fn with_expander(mut self, expander: Arc<dyn QueryExpander>) -> Self {
        self.expander = Some(expander);
        self
    }

    /// Run the full pipeline for one query.
    ///
    /// An empty candidate set is an empty `Ok`, never an error. A rerank
    /// failure returns [`Error::RerankUnavailable`] carrying the surviving
    /// candidates in stage order, so the caller can still answer from the
    /// unranked set.
    pub async fn retrieve(
        &self,
        query: &str,
        options: &RetrieveOptions,
    ) -> Result<Vec<ScoredChunk>> {
        options.check_deadline("candidate generation")?;
        let candidates = self.generate_candidates(query, options).await?;
        if candidates.is_empty() {
            info!("No candidates for query, returning empty result");
            return Ok(Vec::new());
        }

        let candidates = if options.resolve_parents {
            options.check_deadline("parent resolution")?;
            self.resolve_parents(candidates).await?
        } else {
            candidates
        };

        let candidates = if options.density_filter {
            options.check_deadline("density filtering")?;
            apply_density_filter(candidates, options)
        } else {
            candidates
        };

        options.check_deadline("reranking")?;
        let mut ranked = self.rerank(query, candidates).await?;

        ranked.truncate(options.top_k);
        info!(
            "Retrieval returning {} results (top score {:.3})",
            ranked.len(),
            ranked.first().map(|r| r.score).unwrap_or(0.0)
        );
        Ok(ranked)
    }

    /// Stage 1: high-recall candidate generation.
    ///
    /// Issues the raw query plus up to `max_expansions` paraphrases and
    /// unions the hits, first-seen order preserved. Expansion failure
    /// degrades to the raw query alone; the raw query is always issued.
    async fn generate_candidates(
        &self,
        query: &str,
        options: &RetrieveOptions,
    ) -> Result<Vec<ChunkRecord>> {
        let mut queries = vec![query.to_string()];

        if options.expand_queries && options.max_expansions > 0 {
            if let Some(expander) = &self.expander {
                match expander.expand(query, options.max_expansions).await {
                    Ok(expansions) => {
                        debug!("Derived {} expansion queries", expansions.len());
                        queries.extend(expansions);
                    }
                    Err(e) => {
                        warn!("Query expansion failed, using raw query only: {}", e);
                    }
                }
            }
        }

        let filter = options.resolve_parents.then(ChunkFilter::children);
        let searches = queries.iter().map(|q| {
            self.store
                .query_by_similarity(q, options.candidates, filter.clone())
        });

        let mut seen = HashSet::new();
        let mut candidates = Vec::new();
        for outcome in join_all(searches).await {
            for hit in outcome? {
                if seen.insert(hit.chunk.id.clone()) {
                    candidates.push(hit.chunk);
                }
            }
        }

        debug!(
            "Candidate generation: {} unique hits from {} queries",
            candidates.len(),
            queries.len()
        );
        Ok(candidates)
    }

    /// Stage 2: widen child hits to their parent sections, restoring the
    /// context the small search windows dropped.
    async fn resolve_parents(&self, candidates: Vec<ChunkRecord>) -> Result<Vec<ChunkRecord>> {
        let mut seen = HashSet::new();
        let mut parent_ids = Vec::new();
        let mut already_parents = Vec::new();

        for candidate in candidates {
            match candidate.parent_id {
                Some(parent_id) => {
                    if seen.insert(parent_id.clone()) {
                        parent_ids.push(parent_id);
                    }
                }
                // a record with no back-reference is its own context
                None => already_parents.push(candidate),
            }
        }

        let mut parents = self.store.get_by_ids(&parent_ids).await?;
        parents.extend(already_parents);

        debug!("Parent resolution: {} sections", parents.len());
        Ok(parents)
    }

    /// Stage 4: precision rescoring of the surviving candidates.
    async fn rerank(&self, query: &str, candidates: Vec<ChunkRecord>) -> Result<Vec<ScoredChunk>> {
        let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();

        let results = match self.reranker.rerank(query, texts).await {
            Ok(results) => results,
            Err(e) => {
                return Err(Error::RerankUnavailable {
                    reason: e.to_string(),
                    fallback: candidates,
                })
            }
        };

        let mut scores: Vec<Option<f32>> = vec![None; candidates.len()];
        for result in results {
            if result.index < scores.len() {
                scores[result.index] = Some(result.score);
            }
        }

        if scores.iter().any(Option::is_none) {
            return Err(Error::RerankUnavailable {
                reason: "Reranker returned a partial score set".to_string(),
                fallback: candidates,
            });
        }

        let mut ranked: Vec<ScoredChunk> = candidates
            .into_iter()
            .zip(scores)
            .map(|(chunk, score)| ScoredChunk {
                chunk,
                score: score.unwrap_or(f32::MIN),
            })
            .collect();

        // stable sort keeps candidate order on ties
        ranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        Ok(ranked)
    }
}

/// Stage 3: keep candidates likely to hold primary data (table rows or
/// long sections) over boilerplate. Rejecting everything falls back to
/// the full set: the reranker must never see an artificially empty pool.
fn apply_density_filter(
    candidates: Vec<ChunkRecord>,
    options: &RetrieveOptions,
) -> Vec<ChunkRecord> {
    let dense: Vec<ChunkRecord> = candidates
        .iter()
        .filter(|c| is_dense(c, options))
        .cloned()
        .collect();

    if dense.is_empty() {
        debug!(
            "Density filter rejected all {} candidates, keeping full set",
            candidates.len()
        );
        candidates
    } else {
        debug!(
            "Density filter kept {} of {} candidates",
            dense.len(),
            candidates.len()
        );
        dense
    }
}

fn is_dense(chunk: &ChunkRecord, options: &RetrieveOptions) -> bool {
    chunk.text.matches('|').count() > options.density_min_pipes
        || chunk.text.chars().count() > options.density_min_chars
}
