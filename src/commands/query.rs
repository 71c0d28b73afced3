//! Query command implementation

use crate::config::Config;
use crate::error::{Error, Result};
use crate::expand::HttpExpander;
use crate::rerank::HttpReranker;
use crate::retrieve::{RetrieveOptions, Retriever};
use crate::store::{ChunkStore, ScoredChunk};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Query options from the CLI
#[derive(Debug, Clone, Default)]
pub struct QueryOptions {
    /// Number of results to return
    pub top_k: Option<usize>,
    /// Disable paraphrase expansion
    pub no_expand: bool,
    /// Disable the density filter
    pub no_density_filter: bool,
    /// Return raw similarity hits without widening to parent sections
    pub raw_chunks: bool,
    /// Overall deadline for the query, in seconds
    pub timeout_secs: Option<u64>,
}

/// Query result for CLI display
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutput {
    pub query: String,
    pub results: Vec<ScoredChunk>,
    /// True when the reranker was unavailable and results carry
    /// similarity-stage order instead of reranked order
    pub degraded: bool,
}

/// Execute a query
pub async fn cmd_query(
    config: &Config,
    store: Arc<dyn ChunkStore>,
    query: &str,
    options: QueryOptions,
) -> Result<QueryOutput> {
    info!("Querying: {}", query);

    let reranker = HttpReranker::new(&config.reranker, config.request_timeout())?;
    let expander = HttpExpander::new(&config.expansion, config.request_timeout())?;
    let retriever = Retriever::new(store, Arc::new(reranker)).with_expander(Arc::new(expander));

    let mut retrieve_options = RetrieveOptions::from_config(&config.retrieval, &config.expansion);
    if let Some(top_k) = options.top_k {
        retrieve_options.top_k = top_k;
    }
    if options.no_expand {
        retrieve_options.expand_queries = false;
    }
    if options.no_density_filter {
        retrieve_options.density_filter = false;
    }
    if options.raw_chunks {
        retrieve_options.resolve_parents = false;
    }
    if let Some(secs) = options.timeout_secs {
        retrieve_options = retrieve_options.with_deadline(Instant::now() + Duration::from_secs(secs));
    }

    match retriever.retrieve(query, &retrieve_options).await {
        Ok(results) => Ok(QueryOutput {
            query: query.to_string(),
            results,
            degraded: false,
        }),
        // degrade to the unranked candidate set rather than failing the query
        Err(Error::RerankUnavailable { reason, fallback }) => {
            warn!("Reranker unavailable ({}), returning unranked candidates", reason);
            let mut results: Vec<ScoredChunk> = fallback
                .into_iter()
                .map(|chunk| ScoredChunk { chunk, score: 0.0 })
                .collect();
            results.truncate(retrieve_options.top_k);
            Ok(QueryOutput {
                query: query.to_string(),
                results,
                degraded: true,
            })
        }
        Err(e) => Err(e),
    }
}

/// Print query results to console
pub fn print_query_results(output: &QueryOutput) {
    println!("\nQuery: {}\n", output.query);

    if output.results.is_empty() {
        println!("No relevant data found.");
        return;
    }

    if output.degraded {
        println!("(reranker unavailable; results in similarity order)\n");
    }

    for (i, r) in output.results.iter().enumerate() {
        println!(
            "{}. [score: {:.3}] page {}, {}",
            i + 1,
            r.score,
            r.chunk.page_label,
            r.chunk.section_type.as_str()
        );

        if let Some(table) = r.chunk.table_name {
            println!("   Table: {}", table.as_str());
        }

        let preview: String = r.chunk.text.trim().chars().take(200).collect();
        println!("   {}\n", preview.replace('\n', " "));
    }
}
