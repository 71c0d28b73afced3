//! Status command implementation

use crate::config::Config;
use crate::error::Result;
use crate::store::ChunkStore;
use serde::Serialize;

/// System status for CLI display
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub collection: String,
    pub chunk_count: usize,
    pub qdrant_url: String,
    pub embedding_model: String,
    pub reranker_model: String,
    pub child_window: usize,
    pub top_k: usize,
}

/// Gather status from config and store
pub async fn cmd_status(config: &Config, store: &dyn ChunkStore) -> Result<StatusReport> {
    let stats = store.stats().await?;

    Ok(StatusReport {
        collection: stats.collection,
        chunk_count: stats.chunk_count,
        qdrant_url: config.qdrant_url.clone(),
        embedding_model: config.embedding.model.clone(),
        reranker_model: config.reranker.model.clone(),
        child_window: config.split.child_window,
        top_k: config.retrieval.top_k,
    })
}

/// Print status to console
pub fn print_status(report: &StatusReport) {
    println!("ledgerlens status");
    println!("  qdrant:       {}", report.qdrant_url);
    println!("  collection:   {} ({} chunks)", report.collection, report.chunk_count);
    println!("  embedding:    {}", report.embedding_model);
    println!("  reranker:     {}", report.reranker_model);
    println!("  child window: {} chars", report.child_window);
    println!("  top k:        {}", report.top_k);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::OfflineEmbedder;
    use crate::store::MemoryChunkStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_status_reflects_store_and_config() {
        let config = Config::default();
        let store = MemoryChunkStore::new(Arc::new(OfflineEmbedder::default()));

        let report = cmd_status(&config, &store).await.unwrap();
        assert_eq!(report.chunk_count, 0);
        assert_eq!(report.top_k, config.retrieval.top_k);
    }
}
