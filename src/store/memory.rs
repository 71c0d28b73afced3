//! In-memory chunk store
//!
//! Brute-force cosine similarity over a `HashMap`, embedding through
//! whatever [`Embedder`] it is given. Not for production corpora; used by
//! tests and offline development where running Qdrant is overkill.

use super::{ChunkFilter, ChunkStore, ScoredChunk, StoreStats};
use crate::chunk::ChunkRecord;
use crate::embed::Embedder;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

struct StoredChunk {
    record: ChunkRecord,
    vector: Vec<f32>,
}

pub struct MemoryChunkStore {
    embedder: Arc<dyn Embedder>,
    rows: RwLock<HashMap<String, StoredChunk>>,
}

impl MemoryChunkStore {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            rows: RwLock::new(HashMap::new()),
        }
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot / (norm_a * norm_b)
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embedder.embed(vec![text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("No embedding returned".to_string()))
    }
}

#[async_trait]
impl ChunkStore for MemoryChunkStore {
    async fn write(&self, chunk: &ChunkRecord) -> Result<()> {
        let vector = self.embed_one(&chunk.text).await?;
        let mut rows = self.rows.write().await;
        rows.insert(
            chunk.id.clone(),
            StoredChunk {
                record: chunk.clone(),
                vector,
            },
        );
        debug!("Stored chunk {} ({} total)", chunk.id, rows.len());
        Ok(())
    }

    async fn query_by_similarity(
        &self,
        text: &str,
        limit: usize,
        filter: Option<ChunkFilter>,
    ) -> Result<Vec<ScoredChunk>> {
        let query_vector = self.embed_one(text).await?;
        let rows = self.rows.read().await;

        let mut scored: Vec<ScoredChunk> = rows
            .values()
            .filter(|stored| {
                filter
                    .as_ref()
                    .map(|f| f.matches(&stored.record))
                    .unwrap_or(true)
            })
            .map(|stored| ScoredChunk {
                chunk: stored.record.clone(),
                score: Self::cosine_similarity(&query_vector, &stored.vector),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);

        Ok(scored)
    }

    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<ChunkRecord>> {
        let rows = self.rows.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| rows.get(id).map(|stored| stored.record.clone()))
            .collect())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let rows = self.rows.read().await;
        Ok(StoreStats {
            collection: "memory".to_string(),
            chunk_count: rows.len(),
        })
    }
}
