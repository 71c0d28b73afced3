//! Chunk storage
//!
//! The store is a durable collection of chunks with embeddings, queryable
//! by approximate nearest-neighbor similarity and by exact metadata
//! filter. Embeddings are the store's concern: it embeds chunk text on
//! write and query text on search, so callers never handle vectors.
//!
//! Two implementations: Qdrant for real deployments and a brute-force
//! in-memory store for tests and offline development.

mod memory;
mod payload;
mod qdrant;

pub use memory::*;
pub use payload::*;
pub use qdrant::*;

use crate::chunk::{ChunkKind, ChunkRecord, SectionType};
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;

/// A similarity hit with its raw vector score
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk: ChunkRecord,
    pub score: f32,
}

/// Exact-match metadata filter for similarity queries
#[derive(Debug, Clone, Default)]
pub struct ChunkFilter {
    pub kind: Option<ChunkKind>,
    pub parent_id: Option<String>,
    pub section_type: Option<SectionType>,
}

impl ChunkFilter {
    /// Restrict a query to child search windows
    pub fn children() -> Self {
        Self {
            kind: Some(ChunkKind::Child),
            ..Self::default()
        }
    }

    /// All children of one parent
    pub fn children_of(parent_id: impl Into<String>) -> Self {
        Self {
            kind: Some(ChunkKind::Child),
            parent_id: Some(parent_id.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.kind.is_none() && self.parent_id.is_none() && self.section_type.is_none()
    }

    /// Exact-match check used by the in-memory store
    pub fn matches(&self, chunk: &ChunkRecord) -> bool {
        if let Some(kind) = self.kind {
            if chunk.kind != kind {
                return false;
            }
        }
        if let Some(ref parent_id) = self.parent_id {
            if chunk.parent_id.as_deref() != Some(parent_id.as_str()) {
                return false;
            }
        }
        if let Some(section_type) = self.section_type {
            if chunk.section_type != section_type {
                return false;
            }
        }
        true
    }
}

/// Store-level statistics
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub collection: String,
    pub chunk_count: usize,
}

/// Abstract chunk store.
///
/// Implementations must make a chunk visible to queries no later than the
/// `write` call returning (read-after-write per chunk). Similarity ranking
/// internals are opaque; only "nearest neighbors by embedding distance"
/// is relied upon.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Embed and persist one chunk
    async fn write(&self, chunk: &ChunkRecord) -> Result<()>;

    /// Nearest neighbors of `text`, optionally restricted by filter
    async fn query_by_similarity(
        &self,
        text: &str,
        limit: usize,
        filter: Option<ChunkFilter>,
    ) -> Result<Vec<ScoredChunk>>;

    /// Fetch full records by id, in the order requested; unknown ids are
    /// silently absent from the result
    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<ChunkRecord>>;

    async fn stats(&self) -> Result<StoreStats>;
}
