//! Precision reranking of retrieval candidates
//!
//! The reranker is a pairwise relevance scorer: one query plus one passage
//! in, one real-valued score out, higher meaning more relevant. It is far
//! more expensive than similarity search, which is why the retrieval
//! engine only sends it a small candidate set.

mod http_backend;

pub use http_backend::*;

use crate::error::Result;
use async_trait::async_trait;

/// Score for one document, addressed by its index in the request batch
#[derive(Debug, Clone)]
pub struct RerankResult {
    pub index: usize,
    pub score: f32,
}

#[async_trait]
pub trait Reranker: Send + Sync {
    /// Score every document against the query. The result carries one
    /// entry per input document, in any order.
    async fn rerank(&self, query: &str, documents: Vec<String>) -> Result<Vec<RerankResult>>;

    fn model_name(&self) -> &str;
}
