//! Embedding generation
//!
//! The embedding function is a remote black box: deterministic for
//! identical input within a model version, invoked once per chunk at write
//! time and for every similarity query. The trait keeps the store
//! implementations independent of any one backend.

mod http_backend;
mod offline;

pub use http_backend::*;
pub use offline::*;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding providers
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts, one fixed-length vector per input
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>>;

    /// Get the embedding dimension
    fn dimension(&self) -> usize;

    /// Get the model name
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_offline_embedder_satisfies_trait() {
        let embedder: Box<dyn Embedder> = Box::new(OfflineEmbedder::new(64));
        let out = embedder
            .embed(vec!["cash and debt".to_string()])
            .await
            .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].len(), 64);
    }
}
