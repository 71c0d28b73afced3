//! Deterministic offline embedder
//!
//! Projects text onto a fixed number of hashed token buckets and
//! L2-normalizes the counts. Not a semantic model; useful for development
//! and tests that need stable, network-free similarity (shared tokens →
//! higher cosine score).

use super::Embedder;
use crate::error::Result;
use async_trait::async_trait;

pub struct OfflineEmbedder {
    dimension: usize,
}

impl OfflineEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut buckets = vec![0.0f32; self.dimension];

        for token in tokenize(text) {
            let bucket = (fnv1a(token.as_bytes()) % self.dimension as u64) as usize;
            buckets[bucket] += 1.0;
        }

        let norm: f32 = buckets.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut buckets {
                *v /= norm;
            }
        }

        buckets
    }
}

impl Default for OfflineEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl Embedder for OfflineEmbedder {
    async fn embed(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_one(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        "offline-hashed-tokens"
    }
}

fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= 2)
        .map(str::to_lowercase)
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for b in bytes {
        hash ^= u64::from(*b);
        hash = hash.wrapping_mul(0x0000_0100_0000_01b3);
    }
    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[tokio::test]
    async fn test_deterministic() {
        let embedder = OfflineEmbedder::default();
        let a = embedder.embed(vec!["net income 2025".to_string()]).await.unwrap();
        let b = embedder.embed(vec!["net income 2025".to_string()]).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_shared_tokens_score_higher() {
        let embedder = OfflineEmbedder::default();
        let out = embedder
            .embed(vec![
                "cash and debt".to_string(),
                "Cash 100 Debt 50".to_string(),
                "supply chain risk factors".to_string(),
            ])
            .await
            .unwrap();

        let on_topic = cosine(&out[0], &out[1]);
        let off_topic = cosine(&out[0], &out[2]);
        assert!(on_topic > off_topic);
    }

    #[tokio::test]
    async fn test_vectors_are_normalized() {
        let embedder = OfflineEmbedder::new(64);
        let out = embedder.embed(vec!["revenue growth".to_string()]).await.unwrap();
        let norm: f32 = out[0].iter().map(|v| v * v).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}
