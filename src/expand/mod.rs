//! Query expansion
//!
//! Question phrasing rarely matches filing phrasing ("how much cash" vs
//! "cash and cash equivalents"). The expander asks a text-generation
//! backend for a couple of paraphrases of the user query; the retrieval
//! engine issues each as an extra similarity query.

mod http_backend;

pub use http_backend::*;

use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait QueryExpander: Send + Sync {
    /// Derive up to `max` paraphrase queries. Never includes the original
    /// query and never returns more than `max` entries.
    async fn expand(&self, query: &str, max: usize) -> Result<Vec<String>>;
}
