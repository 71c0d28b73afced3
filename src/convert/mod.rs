//! Document conversion
//!
//! The upstream conversion service turns a raw filing (opaque bytes, in
//! practice PDF) into normalized markdown with page provenance. The core
//! only depends on the contract: bytes plus a structural-instruction
//! string in, page-labelled markdown documents out. Any failure here is
//! `SourceUnavailable` — nothing has been written yet.

mod http_backend;

pub use http_backend::*;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One page of normalized markdown with its provenance label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageDocument {
    pub markdown: String,

    /// Page label from the source document, "unknown" if absent
    #[serde(default = "unknown_page_label")]
    pub page_label: String,
}

pub fn unknown_page_label() -> String {
    "unknown".to_string()
}

impl PageDocument {
    /// Wrap already-normalized markdown that carries no page metadata
    pub fn unlabelled(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            page_label: unknown_page_label(),
        }
    }
}

#[async_trait]
pub trait DocumentConverter: Send + Sync {
    /// Convert raw source bytes into ordered page documents.
    async fn convert(&self, source: &[u8], instructions: &str) -> Result<Vec<PageDocument>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_page_label_defaults_to_unknown() {
        let page: PageDocument =
            serde_json::from_str(r##"{ "markdown": "# Item 1" }"##).unwrap();
        assert_eq!(page.page_label, "unknown");
    }

    #[test]
    fn test_unlabelled_wrapper() {
        let page = PageDocument::unlabelled("body");
        assert_eq!(page.markdown, "body");
        assert_eq!(page.page_label, "unknown");
    }
}
