//! Ingestion pipeline
//!
//! Orchestrates conversion → splitting → classification → store writes,
//! establishing the parent/child hierarchy. Writes are independent per
//! chunk with no rollback; a failed write is recorded and surfaces as a
//! count discrepancy on [`IngestStats`], never swallowed. When a parent
//! write fails its children are skipped entirely, so no child ever points
//! at a parent the store does not hold.

use crate::chunk::{child_chunk_id, parent_chunk_id, ChunkKind, ChunkRecord, DocumentHash};
use crate::classify::classify;
use crate::convert::{DocumentConverter, PageDocument};
use crate::error::Result;
use crate::split::{split_sections, window_text};
use crate::store::ChunkStore;
use chrono::Utc;
use tracing::{debug, info, warn};

/// Statistics from an ingestion run
#[derive(Debug, Default, Clone)]
pub struct IngestStats {
    /// Chunks the splitter produced
    pub expected: usize,
    pub parents_written: usize,
    pub children_written: usize,
    pub errors: Vec<String>,
}

impl IngestStats {
    pub fn written(&self) -> usize {
        self.parents_written + self.children_written
    }

    /// True when one or more chunk writes failed mid-run
    pub fn is_partial(&self) -> bool {
        self.written() < self.expected
    }
}

/// Ingestion pipeline over an abstract chunk store
pub struct Ingestor<'a> {
    store: &'a dyn ChunkStore,
    child_window: usize,
}

impl<'a> Ingestor<'a> {
    pub fn new(store: &'a dyn ChunkStore, child_window: usize) -> Self {
        Self {
            store,
            child_window,
        }
    }

    /// Convert raw source bytes and ingest the result.
    ///
    /// Conversion failure aborts before anything is written.
    pub async fn ingest_source(
        &self,
        converter: &dyn DocumentConverter,
        source: &[u8],
        instructions: &str,
    ) -> Result<IngestStats> {
        let pages = converter.convert(source, instructions).await?;
        info!("Conversion produced {} page documents", pages.len());
        self.ingest_pages(&pages).await
    }

    /// Ingest normalized, page-labelled markdown.
    ///
    /// Chunk ids are derived from the document content hash, so ingesting
    /// identical content twice upserts the same records.
    pub async fn ingest_pages(&self, pages: &[PageDocument]) -> Result<IngestStats> {
        let full_text: String = pages.iter().map(|p| p.markdown.as_str()).collect();
        let doc = DocumentHash::of(&full_text);
        let ingested_at = Utc::now().to_rfc3339();

        let mut stats = IngestStats::default();
        let mut section_index = 0;

        for page in pages {
            for section in split_sections(&page.markdown) {
                self.ingest_section(
                    &doc,
                    section_index,
                    &section,
                    &page.page_label,
                    &ingested_at,
                    &mut stats,
                )
                .await;
                section_index += 1;
            }
        }

        info!(
            "Ingestion complete: {} parents, {} children written ({} expected)",
            stats.parents_written,
            stats.children_written,
            stats.expected
        );
        if stats.is_partial() {
            warn!(
                "Partial ingestion: {} of {} chunks written",
                stats.written(),
                stats.expected
            );
        }

        Ok(stats)
    }

    async fn ingest_section(
        &self,
        doc: &DocumentHash,
        section_index: usize,
        section: &str,
        page_label: &str,
        ingested_at: &str,
        stats: &mut IngestStats,
    ) {
        let classification = classify(section);
        let windows = window_text(section, self.child_window);
        stats.expected += 1 + windows.len();

        let parent_id = parent_chunk_id(doc, section_index);
        let parent = ChunkRecord {
            id: parent_id.clone(),
            text: section.to_string(),
            kind: ChunkKind::Parent,
            parent_id: None,
            section_type: classification.section_type,
            table_name: classification.table_name,
            page_label: page_label.to_string(),
            ingested_at: ingested_at.to_string(),
        };

        if let Err(e) = self.store.write(&parent).await {
            let msg = format!("parent {}: {}", parent_id, e);
            warn!("{}", msg);
            stats.errors.push(msg);
            // children would dangle without their parent
            return;
        }
        stats.parents_written += 1;

        debug!(
            "Section {} ({}, page {}): {} children",
            section_index,
            classification.section_type.as_str(),
            page_label,
            windows.len()
        );

        let mut offset = 0;
        for window in windows {
            let child = ChunkRecord {
                id: child_chunk_id(doc, section_index, offset),
                text: window.clone(),
                kind: ChunkKind::Child,
                parent_id: Some(parent_id.clone()),
                section_type: classification.section_type,
                table_name: classification.table_name,
                page_label: page_label.to_string(),
                ingested_at: ingested_at.to_string(),
            };
            offset += window.chars().count();

            match self.store.write(&child).await {
                Ok(()) => stats.children_written += 1,
                Err(e) => {
                    let msg = format!("child {}: {}", child.id, e);
                    warn!("{}", msg);
                    stats.errors.push(msg);
                }
            }
        }
    }
}
