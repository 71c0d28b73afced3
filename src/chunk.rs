//! The chunk data model
//!
//! A filing is stored as a two-tier hierarchy: section-level `parent`
//! chunks that preserve full local context, and fixed-window `child`
//! chunks used for high-precision similarity search. Children point back
//! to their parent through `parent_id`; parents hold no forward pointers.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a chunk is a section-level parent or a search window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    Parent,
    Child,
}

impl ChunkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkKind::Parent => "parent",
            ChunkKind::Child => "child",
        }
    }
}

/// Coarse semantic tag assigned at ingestion time, immutable thereafter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    GeneralText,
    FinancialStatement,
    RiskAnalysis,
}

impl SectionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SectionType::GeneralText => "general_text",
            SectionType::FinancialStatement => "financial_statement",
            SectionType::RiskAnalysis => "risk_analysis",
        }
    }
}

/// Which statement a `financial_statement` section belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableName {
    BalanceSheet,
    IncomeStatement,
    CashFlow,
}

impl TableName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TableName::BalanceSheet => "balance_sheet",
            TableName::IncomeStatement => "income_statement",
            TableName::CashFlow => "cash_flow",
        }
    }
}

/// The atomic retrievable unit.
///
/// The embedding vector never appears here: the store computes it when the
/// record is written and owns it from then on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkRecord {
    /// Stable identifier, unique within a store instance
    pub id: String,

    /// UTF-8 content, never empty
    pub text: String,

    pub kind: ChunkKind,

    /// Present iff `kind == Child`; back-reference to the parent's id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    pub section_type: SectionType,

    /// Present iff `section_type == FinancialStatement`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<TableName>,

    /// Page provenance from the source document, "unknown" if absent
    pub page_label: String,

    /// RFC3339 timestamp of the ingestion run that wrote this chunk
    pub ingested_at: String,
}

/// Content hash of a normalized source document, the id namespace for one
/// document version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentHash(pub [u8; 32]);

impl DocumentHash {
    pub fn of(markdown: &str) -> Self {
        Self(*blake3::hash(markdown.as_bytes()).as_bytes())
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from_bytes(self.0).to_hex().to_string()
    }
}

/// Deterministic id for a parent chunk.
///
/// UUIDv5 over (document hash, section index): re-ingesting identical
/// content upserts the same records instead of duplicating them.
pub fn parent_chunk_id(doc: &DocumentHash, section_index: usize) -> String {
    let name = format!("{}/parent/{}", doc.to_hex(), section_index);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

/// Deterministic id for a child chunk, keyed by its character offset
/// within the parent.
pub fn child_chunk_id(doc: &DocumentHash, section_index: usize, offset: usize) -> String {
    let name = format!("{}/child/{}/{}", doc.to_hex(), section_index, offset);
    Uuid::new_v5(&Uuid::NAMESPACE_OID, name.as_bytes()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip() {
        let json = serde_json::to_string(&ChunkKind::Parent).unwrap();
        assert_eq!(json, "\"parent\"");
        let kind: ChunkKind = serde_json::from_str("\"child\"").unwrap();
        assert_eq!(kind, ChunkKind::Child);
    }

    #[test]
    fn test_ids_are_deterministic() {
        let doc = DocumentHash::of("# Filing\n\nBody text.");
        assert_eq!(parent_chunk_id(&doc, 2), parent_chunk_id(&doc, 2));
        assert_eq!(child_chunk_id(&doc, 2, 500), child_chunk_id(&doc, 2, 500));
    }

    #[test]
    fn test_ids_differ_by_position() {
        let doc = DocumentHash::of("# Filing\n\nBody text.");
        assert_ne!(parent_chunk_id(&doc, 0), parent_chunk_id(&doc, 1));
        assert_ne!(child_chunk_id(&doc, 0, 0), child_chunk_id(&doc, 0, 500));
        assert_ne!(parent_chunk_id(&doc, 0), child_chunk_id(&doc, 0, 0));
    }

    #[test]
    fn test_ids_differ_by_document() {
        let a = DocumentHash::of("first version");
        let b = DocumentHash::of("second version");
        assert_ne!(parent_chunk_id(&a, 0), parent_chunk_id(&b, 0));
    }

    #[test]
    fn test_section_type_tags() {
        assert_eq!(SectionType::FinancialStatement.as_str(), "financial_statement");
        assert_eq!(TableName::CashFlow.as_str(), "cash_flow");
    }
}
