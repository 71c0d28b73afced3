//! Payload schema for Qdrant points

use crate::chunk::{ChunkKind, ChunkRecord, SectionType, TableName};
use qdrant_client::qdrant::{PointStruct, Value as QdrantValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

/// A point ready to be upserted to Qdrant
#[derive(Debug, Clone)]
pub struct ChunkPoint {
    pub id: String,
    pub vector: Vec<f32>,
    pub payload: ChunkPayload,
}

impl ChunkPoint {
    /// Convert to qdrant-client PointStruct
    pub fn to_point_struct(self) -> PointStruct {
        PointStruct::new(self.id, self.vector, self.payload.to_qdrant_payload())
    }
}

/// Payload stored with each chunk in Qdrant.
///
/// This is the chunk record minus the id (the point id carries it) and
/// minus the vector (stored natively by Qdrant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkPayload {
    pub text: String,

    pub kind: ChunkKind,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    pub section_type: SectionType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_name: Option<TableName>,

    pub page_label: String,

    pub ingested_at: String,
}

impl From<&ChunkRecord> for ChunkPayload {
    fn from(chunk: &ChunkRecord) -> Self {
        Self {
            text: chunk.text.clone(),
            kind: chunk.kind,
            parent_id: chunk.parent_id.clone(),
            section_type: chunk.section_type,
            table_name: chunk.table_name,
            page_label: chunk.page_label.clone(),
            ingested_at: chunk.ingested_at.clone(),
        }
    }
}

impl ChunkPayload {
    /// Reattach the point id to rebuild the full record
    pub fn into_record(self, id: String) -> ChunkRecord {
        ChunkRecord {
            id,
            text: self.text,
            kind: self.kind,
            parent_id: self.parent_id,
            section_type: self.section_type,
            table_name: self.table_name,
            page_label: self.page_label,
            ingested_at: self.ingested_at,
        }
    }

    /// Convert to Qdrant payload format
    pub fn to_qdrant_payload(self) -> HashMap<String, QdrantValue> {
        let mut map = HashMap::new();

        map.insert("text".to_string(), string_to_qdrant(&self.text));
        map.insert("kind".to_string(), string_to_qdrant(self.kind.as_str()));
        map.insert(
            "section_type".to_string(),
            string_to_qdrant(self.section_type.as_str()),
        );
        map.insert("page_label".to_string(), string_to_qdrant(&self.page_label));
        map.insert(
            "ingested_at".to_string(),
            string_to_qdrant(&self.ingested_at),
        );

        if let Some(ref parent_id) = self.parent_id {
            map.insert("parent_id".to_string(), string_to_qdrant(parent_id));
        }

        if let Some(table_name) = self.table_name {
            map.insert(
                "table_name".to_string(),
                string_to_qdrant(table_name.as_str()),
            );
        }

        map
    }
}

fn string_to_qdrant(s: &str) -> QdrantValue {
    QdrantValue {
        kind: Some(qdrant_client::qdrant::value::Kind::StringValue(
            s.to_string(),
        )),
    }
}

impl TryFrom<Map<String, Value>> for ChunkPayload {
    type Error = serde_json::Error;

    fn try_from(map: Map<String, Value>) -> std::result::Result<Self, Self::Error> {
        serde_json::from_value(Value::Object(map))
    }
}

/// Convert a Qdrant value to a serde_json value
pub(crate) fn json_from_qdrant_value(v: QdrantValue) -> Value {
    use qdrant_client::qdrant::value::Kind;

    match v.kind {
        Some(Kind::NullValue(_)) => Value::Null,
        Some(Kind::BoolValue(b)) => Value::Bool(b),
        Some(Kind::IntegerValue(i)) => Value::Number(i.into()),
        Some(Kind::DoubleValue(d)) => serde_json::Number::from_f64(d)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Some(Kind::StringValue(s)) => Value::String(s),
        Some(Kind::ListValue(list)) => {
            Value::Array(list.values.into_iter().map(json_from_qdrant_value).collect())
        }
        Some(Kind::StructValue(s)) => Value::Object(
            s.fields
                .into_iter()
                .map(|(k, v)| (k, json_from_qdrant_value(v)))
                .collect(),
        ),
        None => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> ChunkRecord {
        ChunkRecord {
            id: "abc".to_string(),
            text: "|Cash|100|".to_string(),
            kind: ChunkKind::Child,
            parent_id: Some("parent-1".to_string()),
            section_type: SectionType::FinancialStatement,
            table_name: Some(TableName::BalanceSheet),
            page_label: "28".to_string(),
            ingested_at: "2026-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_payload_round_trip_through_json() {
        let payload = ChunkPayload::from(&sample_record());
        let json = serde_json::to_string(&payload).unwrap();

        assert!(json.contains("\"kind\":\"child\""));
        assert!(json.contains("\"table_name\":\"balance_sheet\""));

        let parsed: ChunkPayload = serde_json::from_str(&json).unwrap();
        let record = parsed.into_record("abc".to_string());
        assert_eq!(record.parent_id.as_deref(), Some("parent-1"));
        assert_eq!(record.section_type, SectionType::FinancialStatement);
    }

    #[test]
    fn test_optional_fields_omitted_for_parents() {
        let mut record = sample_record();
        record.kind = ChunkKind::Parent;
        record.parent_id = None;
        record.section_type = SectionType::GeneralText;
        record.table_name = None;

        let map = ChunkPayload::from(&record).to_qdrant_payload();
        assert!(!map.contains_key("parent_id"));
        assert!(!map.contains_key("table_name"));
        assert!(map.contains_key("page_label"));
    }

    #[test]
    fn test_qdrant_value_conversion() {
        let map = ChunkPayload::from(&sample_record()).to_qdrant_payload();

        let json_map: Map<String, Value> = map
            .into_iter()
            .map(|(k, v)| (k, json_from_qdrant_value(v)))
            .collect();

        let payload = ChunkPayload::try_from(json_map).unwrap();
        assert_eq!(payload.kind, ChunkKind::Child);
        assert_eq!(payload.page_label, "28");
    }
}
