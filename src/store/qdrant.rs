//! Qdrant-backed chunk store

use super::{
    json_from_qdrant_value, ChunkFilter, ChunkPayload, ChunkPoint, ChunkStore, ScoredChunk,
    StoreStats,
};
use crate::chunk::ChunkRecord;
use crate::config::Config;
use crate::embed::Embedder;
use crate::error::{Error, Result};
use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, GetPointsBuilder, PointId,
    ScalarQuantizationBuilder, SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::Qdrant;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Qdrant store handle
pub struct QdrantChunkStore {
    client: Qdrant,
    collection: String,
    embedder: Arc<dyn Embedder>,
}

impl QdrantChunkStore {
    /// Connect to Qdrant using config
    pub async fn connect(config: &Config, embedder: Arc<dyn Embedder>) -> Result<Self> {
        Self::new(&config.qdrant_url, &config.collection_name, embedder).await
    }

    /// Create a new store connection directly with URL and collection name
    pub async fn new(url: &str, collection: &str, embedder: Arc<dyn Embedder>) -> Result<Self> {
        debug!("Connecting to Qdrant at {}", url);

        let client = Qdrant::from_url(url)
            .skip_compatibility_check()
            .build()
            .map_err(|e| Error::Store(e.to_string()))?;

        Ok(Self {
            client,
            collection: collection.to_string(),
            embedder,
        })
    }

    /// Ensure the collection exists with the embedder's dimension
    pub async fn ensure_collection(&self) -> Result<()> {
        let exists = self.client.collection_exists(&self.collection).await?;

        if exists {
            debug!("Collection {} already exists", self.collection);
            return Ok(());
        }

        let dimension = self.embedder.dimension();
        info!(
            "Creating collection {} with dimension {}",
            self.collection, dimension
        );

        let vectors_config = VectorParamsBuilder::new(dimension as u64, Distance::Cosine);

        self.client
            .create_collection(
                CreateCollectionBuilder::new(&self.collection)
                    .vectors_config(vectors_config)
                    .quantization_config(ScalarQuantizationBuilder::default()),
            )
            .await?;

        info!("Collection {} created successfully", self.collection);
        Ok(())
    }

    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embedder.embed(vec![text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("No embedding returned".to_string()))
    }
}

#[async_trait]
impl ChunkStore for QdrantChunkStore {
    async fn write(&self, chunk: &ChunkRecord) -> Result<()> {
        let vector = self.embed_one(&chunk.text).await?;
        let point = ChunkPoint {
            id: chunk.id.clone(),
            vector,
            payload: ChunkPayload::from(chunk),
        };

        debug!(
            "Upserting {} chunk {} to collection {}",
            chunk.kind.as_str(),
            chunk.id,
            self.collection
        );

        // wait=true so the chunk is queryable once this call returns
        self.client
            .upsert_points(
                UpsertPointsBuilder::new(&self.collection, vec![point.to_point_struct()])
                    .wait(true),
            )
            .await?;

        Ok(())
    }

    async fn query_by_similarity(
        &self,
        text: &str,
        limit: usize,
        filter: Option<ChunkFilter>,
    ) -> Result<Vec<ScoredChunk>> {
        debug!(
            "Searching collection {} with limit {}",
            self.collection, limit
        );

        let vector = self.embed_one(text).await?;

        let mut search_builder =
            SearchPointsBuilder::new(&self.collection, vector, limit as u64).with_payload(true);

        if let Some(f) = filter {
            if let Some(qdrant_filter) = to_qdrant_filter(&f) {
                search_builder = search_builder.filter(qdrant_filter);
            }
        }

        let response = self.client.search_points(search_builder).await?;

        let mut results = Vec::with_capacity(response.result.len());
        for point in response.result {
            let id = point_id_to_string(point.id);
            let payload = payload_from_map(point.payload)?;
            results.push(ScoredChunk {
                chunk: payload.into_record(id),
                score: point.score,
            });
        }

        Ok(results)
    }

    async fn get_by_ids(&self, ids: &[String]) -> Result<Vec<ChunkRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let point_ids: Vec<PointId> = ids.iter().map(|id| PointId::from(id.clone())).collect();

        let response = self
            .client
            .get_points(
                GetPointsBuilder::new(&self.collection, point_ids)
                    .with_payload(true)
                    .with_vectors(false),
            )
            .await?;

        let mut by_id: HashMap<String, ChunkRecord> = HashMap::new();
        for point in response.result {
            let id = point_id_to_string(point.id);
            let payload = payload_from_map(point.payload)?;
            by_id.insert(id.clone(), payload.into_record(id));
        }

        // preserve the requested order
        Ok(ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn stats(&self) -> Result<StoreStats> {
        let info = self.client.collection_info(&self.collection).await?;

        let chunk_count = info
            .result
            .map(|r| r.points_count.unwrap_or(0))
            .unwrap_or(0);

        Ok(StoreStats {
            collection: self.collection.clone(),
            chunk_count: chunk_count as usize,
        })
    }
}

fn to_qdrant_filter(filter: &ChunkFilter) -> Option<Filter> {
    let mut must_conditions: Vec<Condition> = Vec::new();

    if let Some(kind) = filter.kind {
        must_conditions.push(Condition::matches("kind", kind.as_str().to_string()));
    }

    if let Some(ref parent_id) = filter.parent_id {
        must_conditions.push(Condition::matches("parent_id", parent_id.clone()));
    }

    if let Some(section_type) = filter.section_type {
        must_conditions.push(Condition::matches(
            "section_type",
            section_type.as_str().to_string(),
        ));
    }

    if must_conditions.is_empty() {
        return None;
    }

    Some(Filter {
        must: must_conditions,
        should: vec![],
        must_not: vec![],
        min_should: None,
    })
}

fn payload_from_map(
    payload: HashMap<String, qdrant_client::qdrant::Value>,
) -> Result<ChunkPayload> {
    let json_map: serde_json::Map<String, Value> = payload
        .into_iter()
        .map(|(k, v)| (k, json_from_qdrant_value(v)))
        .collect();

    ChunkPayload::try_from(json_map)
        .map_err(|e| Error::Store(format!("Malformed chunk payload: {}", e)))
}

/// Convert PointId to string
fn point_id_to_string(id: Option<PointId>) -> String {
    match id {
        Some(PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Uuid(uuid)),
        }) => uuid,
        Some(PointId {
            point_id_options: Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(num)),
        }) => num.to_string(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::ChunkKind;

    #[test]
    fn test_filter_conversion() {
        let filter = ChunkFilter::children_of("parent-7");
        let qdrant_filter = to_qdrant_filter(&filter).unwrap();
        assert_eq!(qdrant_filter.must.len(), 2);
    }

    #[test]
    fn test_empty_filter_converts_to_none() {
        assert!(to_qdrant_filter(&ChunkFilter::default()).is_none());
    }

    #[test]
    fn test_payload_from_map_rejects_garbage() {
        let mut payload = HashMap::new();
        payload.insert(
            "kind".to_string(),
            qdrant_client::qdrant::Value {
                kind: Some(qdrant_client::qdrant::value::Kind::StringValue(
                    "neither".to_string(),
                )),
            },
        );

        assert!(payload_from_map(payload).is_err());
    }

    #[test]
    fn test_payload_from_map_round_trip() {
        let record = ChunkRecord {
            id: "x".to_string(),
            text: "t".to_string(),
            kind: ChunkKind::Parent,
            parent_id: None,
            section_type: crate::chunk::SectionType::GeneralText,
            table_name: None,
            page_label: "unknown".to_string(),
            ingested_at: "2026-01-01T00:00:00Z".to_string(),
        };

        let map = ChunkPayload::from(&record).to_qdrant_payload();
        let payload = payload_from_map(map).unwrap();
        assert_eq!(payload.kind, ChunkKind::Parent);
    }
}
