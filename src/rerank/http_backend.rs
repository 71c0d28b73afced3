use super::{RerankResult, Reranker};
use crate::config::RerankerConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone, Serialize)]
struct RerankRequest {
    model: String,
    query: String,
    documents: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct RerankResponse {
    results: Vec<RerankItem>,
}

#[derive(Debug, Clone, Deserialize)]
struct RerankItem {
    index: usize,
    score: f32,
}

/// Cross-encoder reranker reached over HTTP
pub struct HttpReranker {
    client: Client,
    base_url: Url,
    model_id: String,
}

impl HttpReranker {
    pub fn new(config: &RerankerConfig, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| Error::Config(format!("Invalid reranker backend URL: {}", e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            model_id: config.model.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid reranker backend URL: {}", e)))
    }
}

#[async_trait]
impl Reranker for HttpReranker {
    async fn rerank(&self, query: &str, documents: Vec<String>) -> Result<Vec<RerankResult>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let url = self.endpoint("/v1/rerank")?;
        let request = RerankRequest {
            model: self.model_id.clone(),
            query: query.to_string(),
            documents,
        };

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::from_reqwest("reranker backend", e))?
            .error_for_status()
            .map_err(|e| Error::from_reqwest("reranker backend", e))?;

        let parsed = response
            .json::<RerankResponse>()
            .await
            .map_err(|e| Error::Other(format!("Malformed rerank response: {}", e)))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|item| RerankResult {
                index: item.index,
                score: item.score,
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(url: &str) -> RerankerConfig {
        RerankerConfig {
            model: "test-reranker".to_string(),
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_rerank_round_trip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/rerank"))
            .and(body_partial_json(json!({ "query": "cash and debt" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    { "index": 1, "score": 0.92 },
                    { "index": 0, "score": 0.15 }
                ]
            })))
            .mount(&server)
            .await;

        let reranker =
            HttpReranker::new(&config_for(&server.uri()), Duration::from_secs(5)).unwrap();
        let results = reranker
            .rerank(
                "cash and debt",
                vec!["boilerplate".to_string(), "|Cash|100|".to_string()],
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].index, 1);
        assert!(results[0].score > results[1].score);
    }

    #[tokio::test]
    async fn test_backend_error_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/rerank"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let reranker =
            HttpReranker::new(&config_for(&server.uri()), Duration::from_secs(5)).unwrap();
        let err = reranker
            .rerank("q", vec!["doc".to_string()])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Http(_)));
    }

    #[tokio::test]
    async fn test_empty_documents_skip_network() {
        let reranker =
            HttpReranker::new(&config_for("http://127.0.0.1:1"), Duration::from_secs(5)).unwrap();
        let results = reranker.rerank("q", Vec::new()).await.unwrap();
        assert!(results.is_empty());
    }
}
