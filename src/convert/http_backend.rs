use super::{DocumentConverter, PageDocument};
use crate::config::ConversionConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

#[derive(Debug, Clone, Serialize)]
struct ParseRequest {
    content_base64: String,
    result_type: String,
    instructions: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ParseResponse {
    documents: Vec<PageDocument>,
}

/// Markdown conversion service reached over HTTP
pub struct HttpConverter {
    client: Client,
    base_url: Url,
}

impl HttpConverter {
    pub fn new(config: &ConversionConfig, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| Error::Config(format!("Invalid conversion service URL: {}", e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::SourceUnavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid conversion service URL: {}", e)))
    }
}

#[async_trait]
impl DocumentConverter for HttpConverter {
    async fn convert(&self, source: &[u8], instructions: &str) -> Result<Vec<PageDocument>> {
        if source.is_empty() {
            return Err(Error::SourceUnavailable("Empty source document".to_string()));
        }

        let url = self.endpoint("/v1/parse")?;
        let request = ParseRequest {
            content_base64: STANDARD.encode(source),
            result_type: "markdown".to_string(),
            instructions: instructions.to_string(),
        };

        debug!("Submitting {} source bytes for conversion", source.len());

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout {
                        service: "conversion service".to_string(),
                    }
                } else {
                    Error::SourceUnavailable(e.to_string())
                }
            })?
            .error_for_status()
            .map_err(|e| Error::SourceUnavailable(e.to_string()))?;

        let parsed = response
            .json::<ParseResponse>()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("Malformed conversion response: {}", e)))?;

        if parsed.documents.is_empty()
            || parsed.documents.iter().all(|d| d.markdown.trim().is_empty())
        {
            return Err(Error::SourceUnavailable(
                "Conversion service returned no content".to_string(),
            ));
        }

        Ok(parsed.documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(url: &str) -> ConversionConfig {
        ConversionConfig {
            url: url.to_string(),
            instructions: "Map bold headings to #.".to_string(),
        }
    }

    #[tokio::test]
    async fn test_convert_returns_labelled_pages() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/parse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [
                    { "markdown": "# Item 1\n\nBusiness.", "page_label": "3" },
                    { "markdown": "## Balance Sheets\n\n|Cash|100|", "page_label": "28" }
                ]
            })))
            .mount(&server)
            .await;

        let config = config_for(&server.uri());
        let converter = HttpConverter::new(&config, Duration::from_secs(5)).unwrap();
        let pages = converter
            .convert(b"%PDF-1.7 ...", &config.instructions)
            .await
            .unwrap();

        assert_eq!(pages.len(), 2);
        assert_eq!(pages[1].page_label, "28");
    }

    #[tokio::test]
    async fn test_service_failure_is_source_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/parse"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let config = config_for(&server.uri());
        let converter = HttpConverter::new(&config, Duration::from_secs(5)).unwrap();
        let err = converter.convert(b"bytes", "").await.unwrap_err();

        assert!(matches!(err, Error::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_result_is_source_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/parse"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "documents": [] })),
            )
            .mount(&server)
            .await;

        let config = config_for(&server.uri());
        let converter = HttpConverter::new(&config, Duration::from_secs(5)).unwrap();
        let err = converter.convert(b"bytes", "").await.unwrap_err();

        assert!(matches!(err, Error::SourceUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_input_rejected_without_network() {
        let config = config_for("http://127.0.0.1:1");
        let converter = HttpConverter::new(&config, Duration::from_secs(5)).unwrap();
        let err = converter.convert(b"", "").await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable(_)));
    }
}
