use super::QueryExpander;
use crate::config::ExpansionConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const EXPANSION_PROMPT: &str = "Rewrite the following financial question as short \
search queries using the vocabulary of an annual filing (statement names, line \
items, note references). One query per line, no numbering, no commentary.";

#[derive(Debug, Clone, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
struct GenerateResponse {
    text: String,
}

/// Text-generation backend used only for paraphrase queries
pub struct HttpExpander {
    client: Client,
    base_url: Url,
    model_id: String,
}

impl HttpExpander {
    pub fn new(config: &ExpansionConfig, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(&config.url)
            .map_err(|e| Error::Config(format!("Invalid expansion backend URL: {}", e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Expansion(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            model_id: config.model.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| Error::Config(format!("Invalid expansion backend URL: {}", e)))
    }
}

#[async_trait]
impl QueryExpander for HttpExpander {
    async fn expand(&self, query: &str, max: usize) -> Result<Vec<String>> {
        if max == 0 {
            return Ok(Vec::new());
        }

        let url = self.endpoint("/v1/generate")?;
        let request = GenerateRequest {
            model: self.model_id.clone(),
            prompt: format!("{}\n\nQuestion: {}", EXPANSION_PROMPT, query),
        };

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::from_reqwest("expansion backend", e))?
            .error_for_status()
            .map_err(|e| Error::from_reqwest("expansion backend", e))?;

        let parsed = response
            .json::<GenerateResponse>()
            .await
            .map_err(|e| Error::Expansion(format!("Malformed expansion response: {}", e)))?;

        let expansions: Vec<String> = parsed
            .text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.eq_ignore_ascii_case(query))
            .map(str::to_string)
            .take(max)
            .collect();

        Ok(expansions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(url: &str) -> ExpansionConfig {
        ExpansionConfig {
            url: url.to_string(),
            model: "test-gen".to_string(),
            max_expansions: 2,
        }
    }

    #[tokio::test]
    async fn test_expansions_parsed_one_per_line() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "cash and cash equivalents\nterm debt balance sheet\nextra line"
            })))
            .mount(&server)
            .await;

        let expander =
            HttpExpander::new(&config_for(&server.uri()), Duration::from_secs(5)).unwrap();
        let out = expander.expand("how much cash and debt", 2).await.unwrap();

        assert_eq!(out.len(), 2);
        assert_eq!(out[0], "cash and cash equivalents");
    }

    #[tokio::test]
    async fn test_blank_lines_and_echoes_are_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "text": "\nnet income\n\nNET INCOME GROWTH\n"
            })))
            .mount(&server)
            .await;

        let expander =
            HttpExpander::new(&config_for(&server.uri()), Duration::from_secs(5)).unwrap();
        let out = expander.expand("net income", 4).await.unwrap();

        // the echo of the query itself is filtered, blanks skipped
        assert_eq!(out, vec!["NET INCOME GROWTH".to_string()]);
    }

    #[tokio::test]
    async fn test_zero_max_skips_network() {
        let expander =
            HttpExpander::new(&config_for("http://127.0.0.1:1"), Duration::from_secs(5)).unwrap();
        assert!(expander.expand("q", 0).await.unwrap().is_empty());
    }
}
