use super::config::KeywordConfig;
use super::error::ExtractionError;
use super::retry::RetryPolicy;
use super::types::KeywordSet;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// One call to an external keyword extraction service.
///
/// Implementations receive at most one batch worth of texts and must return
/// exactly one keyword set per text, in input order.
#[rocket::async_trait]
pub trait KeywordService: Send + Sync {
    async fn extract_batch(&self, texts: &[String]) -> Result<Vec<KeywordSet>, ExtractionError>;
}

/// Client for the MonkeyLearn keyword extractor API.
#[derive(Debug, Clone)]
pub struct MonkeyLearnClient {
    http: Client,
    config: KeywordConfig,
    retry: RetryPolicy,
}

impl MonkeyLearnClient {
    pub fn new(http: Client, config: KeywordConfig, retry: RetryPolicy) -> Self {
        Self {
            http,
            config,
            retry,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/extractors/{}/extract/",
            self.config.base_url.trim_end_matches('/'),
            self.config.model_id
        )
    }

    async fn dispatch(&self, endpoint: &str, texts: &[String]) -> Result<Vec<KeywordSet>, ExtractionError> {
        let payload = ExtractRequest {
            data: texts,
            max_keywords: self.config.max_keywords,
        };

        let response = self
            .http
            .post(endpoint)
            .header("Authorization", format!("Token {}", self.config.api_key))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Status { status, body });
        }

        let body = response.bytes().await?;
        let parsed: Vec<ExtractResult> = serde_json::from_slice(&body)?;

        if parsed.len() != texts.len() {
            return Err(ExtractionError::CountMismatch {
                expected: texts.len(),
                actual: parsed.len(),
            });
        }

        Ok(parsed.into_iter().map(ExtractResult::into_keywords).collect())
    }
}

#[rocket::async_trait]
impl KeywordService for MonkeyLearnClient {
    async fn extract_batch(&self, texts: &[String]) -> Result<Vec<KeywordSet>, ExtractionError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let endpoint = self.endpoint();
        self.retry
            .run("keyword service", ExtractionError::Timeout, || {
                self.dispatch(&endpoint, texts)
            })
            .await
    }
}

#[derive(Debug, Serialize)]
struct ExtractRequest<'a> {
    data: &'a [String],
    max_keywords: usize,
}

#[derive(Debug, Deserialize)]
struct ExtractResult {
    #[serde(default)]
    error: bool,
    /// Flagged documents may carry `null` here.
    #[serde(default)]
    extractions: Option<Vec<Extraction>>,
}

#[derive(Debug, Deserialize)]
struct Extraction {
    #[serde(default)]
    parsed_value: Option<String>,
    #[serde(default)]
    extracted_text: Option<String>,
}

impl ExtractResult {
    /// A document the service flagged as failed contributes no keywords.
    fn into_keywords(self) -> KeywordSet {
        if self.error {
            return KeywordSet::new();
        }

        self.extractions
            .unwrap_or_default()
            .into_iter()
            .filter_map(|extraction| {
                extraction
                    .parsed_value
                    .filter(|value| !value.trim().is_empty())
                    .or(extraction.extracted_text)
            })
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .collect()
    }
}
