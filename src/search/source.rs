use super::config::JobSourceConfig;
use super::error::JobSourceError;
use super::retry::RetryPolicy;
use super::types::{GeoPoint, RawPosting};
use log::{debug, warn};
use reqwest::{Client, StatusCode};

/// Anything that can list job postings near a location.
#[rocket::async_trait]
pub trait JobSource: Send + Sync {
    /// Postings for `geo` matching `keyword`, in feed order. Never fails; an
    /// unavailable feed yields no postings.
    async fn search(&self, geo: GeoPoint, keyword: Option<&str>) -> Vec<RawPosting>;
}

/// HTTP client for the job board positions feed.
#[derive(Debug, Clone)]
pub struct JobBoardClient {
    http: Client,
    config: JobSourceConfig,
    retry: RetryPolicy,
}

impl JobBoardClient {
    pub fn new(http: Client, config: JobSourceConfig, retry: RetryPolicy) -> Self {
        Self {
            http,
            config,
            retry,
        }
    }

    fn resolve_keyword<'a>(&'a self, keyword: Option<&'a str>) -> &'a str {
        match keyword {
            Some(value) if !value.trim().is_empty() => value,
            _ => self.config.default_keyword.as_str(),
        }
    }

    async fn fetch(&self, geo: GeoPoint, keyword: &str) -> Result<Vec<RawPosting>, JobSourceError> {
        self.retry
            .run("job source", JobSourceError::Timeout, || {
                self.dispatch(geo, keyword)
            })
            .await
    }

    async fn dispatch(&self, geo: GeoPoint, keyword: &str) -> Result<Vec<RawPosting>, JobSourceError> {
        let query = [
            ("description", keyword.to_string()),
            ("lat", geo.lat.to_string()),
            ("long", geo.lon.to_string()),
        ];

        let response = self.http.get(&self.config.url).query(&query).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(JobSourceError::Status { status, body });
        }

        // Read the whole body before decoding so a truncated stream surfaces
        // as an error instead of a short list.
        let body = response.bytes().await?;
        let postings: Vec<RawPosting> = serde_json::from_slice(&body)?;
        Ok(postings)
    }
}

#[rocket::async_trait]
impl JobSource for JobBoardClient {
    async fn search(&self, geo: GeoPoint, keyword: Option<&str>) -> Vec<RawPosting> {
        let keyword = self.resolve_keyword(keyword);
        match self.fetch(geo, keyword).await {
            Ok(postings) => {
                debug!(
                    "job source: {} postings for '{}' near {}",
                    postings.len(),
                    keyword,
                    geo
                );
                postings
            }
            Err(err) => {
                warn!(
                    "job source: returning no postings for '{}' near {}: {}",
                    keyword, geo, err
                );
                Vec::new()
            }
        }
    }
}
