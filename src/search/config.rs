use std::env;
use std::time::Duration;

fn env_bool(key: &str, default: bool) -> bool {
    env::var(key)
        .ok()
        .map(|value| matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_millis(key: &str, default_millis: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(default_millis))
}

fn env_string(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Timeout and retry settings shared by every outbound HTTP call.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_attempts: usize,
    pub initial_backoff: Duration,
}

impl HttpConfig {
    pub fn from_env() -> Self {
        Self {
            request_timeout: env_duration_millis("HTTP_TIMEOUT_MS", 10_000),
            connect_timeout: env_duration_millis("HTTP_CONNECT_TIMEOUT_MS", 5_000),
            max_attempts: env_usize("HTTP_MAX_RETRIES", 3).max(1),
            initial_backoff: env_duration_millis("HTTP_RETRY_BACKOFF_MS", 250),
        }
    }

    /// Build the pooled client shared by the job source and the keyword service.
    pub fn build_client(&self) -> Result<reqwest::Client, reqwest::Error> {
        reqwest::Client::builder()
            .timeout(self.request_timeout)
            .connect_timeout(self.connect_timeout)
            .user_agent("jupiter-search/0.1")
            .build()
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Configuration for the job board feed.
#[derive(Debug, Clone)]
pub struct JobSourceConfig {
    pub url: String,
    pub default_keyword: String,
}

impl JobSourceConfig {
    pub fn from_env() -> Self {
        Self {
            url: env_string("JOBS_API_URL", "https://jobs.github.com/positions.json"),
            default_keyword: env_string("JOBS_DEFAULT_KEYWORD", "developer"),
        }
    }
}

impl Default for JobSourceConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Configuration for the keyword extraction service.
#[derive(Debug, Clone)]
pub struct KeywordConfig {
    pub base_url: String,
    pub api_key: String,
    pub model_id: String,
    pub max_keywords: usize,
    pub batch_size: usize,
    pub max_concurrent_batches: usize,
}

impl KeywordConfig {
    pub fn from_env() -> Self {
        Self {
            base_url: env_string("KEYWORDS_API_URL", "https://api.monkeylearn.com/v3"),
            api_key: env_string("KEYWORDS_API_KEY", ""),
            model_id: env_string("KEYWORDS_MODEL_ID", "ex_YCya9nrn"),
            max_keywords: env_usize("KEYWORDS_MAX_KEYWORDS", 3),
            batch_size: env_usize("KEYWORDS_BATCH_SIZE", 20).max(1),
            max_concurrent_batches: env_usize("KEYWORDS_MAX_CONCURRENCY", 2).max(1),
        }
    }
}

impl Default for KeywordConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Pipeline-level behavior switches.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Return unflagged items instead of failing when the favorites store is down.
    pub degrade_favorites: bool,
    pub session_cookie_name: String,
}

impl SearchConfig {
    pub fn from_env() -> Self {
        Self {
            degrade_favorites: env_bool("SEARCH_DEGRADE_FAVORITES", false),
            session_cookie_name: env_string("SESSION_COOKIE_NAME", "jupiter_session"),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
