//! Job search pipeline: job board feed, keyword extraction, favorites, and
//! the orchestration that ties them together.

pub mod assembler;
pub mod client;
pub mod config;
pub mod error;
pub mod extractor;
pub mod favorites;
pub mod pipeline;
pub mod retry;
pub mod source;
pub mod text;
pub mod types;

pub use client::{KeywordService, MonkeyLearnClient};
pub use config::{HttpConfig, JobSourceConfig, KeywordConfig, SearchConfig};
pub use error::{ExtractionError, FavoritesError, JobSourceError, PipelineError};
pub use extractor::KeywordExtractor;
pub use favorites::{FavoritesStore, PgFavoritesStore};
pub use pipeline::SearchPipeline;
pub use retry::RetryPolicy;
pub use source::{JobBoardClient, JobSource};
pub use types::{GeoPoint, Item, KeywordSet, RawPosting};
