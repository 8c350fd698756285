use super::assembler::assemble;
use super::error::PipelineError;
use super::extractor::KeywordExtractor;
use super::favorites::{FavoritesStore, enrich, load_favorites};
use super::source::JobSource;
use super::text::extraction_texts;
use super::types::{GeoPoint, Item};
use crate::auth::ActiveSession;
use log::{debug, warn};
use std::collections::HashSet;
use std::sync::Arc;

/// Fetches postings, tags them with keywords and marks the user's favorites.
#[derive(Clone)]
pub struct SearchPipeline {
    source: Arc<dyn JobSource>,
    extractor: KeywordExtractor,
    favorites: Arc<dyn FavoritesStore>,
    degrade_favorites: bool,
}

impl SearchPipeline {
    pub fn new(
        source: Arc<dyn JobSource>,
        extractor: KeywordExtractor,
        favorites: Arc<dyn FavoritesStore>,
    ) -> Self {
        Self {
            source,
            extractor,
            favorites,
            degrade_favorites: false,
        }
    }

    /// Serve unflagged items instead of failing when the favorites store is
    /// unavailable.
    pub fn with_degraded_favorites(mut self, degrade: bool) -> Self {
        self.degrade_favorites = degrade;
        self
    }

    /// Run one search. Items come back in the job source's order.
    pub async fn run(
        &self,
        session: Option<&ActiveSession>,
        user_id: &str,
        geo: GeoPoint,
        keyword: Option<&str>,
    ) -> Result<Vec<Item>, PipelineError> {
        if session.is_none() {
            return Err(PipelineError::Unauthorized);
        }

        let postings = self.source.search(geo, keyword).await;
        debug!("search: {} postings near {}", postings.len(), geo);

        let items = if postings.is_empty() {
            Vec::new()
        } else {
            let texts = extraction_texts(&postings);
            let keyword_sets = self.extractor.extract_keywords(&texts).await;
            assemble(postings, keyword_sets)?
        };

        let favorites = self.favorites_for(user_id).await?;
        Ok(enrich(items, &favorites))
    }

    async fn favorites_for(&self, user_id: &str) -> Result<HashSet<String>, PipelineError> {
        match load_favorites(self.favorites.as_ref(), user_id).await {
            Ok(favorites) => Ok(favorites),
            Err(err) if self.degrade_favorites => {
                warn!(
                    "search: favorites unavailable for user '{}', serving unflagged items: {}",
                    user_id, err
                );
                Ok(HashSet::new())
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::client::KeywordService;
    use crate::search::error::{ExtractionError, FavoritesError};
    use crate::search::types::{KeywordSet, RawPosting};
    use rocket_db_pools::sqlx;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StaticSource {
        postings: Vec<RawPosting>,
        calls: AtomicUsize,
    }

    #[rocket::async_trait]
    impl JobSource for StaticSource {
        async fn search(&self, _geo: GeoPoint, _keyword: Option<&str>) -> Vec<RawPosting> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.postings.clone()
        }
    }

    /// Returns canned keywords per text and records every batch.
    #[derive(Default)]
    struct CannedKeywords {
        answers: Vec<(String, Vec<String>)>,
        received: Mutex<Vec<String>>,
    }

    #[rocket::async_trait]
    impl KeywordService for CannedKeywords {
        async fn extract_batch(
            &self,
            texts: &[String],
        ) -> Result<Vec<KeywordSet>, ExtractionError> {
            self.received.lock().unwrap().extend(texts.iter().cloned());
            Ok(texts
                .iter()
                .map(|text| {
                    self.answers
                        .iter()
                        .find(|(key, _)| key == text)
                        .map(|(_, words)| words.iter().cloned().collect::<KeywordSet>())
                        .unwrap_or_default()
                })
                .collect())
        }
    }

    struct FixedFavorites(Option<HashSet<String>>);

    #[rocket::async_trait]
    impl FavoritesStore for FixedFavorites {
        async fn favorite_item_ids(
            &self,
            _user_id: &str,
        ) -> Result<HashSet<String>, FavoritesError> {
            self.0
                .clone()
                .ok_or(FavoritesError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    fn posting(id: &str, title: &str, description: &str) -> RawPosting {
        RawPosting {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            ..RawPosting::default()
        }
    }

    fn session() -> ActiveSession {
        ActiveSession {
            user_id: "alice".into(),
        }
    }

    fn pipeline(
        postings: Vec<RawPosting>,
        keywords: Arc<CannedKeywords>,
        favorites: Option<HashSet<String>>,
    ) -> (SearchPipeline, Arc<StaticSource>) {
        let source = Arc::new(StaticSource {
            postings,
            calls: AtomicUsize::new(0),
        });
        let pipeline = SearchPipeline::new(
            source.clone(),
            KeywordExtractor::new(keywords, 2, 2),
            Arc::new(FixedFavorites(favorites)),
        );
        (pipeline, source)
    }

    fn answers(pairs: &[(&str, &[&str])]) -> Vec<(String, Vec<String>)> {
        pairs
            .iter()
            .map(|(text, words)| {
                (
                    text.to_string(),
                    words.iter().map(|w| w.to_string()).collect(),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn missing_session_stops_before_any_external_call() {
        let keywords = Arc::new(CannedKeywords::default());
        let (pipeline, source) = pipeline(
            vec![posting("1", "t", "d")],
            keywords.clone(),
            Some(HashSet::new()),
        );

        let err = pipeline
            .run(None, "alice", GeoPoint::new(1.0, 2.0), None)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Unauthorized));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert!(keywords.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn full_pass_keeps_order_tags_and_flags() {
        let keywords = Arc::new(CannedKeywords {
            answers: answers(&[
                ("Write Go services", &["go", "go", "services"]),
                ("Java Developer", &["java"]),
            ]),
            ..CannedKeywords::default()
        });
        let postings = vec![
            posting("42", "Go Engineer", "Write Go services"),
            posting("7", "Java Developer", "\n"),
            posting("9", "Intern", ""),
        ];
        let (pipeline, _) = pipeline(
            postings,
            keywords.clone(),
            Some(HashSet::from(["42".to_string()])),
        );

        let items = pipeline
            .run(Some(&session()), "alice", GeoPoint::new(1.0, 2.0), None)
            .await
            .unwrap();

        let ids: Vec<&str> = items.iter().map(|item| item.item_id.as_str()).collect();
        assert_eq!(ids, vec!["42", "7", "9"]);
        assert_eq!(items[0].keywords.len(), 2);
        assert!(items[1].keywords.contains("java"));
        assert!(items[2].keywords.is_empty());
        assert_eq!(
            items.iter().map(|item| item.favorite).collect::<Vec<_>>(),
            vec![true, false, false]
        );

        let received = keywords.received.lock().unwrap().clone();
        assert!(received.contains(&"Java Developer".to_string()));
        assert!(received.contains(&"Intern".to_string()));
        assert!(!received.iter().any(|text| text == "\n" || text.is_empty()));
    }

    #[tokio::test]
    async fn repeated_runs_are_identical() {
        let keywords = Arc::new(CannedKeywords {
            answers: answers(&[("a", &["x", "y"]), ("b", &["z"])]),
            ..CannedKeywords::default()
        });
        let (pipeline, _) = pipeline(
            vec![posting("1", "t", "a"), posting("2", "t", "b"), posting("3", "t", "a")],
            keywords,
            Some(HashSet::from(["3".to_string()])),
        );

        let first = pipeline
            .run(Some(&session()), "alice", GeoPoint::new(0.0, 0.0), Some("rust"))
            .await
            .unwrap();
        let second = pipeline
            .run(Some(&session()), "alice", GeoPoint::new(0.0, 0.0), Some("rust"))
            .await
            .unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn empty_feed_skips_extraction() {
        let keywords = Arc::new(CannedKeywords::default());
        let (pipeline, _) = pipeline(Vec::new(), keywords.clone(), Some(HashSet::new()));

        let items = pipeline
            .run(Some(&session()), "alice", GeoPoint::new(0.0, 0.0), None)
            .await
            .unwrap();

        assert!(items.is_empty());
        assert!(keywords.received.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn favorites_outage_fails_the_request_by_default() {
        let (pipeline, _) = pipeline(
            vec![posting("1", "t", "d")],
            Arc::new(CannedKeywords::default()),
            None,
        );

        let err = pipeline
            .run(Some(&session()), "alice", GeoPoint::new(0.0, 0.0), None)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Favorites(_)));
    }

    #[tokio::test]
    async fn favorites_outage_can_degrade_to_unflagged_items() {
        let (pipeline, _) = pipeline(
            vec![posting("1", "t", "d")],
            Arc::new(CannedKeywords::default()),
            None,
        );
        let pipeline = pipeline.with_degraded_favorites(true);

        let items = pipeline
            .run(Some(&session()), "alice", GeoPoint::new(0.0, 0.0), None)
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        assert!(!items[0].favorite);
    }
}
