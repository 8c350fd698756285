use super::client::KeywordService;
use super::config::KeywordConfig;
use super::error::ExtractionError;
use super::types::KeywordSet;
use log::{debug, warn};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Batches texts to a [`KeywordService`] and reassembles the results by
/// position.
///
/// The output always has one keyword set per input text, in input order.
/// Blank texts are never sent and keep an empty set. A batch that fails (or
/// answers with the wrong number of results) leaves every slot it covered
/// empty; the other batches are unaffected.
#[derive(Clone)]
pub struct KeywordExtractor {
    service: Arc<dyn KeywordService>,
    batch_size: usize,
    max_concurrent_batches: usize,
}

/// Texts of one batch tagged with their positions in the caller's input.
struct Batch {
    positions: Vec<usize>,
    texts: Vec<String>,
}

impl KeywordExtractor {
    pub fn new(
        service: Arc<dyn KeywordService>,
        batch_size: usize,
        max_concurrent_batches: usize,
    ) -> Self {
        Self {
            service,
            batch_size: batch_size.max(1),
            max_concurrent_batches: max_concurrent_batches.max(1),
        }
    }

    pub fn from_config(service: Arc<dyn KeywordService>, config: &KeywordConfig) -> Self {
        Self::new(service, config.batch_size, config.max_concurrent_batches)
    }

    pub async fn extract_keywords(&self, texts: &[String]) -> Vec<KeywordSet> {
        let mut results = vec![KeywordSet::new(); texts.len()];

        let batches = self.plan_batches(texts);
        if batches.is_empty() {
            return results;
        }

        debug!(
            "keyword extraction: {} texts in {} batches (batch size {})",
            texts.len(),
            batches.len(),
            self.batch_size
        );

        let permits = Arc::new(Semaphore::new(self.max_concurrent_batches));
        let mut tasks = JoinSet::new();

        for batch in batches {
            let service = Arc::clone(&self.service);
            let permits = Arc::clone(&permits);
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                let outcome = service
                    .extract_batch(&batch.texts)
                    .await
                    .and_then(|sets| {
                        if sets.len() == batch.positions.len() {
                            Ok(sets)
                        } else {
                            Err(ExtractionError::CountMismatch {
                                expected: batch.positions.len(),
                                actual: sets.len(),
                            })
                        }
                    });
                (batch.positions, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((positions, Ok(sets))) => {
                    for (position, set) in positions.into_iter().zip(sets) {
                        results[position] = set;
                    }
                }
                Ok((positions, Err(err))) => {
                    warn!(
                        "keyword extraction: positions {:?} degraded to empty keywords: {}",
                        positions, err
                    );
                }
                Err(err) => {
                    warn!("keyword extraction: batch task aborted: {}", err);
                }
            }
        }

        results
    }

    fn plan_batches(&self, texts: &[String]) -> Vec<Batch> {
        let pending: Vec<(usize, &String)> = texts
            .iter()
            .enumerate()
            .filter(|(_, text)| !text.trim().is_empty())
            .collect();

        pending
            .chunks(self.batch_size)
            .map(|chunk| Batch {
                positions: chunk.iter().map(|(position, _)| *position).collect(),
                texts: chunk.iter().map(|(_, text)| (*text).clone()).collect(),
            })
            .collect()
    }
}
