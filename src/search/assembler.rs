use super::error::PipelineError;
use super::types::{Item, KeywordSet, RawPosting};

/// Zip postings with their keyword sets into client-facing items.
///
/// Both sequences must be the same length; a mismatch means extraction lost
/// alignment somewhere upstream and is reported rather than repaired.
pub fn assemble(
    postings: Vec<RawPosting>,
    keyword_sets: Vec<KeywordSet>,
) -> Result<Vec<Item>, PipelineError> {
    if postings.len() != keyword_sets.len() {
        return Err(PipelineError::InvariantViolation(format!(
            "{} postings but {} keyword sets",
            postings.len(),
            keyword_sets.len()
        )));
    }

    Ok(postings
        .into_iter()
        .zip(keyword_sets)
        .map(|(posting, keywords)| Item {
            item_id: posting.id,
            name: posting.title,
            address: posting.location,
            url: posting.url,
            image_url: posting.company_logo,
            keywords,
            favorite: false,
        })
        .collect())
}
