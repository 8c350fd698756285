use super::types::RawPosting;

/// Pick the text sent to keyword extraction for one posting.
///
/// Some listings carry everything in the title and leave the description
/// empty (or a lone newline); those fall back to the title.
pub fn extraction_text(posting: &RawPosting) -> &str {
    match posting.description.as_str() {
        "" | "\n" => posting.title.as_str(),
        description => description,
    }
}

/// Extraction text for every posting, in posting order.
pub fn extraction_texts(postings: &[RawPosting]) -> Vec<String> {
    postings
        .iter()
        .map(|posting| extraction_text(posting).to_string())
        .collect()
}
