//! Keyword-based document relevance matching.
//!
//! Two strategies run in priority order; the first to yield a non-empty
//! result wins:
//!
//! 1. **Topic lookup** — the configured topic table maps curated tokens to
//!    document filenames. Any topic appearing as a substring of the
//!    lowercased query contributes its filenames to the candidate set.
//! 2. **Free-text fallback** — raw substring match on content or filename,
//!    or bidirectional partial containment between query keywords and
//!    document keywords.
//!
//! No scores are computed; the result is a set presented in store order.
//! Empty or stop-word-only queries match nothing — empty patterns are
//! treated as non-matching rather than vacuously matching everything.

use std::collections::BTreeMap;
use std::collections::HashSet;

use crate::models::Document;

/// Tokens ignored by keyword extraction, alongside anything of length <= 2.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
    "what", "are", "is", "how", "why", "when", "where",
];

/// Extract matching keywords from free text: lowercase, strip punctuation,
/// split on whitespace, drop short tokens and stop words.
pub fn extract_keywords(text: &str) -> Vec<String> {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .filter(|word| word.len() > 2 && !STOP_WORDS.contains(word))
        .map(|word| word.to_string())
        .collect()
}

/// Find documents relevant to `query`, deduplicated by name, in the order
/// the store enumerated them.
pub fn find_relevant(
    docs: &[Document],
    topics: &BTreeMap<String, Vec<String>>,
    query: &str,
) -> Vec<Document> {
    let search_term = query.trim().to_lowercase();
    if search_term.is_empty() {
        return Vec::new();
    }

    // Topic-based matching first.
    let mut relevant_names: HashSet<&str> = HashSet::new();
    for (topic, files) in topics {
        if search_term.contains(topic.as_str()) {
            relevant_names.extend(files.iter().map(|f| f.as_str()));
        }
    }

    if !relevant_names.is_empty() {
        return docs
            .iter()
            .filter(|doc| relevant_names.contains(doc.name.as_str()))
            .cloned()
            .collect();
    }

    search_documents(docs, &search_term)
}

/// Free-text fallback search over content, filename, and extracted keywords.
///
/// `search_term` is expected to be lowercased and non-empty (callers go
/// through [`find_relevant`]).
fn search_documents(docs: &[Document], search_term: &str) -> Vec<Document> {
    let keywords = extract_keywords(search_term);

    docs.iter()
        .filter(|doc| {
            let content = doc.content.to_lowercase();
            let name = doc.name.to_lowercase();

            // Direct content or filename match.
            if content.contains(search_term) || name.contains(search_term) {
                return true;
            }

            // Keyword overlap: either side containing the other counts.
            let mut doc_keywords = extract_keywords(&content);
            doc_keywords.extend(extract_keywords(&name));

            keywords.iter().any(|kw| {
                doc_keywords
                    .iter()
                    .any(|dk| dk.contains(kw.as_str()) || kw.contains(dk.as_str()))
            })
        })
        .cloned()
        .collect()
}
