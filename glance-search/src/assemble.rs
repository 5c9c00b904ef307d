//! Result assembly: instant-answer response → ordered, deduplicated results.
//!
//! Results are emitted in source order: the abstract answer first, then the
//! direct results, then the related topics flattened depth-first. A URL is
//! kept only the first time it appears across all three sources.

use std::collections::HashSet;

use crate::config::DEFAULT_MAX_TOPIC_DEPTH;
use crate::markup::strip_markup;
use crate::types::{InstantAnswer, SearchResult, Topic};

/// Separator between a related topic's title and its description.
const TOPIC_SEPARATOR: &str = " - ";

/// Assemble display results from an instant-answer response.
///
/// `original_query` titles the abstract answer when the response carries no
/// heading. Grouped related topics are followed up to
/// [`DEFAULT_MAX_TOPIC_DEPTH`] levels deep.
///
/// # Examples
///
/// ```
/// use glance_search::assemble::assemble;
/// use glance_search::types::InstantAnswer;
///
/// let answer: InstantAnswer = serde_json::from_str(
///     r#"{"AbstractURL": "https://example.com", "AbstractText": "An example."}"#,
/// ).unwrap();
/// let results = assemble(&answer, "example");
/// assert_eq!(results[0].title, "example");
/// ```
pub fn assemble(answer: &InstantAnswer, original_query: &str) -> Vec<SearchResult> {
    assemble_with_depth(answer, original_query, DEFAULT_MAX_TOPIC_DEPTH)
}

/// Same as [`assemble`] with an explicit bound on related-topic nesting.
///
/// Top-level related topics are depth 0; a group's members are one level
/// deeper than the group. Groups whose members would exceed `max_depth`
/// are skipped.
pub fn assemble_with_depth(
    answer: &InstantAnswer,
    original_query: &str,
    max_depth: usize,
) -> Vec<SearchResult> {
    let mut assembler = Assembler::default();

    if !answer.abstract_url.trim().is_empty() && !answer.abstract_text.trim().is_empty() {
        let heading = answer.heading.trim();
        let title = if heading.is_empty() {
            original_query.trim()
        } else {
            heading
        };
        assembler.push(SearchResult {
            title: title.to_owned(),
            description: answer.abstract_text.trim().to_owned(),
            url: answer.abstract_url.trim().to_owned(),
        });
    }

    for entry in &answer.results {
        let title = strip_markup(entry.raw_text());
        let url = entry.first_url.trim();
        if title.is_empty() || url.is_empty() {
            continue;
        }
        assembler.push(SearchResult {
            description: title.clone(),
            title,
            url: url.to_owned(),
        });
    }

    assembler.flatten_topics(&answer.related_topics, 0, max_depth);

    tracing::debug!(count = assembler.results.len(), "instant answer assembled");
    assembler.results
}

/// Split cleaned topic text on the first `" - "` into title and description.
///
/// Without a separator both halves are the full text.
pub fn split_topic_text(text: &str) -> (String, String) {
    match text.split_once(TOPIC_SEPARATOR) {
        Some((title, description)) => (title.trim().to_owned(), description.trim().to_owned()),
        None => (text.to_owned(), text.to_owned()),
    }
}

#[derive(Default)]
struct Assembler {
    results: Vec<SearchResult>,
    seen_urls: HashSet<String>,
}

impl Assembler {
    /// Append `result` unless its URL was already emitted.
    fn push(&mut self, result: SearchResult) {
        if self.seen_urls.insert(result.url.clone()) {
            self.results.push(result);
        }
    }

    fn flatten_topics(&mut self, topics: &[Topic], depth: usize, max_depth: usize) {
        for topic in topics {
            if topic.is_group() {
                if depth < max_depth {
                    self.flatten_topics(&topic.topics, depth + 1, max_depth);
                } else {
                    tracing::debug!(
                        depth,
                        group = %topic.name,
                        "related topic group too deep, skipped"
                    );
                }
                continue;
            }

            let text = strip_markup(topic.raw_text());
            let url = topic.first_url.trim();
            if text.is_empty() || url.is_empty() {
                continue;
            }
            let (title, description) = split_topic_text(&text);
            self.push(SearchResult {
                title,
                description,
                url: url.to_owned(),
            });
        }
    }
}
