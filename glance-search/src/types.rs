//! Core types: assembled search results and the instant-answer wire model.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

/// A single assembled search result, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Display title.
    pub title: String,
    /// Display description. Mirrors the title when the source has no
    /// separate description.
    pub description: String,
    /// Target URL. Unique within one assembled list.
    pub url: String,
}

/// The instant-answer API response body.
///
/// Every field is optional on the wire. A field that is missing, `null`,
/// or of an unexpected type decodes to its empty value, so a malformed
/// category yields zero results instead of failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstantAnswer {
    /// URL of the abstract answer's source.
    #[serde(rename = "AbstractURL", deserialize_with = "lenient")]
    pub abstract_url: String,
    /// Abstract answer text.
    #[serde(rename = "AbstractText", deserialize_with = "lenient")]
    pub abstract_text: String,
    /// Heading for the abstract answer.
    #[serde(rename = "Heading", deserialize_with = "lenient")]
    pub heading: String,
    /// Direct results (usually the official site).
    #[serde(rename = "Results", deserialize_with = "lenient")]
    pub results: Vec<Topic>,
    /// Related topics, possibly grouped.
    #[serde(rename = "RelatedTopics", deserialize_with = "lenient")]
    pub related_topics: Vec<Topic>,
}

/// An entry in `Results` or `RelatedTopics`.
///
/// Grouped entries carry a `Name` and nested `Topics` instead of a URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Topic {
    /// Plain text form.
    #[serde(rename = "Text", deserialize_with = "lenient")]
    pub text: String,
    /// HTML anchor form of the text.
    #[serde(rename = "Result", deserialize_with = "lenient")]
    pub result: String,
    /// Target URL.
    #[serde(rename = "FirstURL", deserialize_with = "lenient")]
    pub first_url: String,
    /// Group name, set on grouped entries only.
    #[serde(rename = "Name", deserialize_with = "lenient")]
    pub name: String,
    /// Nested entries of a group.
    #[serde(rename = "Topics", deserialize_with = "lenient")]
    pub topics: Vec<Topic>,
}

impl Topic {
    /// The raw display text: `Text`, or the `Result` anchor when `Text` is empty.
    pub fn raw_text(&self) -> &str {
        if self.text.trim().is_empty() {
            &self.result
        } else {
            &self.text
        }
    }

    /// Whether this entry is a group of nested topics.
    pub fn is_group(&self) -> bool {
        !self.topics.is_empty()
    }
}

/// Decode a field, falling back to its default on any type mismatch.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_result_construction() {
        let result = SearchResult {
            title: "Rust".into(),
            description: "A language".into(),
            url: "https://www.rust-lang.org/".into(),
        };
        assert_eq!(result.title, "Rust");
        assert_eq!(result.url, "https://www.rust-lang.org/");
    }

    #[test]
    fn instant_answer_decodes_wire_names() {
        let json = r#"{
            "Heading": "Rust",
            "AbstractURL": "https://en.wikipedia.org/wiki/Rust",
            "AbstractText": "Rust is a language.",
            "Results": [{"Text": "Official site", "FirstURL": "https://www.rust-lang.org/"}],
            "RelatedTopics": [
                {"Name": "Tools", "Topics": [{"Text": "Cargo - Package manager", "FirstURL": "https://doc.rust-lang.org/cargo/"}]}
            ]
        }"#;
        let answer: InstantAnswer = serde_json::from_str(json).expect("deserialize");
        assert_eq!(answer.heading, "Rust");
        assert_eq!(answer.results.len(), 1);
        assert_eq!(answer.results[0].first_url, "https://www.rust-lang.org/");
        assert!(answer.related_topics[0].is_group());
        assert_eq!(answer.related_topics[0].name, "Tools");
        assert_eq!(
            answer.related_topics[0].topics[0].text,
            "Cargo - Package manager"
        );
    }

    #[test]
    fn missing_fields_default_to_empty() {
        let answer: InstantAnswer = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(answer, InstantAnswer::default());
    }

    #[test]
    fn null_and_mistyped_fields_default_to_empty() {
        let json = r#"{"AbstractURL": null, "Heading": 42, "Results": "oops", "RelatedTopics": [{"Text": "kept", "FirstURL": "https://a.example"}]}"#;
        let answer: InstantAnswer = serde_json::from_str(json).expect("deserialize");
        assert!(answer.abstract_url.is_empty());
        assert!(answer.heading.is_empty());
        assert!(answer.results.is_empty());
        assert_eq!(answer.related_topics.len(), 1);
    }

    #[test]
    fn raw_text_falls_back_to_result_anchor() {
        let topic = Topic {
            result: "<a href=\"https://a.example\">A</a>".into(),
            ..Default::default()
        };
        assert_eq!(topic.raw_text(), "<a href=\"https://a.example\">A</a>");

        let topic = Topic {
            text: "Plain".into(),
            result: "<a>Anchor</a>".into(),
            ..Default::default()
        };
        assert_eq!(topic.raw_text(), "Plain");
    }

    #[test]
    fn non_object_body_is_an_error() {
        assert!(serde_json::from_str::<InstantAnswer>("\"just a string\"").is_err());
    }
}
