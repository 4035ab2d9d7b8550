use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// One captured snapshot of text from a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRecord {
    pub url: String,
    pub title: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
    pub word_count: usize,
}

/// What the extractor captured: the user's highlighted selection or the whole page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    #[default]
    Selection,
    Page,
}

impl ExtractionRecord {
    /// Builds a record from raw extractor output, stamping it with the current time.
    pub fn capture(url: &str, title: &str, raw_text: &str, mode: ExtractMode) -> Result<Self> {
        let text = match mode {
            ExtractMode::Selection => raw_text.trim().to_string(),
            ExtractMode::Page => collapse_whitespace(raw_text),
        };

        if text.is_empty() {
            let msg = match mode {
                ExtractMode::Selection => {
                    "No text selected. Please highlight the text you want to extract."
                }
                ExtractMode::Page => "No text found on this page",
            };
            return Err(AppError::Validation(msg.to_string()));
        }

        Ok(Self {
            url: page_key(url)?,
            title: title.trim().to_string(),
            word_count: word_count(&text),
            text,
            timestamp: Utc::now(),
        })
    }
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Collapses every whitespace run to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(word);
    }
    result
}

/// Cache key for a page: the absolute URL without its fragment.
pub fn page_key(url: &str) -> Result<String> {
    let url = url.trim();
    if url.is_empty() {
        return Err(AppError::Validation("Page URL is required".to_string()));
    }
    let mut parsed = Url::parse(url)
        .map_err(|e| AppError::Validation(format!("Invalid page URL '{}': {}", url, e)))?;
    parsed.set_fragment(None);
    Ok(parsed.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_count_matches_non_empty_segments() {
        assert_eq!(word_count("  one\ttwo \n\n three  "), 3);
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count(" \n "), 0);
    }

    #[test]
    fn selection_is_trimmed_but_keeps_inner_layout() {
        let record = ExtractionRecord::capture(
            "https://example.com/a",
            " Title ",
            "  first line\n\nsecond line  ",
            ExtractMode::Selection,
        )
        .unwrap();
        assert_eq!(record.text, "first line\n\nsecond line");
        assert_eq!(record.title, "Title");
        assert_eq!(record.word_count, 4);
    }

    #[test]
    fn page_mode_collapses_whitespace() {
        let record = ExtractionRecord::capture(
            "https://example.com/a",
            "T",
            "Hello\n\n\n   world\t again",
            ExtractMode::Page,
        )
        .unwrap();
        assert_eq!(record.text, "Hello world again");
        assert_eq!(record.word_count, word_count(&record.text));
    }

    #[test]
    fn empty_selection_is_rejected() {
        let err = ExtractionRecord::capture("https://example.com", "T", "   ", ExtractMode::Selection)
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(msg) if msg.starts_with("No text selected")));
    }

    #[test]
    fn page_key_drops_fragment_only() {
        assert_eq!(
            page_key("https://example.com/doc?id=7#section-2").unwrap(),
            "https://example.com/doc?id=7"
        );
        assert!(page_key("not a url").is_err());
    }

    #[test]
    fn record_serializes_with_camel_case_word_count() {
        let record =
            ExtractionRecord::capture("https://example.com", "T", "a b", ExtractMode::Selection)
                .unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["wordCount"], 2);
        assert!(json["timestamp"].as_str().unwrap().ends_with('Z'));
    }
}
