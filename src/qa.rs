use tracing::info;

use crate::AppState;
use crate::error::{AppError, Result};
use crate::extract::page_key;
use crate::llm;

/// Longest context sent to the endpoint, in characters.
pub const MAX_CONTEXT_CHARS: usize = 8000;
const TRUNCATION_MARKER: &str = "...";

/// Keeps the last `MAX_CONTEXT_CHARS` characters of `text`, marking the cut.
///
/// The tail is kept on the assumption that answers in long pages tend to sit
/// near the end.
pub fn truncate_context(text: &str) -> String {
    let total = text.chars().count();
    if total <= MAX_CONTEXT_CHARS {
        return text.to_string();
    }
    let start = text
        .char_indices()
        .nth(total - MAX_CONTEXT_CHARS)
        .map(|(i, _)| i)
        .unwrap_or(0);
    let mut result = String::with_capacity(TRUNCATION_MARKER.len() + text.len() - start);
    result.push_str(TRUNCATION_MARKER);
    result.push_str(&text[start..]);
    result
}

/// Answers `question` from the latest cached capture of `source_url`.
pub async fn answer(state: &AppState, question: &str, source_url: &str) -> Result<String> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::Validation("Please enter a question".to_string()));
    }
    if source_url.trim().is_empty() {
        return Err(AppError::Validation("Please select a source page".to_string()));
    }
    let source_url = page_key(source_url)?;

    let latest = state
        .pages
        .latest(&source_url)
        .await?
        .ok_or_else(|| AppError::NotFound("No cached text found for this page".to_string()))?;

    let config = state.settings.load().await?;
    if config.endpoint.trim().is_empty() {
        return Err(AppError::ConfigError(
            "API endpoint not configured. Save an endpoint in the settings first.".to_string(),
        ));
    }

    let context = truncate_context(&latest.text);
    info!(
        url = %source_url,
        endpoint = %config.endpoint,
        context_chars = context.chars().count(),
        "answering question"
    );

    llm::ask(&config.endpoint, &context, question).await
}
