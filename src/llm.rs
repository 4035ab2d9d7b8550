use once_cell::sync::Lazy;
use reqwest::{Client, ClientBuilder, Response};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{AppError, Result};

// No request timeout: a question stays pending for as long as the endpoint takes.
static CLIENT: Lazy<Client> = Lazy::new(|| {
    ClientBuilder::new()
        .pool_max_idle_per_host(4)
        .build()
        .expect("Failed to build HTTP client")
});

const PROBE_TEXT: &str = "Test text for connection";
const PROBE_QUESTION: &str = "Say \"Hello\"";

#[derive(Serialize)]
struct AskRequest<'a> {
    text: &'a str,
    question: &'a str,
}

/// The answer shapes endpoints are known to return, in the order they are tried.
#[derive(Debug, Clone, PartialEq)]
pub enum AnswerPayload {
    Response(String),
    Answer(String),
    Bare(String),
    Text(String),
    Message(String),
    Opaque(Value),
}

impl AnswerPayload {
    pub fn decode(body: Value) -> Self {
        if let Some(s) = string_field(&body, "response") {
            return AnswerPayload::Response(s);
        }
        if let Some(s) = string_field(&body, "answer") {
            return AnswerPayload::Answer(s);
        }
        if let Value::String(s) = &body {
            return AnswerPayload::Bare(s.clone());
        }
        if let Some(s) = string_field(&body, "text") {
            return AnswerPayload::Text(s);
        }
        if let Some(s) = string_field(&body, "message") {
            return AnswerPayload::Message(s);
        }
        AnswerPayload::Opaque(body)
    }

    /// The answer text, trimmed. Unrecognized bodies come back as their JSON text.
    pub fn into_answer(self) -> String {
        match self {
            AnswerPayload::Response(s)
            | AnswerPayload::Answer(s)
            | AnswerPayload::Bare(s)
            | AnswerPayload::Text(s)
            | AnswerPayload::Message(s) => s.trim().to_string(),
            AnswerPayload::Opaque(v) => v.to_string().trim().to_string(),
        }
    }
}

fn string_field(body: &Value, name: &str) -> Option<String> {
    match body.get(name) {
        Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
        _ => None,
    }
}

async fn post_question(endpoint: &str, text: &str, question: &str) -> Result<Response> {
    let res = CLIENT
        .post(endpoint)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .json(&AskRequest { text, question })
        .send()
        .await
        .map_err(|e| {
            warn!(endpoint = %endpoint, error = %e, "request to answer endpoint failed");
            AppError::from(e)
        })?;
    Ok(res)
}

async fn read_json_body(res: Response) -> Result<Value> {
    let bytes = res.bytes().await?;
    serde_json::from_slice(&bytes)
        .map_err(|e| AppError::Protocol(format!("API returned invalid JSON: {}", e)))
}

fn status_line(res: &Response) -> String {
    let status = res.status();
    format!(
        "{} {}",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .trim_end()
    .to_string()
}

/// Sends `{text, question}` to `endpoint` and returns the trimmed answer.
pub async fn ask(endpoint: &str, text: &str, question: &str) -> Result<String> {
    debug!(endpoint = %endpoint, context_chars = text.chars().count(), "asking endpoint");
    let res = post_question(endpoint, text, question).await?;

    if !res.status().is_success() {
        let status = status_line(&res);
        let body = res
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
        return Err(AppError::Api(format!("API error: {}. {}", status, body)));
    }

    let body = read_json_body(res).await?;
    Ok(AnswerPayload::decode(body).into_answer())
}

/// Sends a fixed probe question; success means the endpoint answered with JSON.
pub async fn test_connection(endpoint: &str) -> Result<()> {
    let res = post_question(endpoint, PROBE_TEXT, PROBE_QUESTION).await?;

    if !res.status().is_success() {
        return Err(AppError::Api(format!("Connection failed: {}", status_line(&res))));
    }

    read_json_body(res).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn answer(body: Value) -> String {
        AnswerPayload::decode(body).into_answer()
    }

    #[test]
    fn known_fields_in_priority_order() {
        assert_eq!(answer(json!({"response": "Paris"})), "Paris");
        assert_eq!(answer(json!({"answer": "42"})), "42");
        assert_eq!(answer(json!("ok")), "ok");
        assert_eq!(answer(json!({"text": "from text"})), "from text");
        assert_eq!(answer(json!({"message": "from message"})), "from message");
        assert_eq!(
            answer(json!({"message": "m", "answer": "a", "response": "r"})),
            "r"
        );
        assert_eq!(answer(json!({"text": "t", "answer": "a"})), "a");
    }

    #[test]
    fn empty_or_non_string_fields_are_skipped() {
        assert_eq!(
            AnswerPayload::decode(json!({"response": "", "answer": "fallback"})),
            AnswerPayload::Answer("fallback".into())
        );
        assert_eq!(
            AnswerPayload::decode(json!({"response": 7, "message": "m"})),
            AnswerPayload::Message("m".into())
        );
    }

    #[test]
    fn unrecognized_body_becomes_its_json_text() {
        assert_eq!(answer(json!({"foo": "bar"})), r#"{"foo":"bar"}"#);
        assert_eq!(answer(Value::Null), "null");
    }

    #[test]
    fn opaque_body_keeps_server_key_order() {
        let raw = r#"{"status":"ok","data":{"zeta":1,"alpha":2}}"#;
        let body: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(answer(body), raw);
    }

    #[test]
    fn answers_are_trimmed() {
        assert_eq!(answer(json!({"response": "\n  Paris.  \n"})), "Paris.");
        assert_eq!(answer(json!("  spaced ")), "spaced");
    }
}
