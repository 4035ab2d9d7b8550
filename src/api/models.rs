use serde::{Deserialize, Serialize};

use crate::extract::ExtractMode;

#[derive(Deserialize)]
pub struct CaptureRequest {
    pub url: String,
    #[serde(default)]
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub mode: ExtractMode,
}

#[derive(Deserialize)]
pub struct PageQuery {
    pub url: String,
}

#[derive(Serialize)]
pub struct CaptureResponse {
    pub record: crate::extract::ExtractionRecord,
    pub captures: usize,
}

#[derive(Serialize)]
pub struct SourceOption {
    pub url: String,
    pub label: String,
}

#[derive(Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default, alias = "sourceUrl")]
    pub source_url: String,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub answer: String,
}

#[derive(Deserialize)]
pub struct SaveSettingsRequest {
    #[serde(default)]
    pub endpoint: String,
    #[serde(default)]
    pub model: String,
}

#[derive(Deserialize, Default)]
pub struct TestConnectionRequest {
    pub endpoint: Option<String>,
}

#[derive(Serialize)]
pub struct ConnectionStatus {
    pub endpoint: String,
    pub message: String,
}
