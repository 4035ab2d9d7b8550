use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::info;
use url::Url;

use crate::error::{AppError, Result};

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8081/v1/analyze";

/// Endpoint configuration as handed to callers, defaults already applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub endpoint: String,
    /// Display only; never sent to the endpoint.
    pub model: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredSettings {
    #[serde(rename = "ollamaEndpoint", default, skip_serializing_if = "Option::is_none")]
    endpoint: Option<String>,
    #[serde(rename = "ollamaModel", default, skip_serializing_if = "Option::is_none")]
    model: Option<String>,
}

#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl SettingsStore {
    pub const FILE_NAME: &'static str = "settings.json";

    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(Self::FILE_NAME),
            lock: Mutex::new(()),
        }
    }

    pub async fn load(&self) -> Result<EndpointConfig> {
        let _guard = self.lock.lock().await;
        let stored: StoredSettings = super::read_json(&self.path).await?;
        Ok(EndpointConfig {
            endpoint: stored
                .endpoint
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            model: stored.model.unwrap_or_default(),
        })
    }

    /// Validates and persists both fields together. Nothing is written on error.
    pub async fn save(&self, endpoint: &str, model: &str) -> Result<EndpointConfig> {
        let endpoint = validate_endpoint(endpoint)?;
        let model = model.trim().to_string();

        let _guard = self.lock.lock().await;
        let stored = StoredSettings {
            endpoint: Some(endpoint.clone()),
            model: Some(model.clone()),
        };
        super::write_json(&self.path, &stored).await?;
        info!(endpoint = %endpoint, "saved endpoint settings");
        Ok(EndpointConfig { endpoint, model })
    }
}

/// Trims `endpoint` and checks that it is an absolute URL, returning it as typed.
pub fn validate_endpoint(endpoint: &str) -> Result<String> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(AppError::Validation("Please enter an endpoint".to_string()));
    }
    Url::parse(endpoint).map_err(|_| {
        AppError::Validation("Invalid endpoint URL. Please enter a valid URL.".to_string())
    })?;
    Ok(endpoint.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let config = store.load().await.unwrap();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.model, "");
    }

    #[tokio::test]
    async fn invalid_endpoint_is_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());

        let err = store.save("not a url", "llama3").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!dir.path().join(SettingsStore::FILE_NAME).exists());
        assert_eq!(store.load().await.unwrap().endpoint, DEFAULT_ENDPOINT);
    }

    #[tokio::test]
    async fn empty_endpoint_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        let err = store.save("   ", "").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter an endpoint");
    }

    #[tokio::test]
    async fn saved_endpoint_round_trips_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        store.save("https://example.com/api", "mistral").await.unwrap();

        let config = SettingsStore::new(dir.path()).load().await.unwrap();
        assert_eq!(config.endpoint, "https://example.com/api");
        assert_eq!(config.model, "mistral");
    }

    #[tokio::test]
    async fn persists_under_extension_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = SettingsStore::new(dir.path());
        store.save("http://127.0.0.1:9000/ask", "").await.unwrap();

        let raw = std::fs::read_to_string(dir.path().join(SettingsStore::FILE_NAME)).unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["ollamaEndpoint"], "http://127.0.0.1:9000/ask");
        assert_eq!(json["ollamaModel"], "");
    }
}
