pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod qa;
pub mod store;

use std::sync::Arc;
use config::Config;
use store::{PageCache, SettingsStore};

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub pages: Arc<PageCache>,
    pub settings: Arc<SettingsStore>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let pages = PageCache::new(&config.data_dir);
        let settings = SettingsStore::new(&config.data_dir);
        Self {
            config: Arc::new(config),
            pages: Arc::new(pages),
            settings: Arc::new(settings),
        }
    }
}
