use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::Result;
use crate::extract::ExtractionRecord;

type Entries = BTreeMap<String, Vec<ExtractionRecord>>;

/// Durable mapping from page URL to every capture taken of it, oldest first.
///
/// Backed by a single JSON object on disk. Each operation reads the file,
/// applies its change and writes it back while holding `lock`, so two
/// concurrent appends for one URL both land.
#[derive(Debug)]
pub struct PageCache {
    path: PathBuf,
    lock: Mutex<()>,
}

/// Listing row describing the latest capture of one page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSummary {
    pub url: String,
    pub title: String,
    pub word_count: usize,
    pub captured_at: DateTime<Utc>,
    pub captures: usize,
}

impl PageSummary {
    /// Label used when offering the page as a question source.
    pub fn source_label(&self) -> String {
        format!("{} ({} words)", self.title, self.word_count)
    }
}

impl PageCache {
    pub const FILE_NAME: &'static str = "pages.json";

    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(Self::FILE_NAME),
            lock: Mutex::new(()),
        }
    }

    pub async fn append(&self, record: ExtractionRecord) -> Result<usize> {
        let _guard = self.lock.lock().await;
        let mut entries: Entries = super::read_json(&self.path).await?;
        let url = record.url.clone();
        let captures = entries.entry(url.clone()).or_default();
        captures.push(record);
        let count = captures.len();
        super::write_json(&self.path, &entries).await?;
        info!(url = %url, captures = count, "cached page text");
        Ok(count)
    }

    pub async fn get(&self, url: &str) -> Result<Vec<ExtractionRecord>> {
        let _guard = self.lock.lock().await;
        let mut entries: Entries = super::read_json(&self.path).await?;
        Ok(entries.remove(url).unwrap_or_default())
    }

    pub async fn latest(&self, url: &str) -> Result<Option<ExtractionRecord>> {
        Ok(self.get(url).await?.pop())
    }

    /// Every cached page with its captures, ordered by URL.
    pub async fn get_all(&self) -> Result<Vec<(String, Vec<ExtractionRecord>)>> {
        let _guard = self.lock.lock().await;
        let entries: Entries = super::read_json(&self.path).await?;
        Ok(entries
            .into_iter()
            .filter(|(_, records)| !records.is_empty())
            .collect())
    }

    pub async fn summaries(&self) -> Result<Vec<PageSummary>> {
        let all = self.get_all().await?;
        Ok(all
            .into_iter()
            .filter_map(|(url, records)| {
                let captures = records.len();
                records.into_iter().last().map(|latest| PageSummary {
                    url,
                    title: latest.title,
                    word_count: latest.word_count,
                    captured_at: latest.timestamp,
                    captures,
                })
            })
            .collect())
    }

    /// Returns whether an entry existed.
    pub async fn remove(&self, url: &str) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut entries: Entries = super::read_json(&self.path).await?;
        let existed = entries.remove(url).is_some();
        if existed {
            super::write_json(&self.path, &entries).await?;
        }
        debug!(url = %url, existed, "removed cached page");
        Ok(existed)
    }

    /// Drops every cached page. Endpoint settings live elsewhere and survive.
    pub async fn clear(&self) -> Result<()> {
        let _guard = self.lock.lock().await;
        super::write_json(&self.path, &Entries::new()).await?;
        info!("cleared page cache");
        Ok(())
    }
}
