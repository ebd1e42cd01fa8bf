use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Datelike, Duration, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::article::{parse_article_url, Article, NewArticle};
use crate::error::StoreError;

/// Weeks in an ISO year, upper bound for the weekly statistics.
pub const WEEKS_PER_YEAR: u32 = 53;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
struct StoreData {
    articles: Vec<Article>,
    // ISO week of year -> number of stored articles after the last change that week
    #[serde(default)]
    weekly: BTreeMap<u32, u64>,
}

impl StoreData {
    fn record_week(&mut self, now: DateTime<Utc>) {
        let week = now.iso_week().week();
        self.weekly.insert(week, self.articles.len() as u64);
        self.weekly.retain(|w, _| *w <= week);
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct WeeklyCount {
    pub week: u32,
    pub articles: u64,
}

/// Saved articles, kept in memory and mirrored to a single JSON file.
///
/// Mutations are serialized through `writer`: each one works on a copy of
/// the current data, writes it to disk and only then swaps it in, so readers
/// never observe a change that failed to persist.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    inner: Arc<RwLock<StoreData>>,
    writer: Arc<Mutex<()>>,
    path: Option<PathBuf>,
    ttl: Duration,
}

impl ArticleStore {
    pub fn in_memory(ttl: Duration) -> Self {
        Self::with_data(StoreData::default(), None, ttl)
    }

    pub async fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let data = load_with_tmp_fallback(&path).await?;
        info!(
            path = %path.display(),
            articles = data.articles.len(),
            "opened article store"
        );
        Ok(Self::with_data(data, Some(path), ttl))
    }

    fn with_data(data: StoreData, path: Option<PathBuf>, ttl: Duration) -> Self {
        Self {
            inner: Arc::new(RwLock::new(data)),
            writer: Arc::new(Mutex::new(())),
            path,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Saves `url` now and returns the guid assigned to it.
    pub async fn put(&self, url: &str) -> Result<String, StoreError> {
        let url = parse_article_url(url)?;
        let article = self.put_article(NewArticle::new(url)).await?;
        Ok(article.guid)
    }

    pub async fn put_article(&self, new: NewArticle) -> Result<Article, StoreError> {
        let article = self
            .mutate(|data| {
                let mut article = new.into_article();
                while data.articles.iter().any(|a| a.guid == article.guid) {
                    article.guid = Uuid::new_v4().to_string();
                }
                data.articles.push(article.clone());
                Ok(article)
            })
            .await?;
        info!(guid = %article.guid, url = %article.url, "article saved");
        Ok(article)
    }

    pub async fn delete(&self, guid: &str) -> Result<(), StoreError> {
        self.mutate(|data| {
            let before = data.articles.len();
            data.articles.retain(|a| a.guid != guid);
            if data.articles.len() == before {
                Err(StoreError::NotFound(guid.to_owned()))
            } else {
                Ok(())
            }
        })
        .await?;
        info!(%guid, "article deleted");
        Ok(())
    }

    /// Removes every article saved strictly before `cutoff`.
    pub async fn expire(&self, cutoff: DateTime<Utc>) -> Result<usize, StoreError> {
        let removed = self
            .mutate(|data| {
                let before = data.articles.len();
                data.articles.retain(|a| a.saved_at >= cutoff);
                Ok(before - data.articles.len())
            })
            .await?;
        if removed > 0 {
            info!(removed, %cutoff, "expired articles");
        }
        Ok(removed)
    }

    /// Articles newest first, optionally without the ones past their TTL.
    pub async fn list(&self, active_only: bool) -> Vec<Article> {
        let now = Utc::now();
        let inner = self.inner.read().await;
        let mut articles: Vec<Article> = inner
            .articles
            .iter()
            .filter(|a| !active_only || !a.is_expired(self.ttl, now))
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        articles
    }

    pub async fn weekly_counts(&self) -> Vec<WeeklyCount> {
        let inner = self.inner.read().await;
        inner
            .weekly
            .iter()
            .map(|(week, articles)| WeeklyCount {
                week: *week,
                articles: *articles,
            })
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.articles.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut StoreData) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let _writer = self.writer.lock().await;
        let mut next = self.inner.read().await.clone();
        let out = change(&mut next)?;
        next.record_week(Utc::now());
        self.persist(&next).await?;
        *self.inner.write().await = next;
        Ok(out)
    }

    async fn persist(&self, data: &StoreData) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            debug!("article store is in-memory only; skipping persist");
            return Ok(());
        };
        let bytes = serde_json::to_vec_pretty(data)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = tmp_path(path);
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

/// Sibling file used for atomic writes: `<path>.tmp`.
pub fn tmp_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

async fn load_with_tmp_fallback(path: &Path) -> Result<StoreData, StoreError> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no store file yet, starting empty");
            return Ok(StoreData::default());
        }
        Err(err) => return Err(err.into()),
    };

    match serde_json::from_slice::<StoreData>(&bytes) {
        Ok(data) => Ok(data),
        Err(err) => {
            warn!(error = %err, path = %path.display(), "failed to parse store, trying tmp fallback");
            let tmp = tmp_path(path);
            tokio::fs::read(&tmp)
                .await
                .ok()
                .and_then(|tmp_bytes| serde_json::from_slice::<StoreData>(&tmp_bytes).ok())
                .ok_or_else(|| StoreError::Corrupt(path.display().to_string()))
        }
    }
}
