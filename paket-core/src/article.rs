use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::StoreError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Article {
    pub guid: String,
    pub url: String,
    pub saved_at: DateTime<Utc>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
}

impl Article {
    /// Title to show in feeds; falls back to the URL when none was extracted.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.url)
    }

    /// A TTL reaching past the representable date range never expires.
    pub fn is_expired(&self, ttl: chrono::Duration, now: DateTime<Utc>) -> bool {
        self.saved_at
            .checked_add_signed(ttl)
            .is_some_and(|deadline| deadline < now)
    }
}

/// An article that has not been assigned a guid yet.
#[derive(Debug, Clone)]
pub struct NewArticle {
    pub url: Url,
    pub saved_at: DateTime<Utc>,
    pub title: Option<String>,
    pub excerpt: Option<String>,
}

impl NewArticle {
    pub fn new(url: Url) -> Self {
        Self {
            url,
            saved_at: Utc::now(),
            title: None,
            excerpt: None,
        }
    }

    pub fn with_title(mut self, title: Option<String>) -> Self {
        self.title = title;
        self
    }

    pub fn saved_at(mut self, saved_at: DateTime<Utc>) -> Self {
        self.saved_at = saved_at;
        self
    }

    pub(crate) fn into_article(self) -> Article {
        Article {
            guid: Uuid::new_v4().to_string(),
            url: self.url.into(),
            saved_at: self.saved_at,
            title: self.title,
            excerpt: self.excerpt,
        }
    }
}

/// Accepts absolute `http`/`https` URLs only.
pub fn parse_article_url(raw: &str) -> Result<Url, StoreError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|_| StoreError::InvalidUrl(raw.to_owned()))?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        _ => Err(StoreError::InvalidUrl(raw.to_owned())),
    }
}
