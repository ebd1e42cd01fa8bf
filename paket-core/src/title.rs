use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{redirect, Client};
use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::error::TitleError;

/// Upper bound for looking up a title while a client waits on `/save`.
pub const TITLE_TIMEOUT: Duration = Duration::from_secs(5);

const MAX_REDIRECTS: usize = 5;

/// Produces a human readable title for a saved URL.
#[async_trait]
pub trait TitleSource: Send + Sync {
    async fn title_for(&self, url: &Url) -> Result<Option<String>, TitleError>;
}

/// Never looks anything up.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTitles;

#[async_trait]
impl TitleSource for NoTitles {
    async fn title_for(&self, _url: &Url) -> Result<Option<String>, TitleError> {
        Ok(None)
    }
}

/// Fetches the page and derives a title from its content type.
#[derive(Debug, Clone)]
pub struct HttpTitleSource {
    client: Client,
}

impl HttpTitleSource {
    pub fn new() -> Result<Self, TitleError> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent("paket")
            .build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TitleSource for HttpTitleSource {
    async fn title_for(&self, url: &Url) -> Result<Option<String>, TitleError> {
        let response = self
            .client
            .get(url.clone())
            .header(
                ACCEPT,
                "text/html,application/xhtml+xml,application/pdf,*/*;q=0.1",
            )
            .send()
            .await?
            .error_for_status()?;

        let final_url = response.url().clone();
        let media_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(|value| value.trim().to_ascii_lowercase())
            .unwrap_or_default();
        debug!(url = %final_url, %media_type, "fetched page for title");

        let title = match media_type.as_str() {
            "text/html" | "application/xhtml+xml" => {
                let body = response.text().await?;
                extract_html_title(&body)
            }
            "application/pdf" => Some(pdf_title(&final_url)),
            _ => Some(format!("[???] {final_url}")),
        };
        Ok(title)
    }
}

/// Text of the first `<title>` element with whitespace collapsed.
pub fn extract_html_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let title = document.select(&selector).next()?.text().collect::<String>();
    let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
    (!title.is_empty()).then_some(title)
}

fn pdf_title(url: &Url) -> String {
    let name = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(ToString::to_string)
        .unwrap_or_else(|| url.to_string());
    format!("[PDF] {name}")
}

/// Looks up a title, giving up after `limit`. Failures only get logged.
pub async fn title_with_timeout(
    source: &dyn TitleSource,
    url: &Url,
    limit: Duration,
) -> Option<String> {
    match tokio::time::timeout(limit, source.title_for(url)).await {
        Ok(Ok(title)) => title,
        Ok(Err(err)) => {
            warn!(%url, error = %err, "title lookup failed");
            None
        }
        Err(_) => {
            warn!(%url, error = %TitleError::Timeout, "title lookup failed");
            None
        }
    }
}
