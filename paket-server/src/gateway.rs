use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html as HtmlPage, IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Form, Router};
use chrono::Utc;
use paket_core::render::{FeedFormat, FeedView, Html, Rss};
use paket_core::{
    parse_article_url, title_with_timeout, ArticleStore, FeedConfig, NewArticle, StoreError,
    TitleSource, TITLE_TIMEOUT,
};
use serde::Deserialize;
use tracing::{error, info};

const DELETED_PAGE: &str = r#"<!DOCTYPE html><html lang="en"><head><meta charset="UTF-8"><meta http-equiv="refresh" content="0; url=/feed.html"><title>Deleted</title></head><body><a href="/feed.html">Back to feed</a></body></html>"#;

#[derive(Clone)]
pub struct AppState {
    pub store: ArticleStore,
    pub config: Arc<FeedConfig>,
    pub titles: Arc<dyn TitleSource>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/save", put(handle_save_article))
        .route("/delete", post(handle_delete_article))
        .route("/feed.xml", get(handle_get_feed::<Rss>))
        .route("/feed.html", get(handle_get_feed::<Html>))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct SaveForm {
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct DeleteForm {
    #[serde(default)]
    guid: String,
}

/// Maps store failures onto HTTP statuses.
pub struct ApiError(StoreError);

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            StoreError::InvalidUrl(_) => StatusCode::BAD_REQUEST,
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            err => {
                error!(error = %err, "storage failure");
                return StatusCode::INTERNAL_SERVER_ERROR.into_response();
            }
        };
        (status, self.0.to_string()).into_response()
    }
}

async fn handle_save_article(
    State(state): State<AppState>,
    Form(save): Form<SaveForm>,
) -> Result<String, ApiError> {
    info!(url = %save.url, "save_article");

    let url = parse_article_url(&save.url)?;
    // must run before any store call: no store lock is held across network I/O
    let title = title_with_timeout(state.titles.as_ref(), &url, TITLE_TIMEOUT).await;
    let article = state
        .store
        .put_article(NewArticle::new(url).with_title(title))
        .await?;

    Ok(article.guid)
}

async fn handle_delete_article(
    State(state): State<AppState>,
    Form(delete): Form<DeleteForm>,
) -> Result<HtmlPage<&'static str>, ApiError> {
    info!(guid = %delete.guid, "delete_article");

    state.store.delete(delete.guid.trim()).await?;
    Ok(HtmlPage(DELETED_PAGE))
}

async fn handle_get_feed<T: FeedFormat>(State(state): State<AppState>) -> Response {
    let articles = state.store.list(true).await;
    let weekly = state.store.weekly_counts().await;
    info!(
        articles = articles.len(),
        content_type = T::CONTENT_TYPE,
        "get_feed"
    );

    let body = T::render(&FeedView {
        config: &state.config,
        articles: &articles,
        weekly: &weekly,
        generated_at: Utc::now(),
    });

    ([(header::CONTENT_TYPE, T::CONTENT_TYPE)], body).into_response()
}
