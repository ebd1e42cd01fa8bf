pub mod article;
pub mod client;
pub mod config;
pub mod error;
pub mod expiry;
pub mod render;
pub mod store;
pub mod title;

pub use article::{parse_article_url, Article, NewArticle};
pub use client::{parse_headers, SaveClient, SaveOutcome};
pub use config::{ExpiryConfig, FeedConfig};
pub use error::{ClientError, ExpiryError, StoreError, TitleError};
pub use expiry::{spawn_expiry, sweep_once, ExpiryHandle};
pub use render::{render_html, render_rss, FeedFormat, FeedView, Html, Rss};
pub use store::{ArticleStore, WeeklyCount};
pub use title::{title_with_timeout, HttpTitleSource, NoTitles, TitleSource, TITLE_TIMEOUT};
