use chrono::{DateTime, Utc};
use html_escape::{encode_double_quoted_attribute, encode_text};
use rss::{ChannelBuilder, GuidBuilder, ItemBuilder};

use crate::article::Article;
use crate::config::FeedConfig;
use crate::store::{WeeklyCount, WEEKS_PER_YEAR};

const STYLE: &str = r#"
body { font-family: system-ui, sans-serif; max-width: 48rem; margin: 2rem auto; padding: 0 1rem; color: #222; }
h1 { margin-bottom: 0.2rem; }
h3 { margin-top: 0; font-weight: normal; color: #666; }
.feed-info p { margin: 0.2rem 0; color: #555; }
.month-labels { display: flex; justify-content: space-between; font-size: 0.75rem; color: #777; margin-top: 1rem; }
.calendar { display: grid; grid-template-columns: repeat(53, 1fr); gap: 2px; margin: 1rem 0; }
.week-square { aspect-ratio: 1; border-radius: 2px; background: #2da44e; opacity: calc(0.1 + 0.9 * var(--articles) / max(var(--max-articles), 1)); }
.feed-items { list-style: none; padding: 0; }
.feed-item { border-bottom: 1px solid #eee; padding: 0.6rem 0; }
.feed-item h2 { font-size: 1.05rem; margin: 0; word-break: break-word; }
.published-date { font-size: 0.85rem; color: #777; }
.delete-btn { font-size: 0.8rem; margin-top: 0.3rem; }
"#;

/// Everything a feed page is rendered from.
#[derive(Debug, Clone, Copy)]
pub struct FeedView<'a> {
    pub config: &'a FeedConfig,
    pub articles: &'a [Article],
    pub weekly: &'a [WeeklyCount],
    pub generated_at: DateTime<Utc>,
}

pub trait FeedFormat {
    const CONTENT_TYPE: &'static str;

    fn render(view: &FeedView<'_>) -> String;
}

pub struct Html;

pub struct Rss;

impl FeedFormat for Html {
    const CONTENT_TYPE: &'static str = "text/html; charset=utf-8";

    fn render(view: &FeedView<'_>) -> String {
        render_html(view)
    }
}

impl FeedFormat for Rss {
    const CONTENT_TYPE: &'static str = "application/rss+xml";

    fn render(view: &FeedView<'_>) -> String {
        render_rss(view)
    }
}

fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

pub fn render_html(view: &FeedView<'_>) -> String {
    let config = view.config;
    let name = encode_text(&config.name);
    let link_attr = encode_double_quoted_attribute(&config.link);
    let mut buffer = String::with_capacity(4096 + view.articles.len() * 512);

    buffer.push_str("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"UTF-8\">");
    buffer.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\"><title>",
    );
    buffer.push_str(&name);
    buffer.push_str("</title><style>");
    buffer.push_str(STYLE);
    buffer.push_str("</style></head><body>");

    buffer.push_str("<h1>");
    buffer.push_str(&name);
    buffer.push_str("</h1><h3>");
    buffer.push_str(&encode_text(&config.description));
    buffer.push_str("</h3>");

    buffer.push_str("<div class=\"feed-info\"><p>Feed: <a href=\"");
    buffer.push_str(&link_attr);
    buffer.push_str("\">");
    buffer.push_str(&encode_text(&config.link));
    buffer.push_str("</a></p><p>Last Updated: ");
    buffer.push_str(&http_date(view.generated_at));
    buffer.push_str("</p></div>");

    write_month_labels(&mut buffer);
    write_calendar(&mut buffer, view.weekly);
    write_items(&mut buffer, view.articles);

    buffer.push_str("</body></html>");
    buffer
}

fn write_month_labels(buffer: &mut String) {
    buffer.push_str("<div class=\"month-labels\">");
    for month in ["Jan", "Mar", "Jun", "Sep", "Dec"] {
        buffer.push_str("<span>");
        buffer.push_str(month);
        buffer.push_str("</span>");
    }
    buffer.push_str("</div>");
}

fn write_calendar(buffer: &mut String, weekly: &[WeeklyCount]) {
    let max_articles = weekly.iter().map(|w| w.articles).max().unwrap_or(0);

    buffer.push_str(&format!(
        "<div class=\"calendar\" style=\"--max-articles: {max_articles};\">"
    ));
    for week in 1..=WEEKS_PER_YEAR {
        let count = weekly
            .iter()
            .find(|w| w.week == week)
            .map(|w| w.articles)
            .unwrap_or(0);
        buffer.push_str(&format!(
            "<div class=\"week-square\" style=\"--articles: {count};\" title=\"week {week}: {count} articles\"></div>"
        ));
    }
    buffer.push_str("</div>");
}

fn write_items(buffer: &mut String, articles: &[Article]) {
    buffer.push_str("<ul class=\"feed-items\">");
    for article in articles {
        buffer.push_str("<li><article class=\"feed-item\"><h2><a href=\"");
        buffer.push_str(&encode_double_quoted_attribute(&article.url));
        buffer.push_str("\">");
        buffer.push_str(&encode_text(article.display_title()));
        buffer.push_str("</a></h2><div class=\"published-date\">Published: ");
        buffer.push_str(&http_date(article.saved_at));
        buffer.push_str("</div><form method=\"POST\" action=\"/delete\"><input type=\"hidden\" name=\"guid\" value=\"");
        buffer.push_str(&encode_double_quoted_attribute(&article.guid));
        buffer.push_str(
            "\"><button type=\"submit\" class=\"delete-btn\">Delete</button></form></article></li>",
        );
    }
    buffer.push_str("</ul>");
}

pub fn render_rss(view: &FeedView<'_>) -> String {
    let config = view.config;
    let built_at = view.generated_at.to_rfc2822();

    let items: Vec<rss::Item> = view
        .articles
        .iter()
        .map(|article| {
            ItemBuilder::default()
                .title(article.display_title().to_owned())
                .link(article.url.clone())
                .guid(
                    GuidBuilder::default()
                        .value(article.guid.clone())
                        .permalink(false)
                        .build(),
                )
                .pub_date(article.saved_at.to_rfc2822())
                .description(article.excerpt.clone())
                .build()
        })
        .collect();

    ChannelBuilder::default()
        .title(config.name.clone())
        .link(config.link.clone())
        .description(config.description.clone())
        .pub_date(built_at.clone())
        .last_build_date(built_at)
        .ttl("0".to_owned())
        .items(items)
        .build()
        .to_string()
}
