use std::sync::Arc;

use chrono::Duration;
use paket_core::{ArticleStore, FeedConfig, NoTitles};
use paket_server::{router, AppState};
use reqwest::{Client, StatusCode};
use tokio::net::TcpListener;

async fn start(store: ArticleStore) -> String {
    let state = AppState {
        store,
        config: Arc::new(FeedConfig::new("https://paket.example/")),
        titles: Arc::new(NoTitles),
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}

async fn feed_xml(client: &Client, base: &str) -> rss::Channel {
    let response = client.get(format!("{base}/feed.xml")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "application/rss+xml");
    let body = response.bytes().await.unwrap();
    rss::Channel::read_from(&body[..]).expect("well-formed rss")
}

#[tokio::test]
async fn save_feed_delete_round_trip() {
    let store = ArticleStore::in_memory(Duration::days(60));
    let base = start(store.clone()).await;
    let client = Client::new();

    let response = client
        .put(format!("{base}/save"))
        .header("authorization", "Bearer ignored")
        .form(&[("url", "https://a.example/x")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let g1 = response.text().await.unwrap();

    let channel = feed_xml(&client, &base).await;
    assert_eq!(channel.items().len(), 1);
    let item = &channel.items()[0];
    assert_eq!(item.link(), Some("https://a.example/x"));
    assert_eq!(item.guid().map(|g| g.value()), Some(g1.as_str()));

    let response = client
        .post(format!("{base}/delete"))
        .form(&[("guid", g1.as_str())])
        .send()
        .await
        .unwrap();
    assert!(response.status().is_success());

    let channel = feed_xml(&client, &base).await;
    assert!(channel.items().is_empty());
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn invalid_url_is_rejected_without_mutation() {
    let store = ArticleStore::in_memory(Duration::days(60));
    store.put("https://a.example/existing").await.unwrap();
    let base = start(store.clone()).await;
    let client = Client::new();
    let before = feed_xml(&client, &base).await.items().len();

    for body in [vec![("url", "not-a-url")], vec![]] {
        let response = client
            .put(format!("{base}/save"))
            .form(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    assert_eq!(store.len().await, 1);
    assert_eq!(feed_xml(&client, &base).await.items().len(), before);
}

#[tokio::test]
async fn deleting_unknown_guid_is_not_found() {
    let store = ArticleStore::in_memory(Duration::days(60));
    store.put("https://a.example/existing").await.unwrap();
    let base = start(store.clone()).await;

    let response = Client::new()
        .post(format!("{base}/delete"))
        .form(&[("guid", "does-not-exist")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(store.len().await, 1);
}

#[tokio::test]
async fn html_feed_lists_active_articles() {
    let store = ArticleStore::in_memory(Duration::days(60));
    let guid = store.put("https://a.example/page").await.unwrap();
    let base = start(store).await;

    let response = Client::new()
        .get(format!("{base}/feed.html"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("text/html"));

    let body = response.text().await.unwrap();
    assert!(body.contains("<h1>My Paket</h1>"));
    assert!(body.contains("href=\"https://a.example/page\""));
    assert!(body.contains(&format!("value=\"{guid}\"")));
}

#[tokio::test]
async fn wrong_methods_are_refused() {
    let base = start(ArticleStore::in_memory(Duration::days(60))).await;
    let client = Client::new();

    let response = client.get(format!("{base}/save")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    let response = client.post(format!("{base}/feed.xml")).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn storage_failure_is_a_server_error_without_mutation() {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "paket_gateway_io_{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    let path = dir.join("paket.json");
    let store = ArticleStore::open(&path, Duration::days(60)).await.unwrap();
    store.put("https://a.example/kept").await.unwrap();
    tokio::fs::create_dir_all(paket_core::store::tmp_path(&path)).await.unwrap();

    let base = start(store.clone()).await;
    let client = Client::new();
    let before = feed_xml(&client, &base).await;

    let response = client
        .put(format!("{base}/save"))
        .form(&[("url", "https://a.example/lost")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let after = feed_xml(&client, &base).await;
    let links = |channel: &rss::Channel| -> Vec<String> {
        channel.items().iter().filter_map(|i| i.link().map(str::to_owned)).collect()
    };
    assert_eq!(links(&after), links(&before));
    assert_eq!(links(&after), vec!["https://a.example/kept".to_owned()]);
    assert_eq!(store.len().await, 1);

    let _ = tokio::fs::remove_dir_all(&dir).await;
}
