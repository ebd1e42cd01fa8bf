use std::time::Duration;

use paket_core::{title_with_timeout, HttpTitleSource, TitleSource};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn serve(route: &str, response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

#[tokio::test]
async fn html_pages_use_their_title() {
    let server = serve(
        "/article",
        ResponseTemplate::new(200)
            .set_body_raw(
                "<html><head><title>Read Me!</title></head><body></body></html>",
                "text/html; charset=utf-8",
            ),
    )
    .await;

    let source = HttpTitleSource::new().unwrap();
    let title = source.title_for(&url(&server, "/article")).await.unwrap();
    assert_eq!(title.as_deref(), Some("Read Me!"));
}

#[tokio::test]
async fn pdfs_are_named_after_the_file() {
    let server = serve(
        "/docs/report.pdf",
        ResponseTemplate::new(200)
            .insert_header("content-type", "application/pdf")
            .set_body_bytes(b"%PDF-1.4".to_vec()),
    )
    .await;

    let source = HttpTitleSource::new().unwrap();
    let title = source.title_for(&url(&server, "/docs/report.pdf")).await.unwrap();
    assert_eq!(title.as_deref(), Some("[PDF] report.pdf"));
}

#[tokio::test]
async fn other_content_types_are_marked_unknown() {
    let server = serve(
        "/data",
        ResponseTemplate::new(200)
            .insert_header("content-type", "application/json")
            .set_body_string("{}"),
    )
    .await;

    let target = url(&server, "/data");
    let source = HttpTitleSource::new().unwrap();
    let title = source.title_for(&target).await.unwrap();
    assert_eq!(title, Some(format!("[???] {target}")));
}

#[tokio::test]
async fn failures_and_timeouts_yield_no_title() {
    let server = serve("/missing", ResponseTemplate::new(404)).await;
    let source = HttpTitleSource::new().unwrap();
    let missing = title_with_timeout(&source, &url(&server, "/missing"), Duration::from_secs(2)).await;
    assert_eq!(missing, None);

    let slow = serve(
        "/slow",
        ResponseTemplate::new(200)
            .insert_header("content-type", "text/html")
            .set_body_string("<title>late</title>")
            .set_delay(Duration::from_secs(2)),
    )
    .await;
    let late = title_with_timeout(&source, &url(&slow, "/slow"), Duration::from_millis(100)).await;
    assert_eq!(late, None);
}
