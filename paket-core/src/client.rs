//! The capture side of the `/save` contract: what a share target or browser
//! extension does with its two settings (target URL and custom headers).

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::error::ClientError;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

pub type SaveOutcome = Result<(), ClientError>;

/// Parses the user's custom headers, a JSON object of strings.
///
/// Never fails: anything unusable is logged and skipped so a bad setting
/// cannot stop a save.
pub fn parse_headers(json: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if json.trim().is_empty() {
        return headers;
    }

    let object = match serde_json::from_str::<serde_json::Value>(json) {
        Ok(serde_json::Value::Object(object)) => object,
        Ok(_) => {
            warn!("custom headers are not a JSON object, ignoring them");
            return headers;
        }
        Err(err) => {
            warn!(error = %err, "custom headers are not valid JSON, ignoring them");
            return headers;
        }
    };

    for (name, value) in object {
        let Some(value) = value.as_str() else {
            warn!(header = %name, "header value is not a string, skipping");
            continue;
        };
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => warn!(header = %name, "invalid header, skipping"),
        }
    }
    headers
}

#[derive(Debug, Clone)]
pub struct SaveClient {
    client: Client,
    target: String,
    headers: HeaderMap,
}

impl SaveClient {
    pub fn new(target: impl Into<String>, headers_json: &str) -> Self {
        Self::with_client(Client::new(), target, headers_json)
    }

    pub fn with_client(client: Client, target: impl Into<String>, headers_json: &str) -> Self {
        let mut headers = parse_headers(headers_json);
        if !headers.contains_key(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE));
        }
        Self {
            client,
            target: target.into(),
            headers,
        }
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// One `PUT` to the target, no retries.
    pub async fn save(&self, url: &str) -> SaveOutcome {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("url", url)
            .finish();

        let response = self
            .client
            .put(&self.target)
            .headers(self.headers.clone())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status(status));
        }
        info!(%url, target = %self.target, "saved");
        Ok(())
    }

    /// Runs the save in the background; the outcome arrives on the receiver.
    pub fn spawn_save(&self, url: impl Into<String>) -> oneshot::Receiver<SaveOutcome> {
        let (done_tx, done_rx) = oneshot::channel();
        let this = self.clone();
        let url = url.into();
        tokio::spawn(async move {
            let outcome = this.save(&url).await;
            if let Err(err) = &outcome {
                warn!(%url, error = %err, "save failed");
            }
            let _ = done_tx.send(outcome);
        });
        done_rx
    }
}
