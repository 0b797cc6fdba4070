use async_trait::async_trait;
use reqwest::header::{ACCEPT, RETRY_AFTER, USER_AGENT};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error};

use super::error::{parse_retry_after, LyricsError};

pub const LYRIST_URL: &str = "https://lyrist.vercel.app/api/lyrics";
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// A lyrics provider the proxy forwards cache misses to.
#[async_trait]
pub trait LyricsUpstream: Send + Sync {
    async fn fetch(&self, query: &str) -> Result<Value, LyricsError>;
}

/// Maps a transport failure: no response at all is `Unreachable`.
pub(crate) fn map_send_error(err: reqwest::Error) -> LyricsError {
    if err.is_timeout() || err.is_connect() || err.is_request() {
        LyricsError::Unreachable(err.to_string())
    } else {
        LyricsError::Internal(err.to_string())
    }
}

/// Non-2xx statuses become typed errors; the body is kept as JSON when it
/// parses, as a string otherwise.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, LyricsError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = parse_retry_after(
            response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok()),
        );
        return Err(LyricsError::RateLimited { retry_after });
    }
    let text = response.text().await.unwrap_or_default();
    let details = serde_json::from_str(&text).unwrap_or(Value::String(text));
    Err(LyricsError::Upstream {
        status: status.as_u16(),
        details,
    })
}

pub struct LyristClient {
    client: reqwest::Client,
    base_url: String,
}

impl LyristClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LyricsError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LyricsError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl LyricsUpstream for LyristClient {
    async fn fetch(&self, query: &str) -> Result<Value, LyricsError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query)])
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await
            .map_err(map_send_error)?;
        debug!("Lyrist API response status: {}", response.status());

        let response = check_status(response).await?;
        let text = response.text().await.map_err(map_send_error)?;
        if text.trim().is_empty() {
            error!("Empty body from lyrics API for '{}'", query);
            return Err(LyricsError::Internal(
                "No data received from Lyrist API".to_string(),
            ));
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}
