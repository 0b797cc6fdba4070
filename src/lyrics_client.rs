//! Player side of the lyrics proxy: one blocking lookup per request, run on
//! a background thread so the UI keeps drawing.

use serde::Deserialize;
use serde_json::Value;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use crate::lyrics::LyricsDocument;

pub const DEFAULT_PROXY_URL: &str = "http://localhost:3002/api/lyrics";

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Rate limit exceeded. Please try again in {0} seconds.")]
    RateLimited(u64),
    #[error("{0}")]
    Proxy(String),
    #[error("No lyrics found for this song")]
    NotFound,
    #[error("Lyrics service unavailable: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Default, Deserialize)]
struct LyricsPayload {
    lyrics: Option<String>,
    title: Option<String>,
    artist: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorPayload {
    error: Option<String>,
    details: Option<Value>,
    #[serde(rename = "retryAfter")]
    retry_after: Option<u64>,
}

impl ErrorPayload {
    fn message(self, status: reqwest::StatusCode) -> String {
        let error = self
            .error
            .unwrap_or_else(|| format!("Lyrics request failed ({})", status));
        match self.details {
            Some(Value::String(details)) if !details.is_empty() => {
                format!("{}: {}", error, details)
            }
            _ => error,
        }
    }
}

#[derive(Clone)]
pub struct LyricsLookup {
    client: reqwest::blocking::Client,
    url: String,
}

impl LyricsLookup {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }

    pub fn fetch(&self, query: &str) -> Result<LyricsDocument, LookupError> {
        let response = self.client.get(&self.url).query(&[("q", query)]).send()?;
        let status = response.status();

        if !status.is_success() {
            let payload: ErrorPayload = response.json().unwrap_or_default();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                return Err(LookupError::RateLimited(payload.retry_after.unwrap_or(60)));
            }
            return Err(LookupError::Proxy(payload.message(status)));
        }

        let payload: LyricsPayload = response.json()?;
        let document = LyricsDocument::parse(payload.lyrics.unwrap_or_default())
            .with_credits(payload.artist, payload.title);
        if document.is_empty() {
            return Err(LookupError::NotFound);
        }
        info!(
            "Found {} lyric lines for '{}'",
            document.line_count(),
            query
        );
        Ok(document)
    }

    /// Runs [`fetch`](Self::fetch) on its own thread; the result arrives on
    /// the returned channel.
    pub fn spawn(&self, query: String) -> mpsc::Receiver<Result<LyricsDocument, LookupError>> {
        let (tx, rx) = mpsc::channel();
        let lookup = self.clone();
        thread::spawn(move || {
            let result = lookup.fetch(&query);
            if let Err(e) = &result {
                warn!("Lyrics lookup for '{}' failed: {}", query, e);
            }
            // the receiver is gone if the player moved on
            let _ = tx.send(result);
        });
        rx
    }
}
