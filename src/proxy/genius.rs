//! Genius as an alternative upstream: search, song details, then the lyrics
//! scraped from the song page.

use async_trait::async_trait;
use regex::Regex;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, warn};

use super::error::LyricsError;
use super::upstream::{check_status, map_send_error, LyricsUpstream, BROWSER_USER_AGENT};

pub const GENIUS_API_URL: &str = "https://api.genius.com";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    response: T,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    hits: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    result: SongSummary,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SongSummary {
    pub id: u64,
    pub title: String,
}

#[derive(Debug, Deserialize)]
struct SongResponse {
    song: SongDetails,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SongDetails {
    pub title: String,
    pub url: String,
    pub primary_artist: Artist,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Artist {
    pub name: String,
}

fn lyrics_container() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<div[^>]*class="Lyrics__Container-sc-[^>]*>(.*?)</div>"#)
            .expect("valid lyrics container regex")
    })
}

fn html_tag() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").expect("valid tag regex"))
}

fn blank_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid blank line regex"))
}

/// Pulls the first lyrics container out of a song page, tags turned into
/// line breaks.
pub fn extract_lyrics(html: &str) -> Result<String, LyricsError> {
    let inner = lyrics_container()
        .captures(html)
        .and_then(|captures| captures.get(1))
        .ok_or_else(|| LyricsError::Internal("Could not extract lyrics".to_string()))?;

    let text = html_tag().replace_all(inner.as_str(), "\n");
    let text = blank_runs().replace_all(&text, "\n");
    let text = text.trim();
    if text.is_empty() {
        return Err(LyricsError::Internal("Could not extract lyrics".to_string()));
    }
    Ok(text.to_string())
}

pub struct GeniusClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl GeniusClient {
    pub fn new(access_token: &str, timeout: Duration) -> Result<Self, LyricsError> {
        Self::with_base_url(GENIUS_API_URL, access_token, timeout)
    }

    pub fn with_base_url(
        base_url: &str,
        access_token: &str,
        timeout: Duration,
    ) -> Result<Self, LyricsError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| LyricsError::Internal(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        })
    }

    async fn get_api<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, LyricsError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .header(AUTHORIZATION, format!("Bearer {}", self.access_token))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(map_send_error)?;
        let response = check_status(response).await?;
        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| LyricsError::Internal(format!("Unexpected Genius response: {}", e)))?;
        Ok(envelope.response)
    }

    /// Best match for `query`, if any.
    pub async fn search_song(&self, query: &str) -> Result<Option<SongSummary>, LyricsError> {
        let search: SearchResponse = self.get_api("/search", &[("q", query)]).await?;
        Ok(search.hits.into_iter().next().map(|hit| hit.result))
    }

    pub async fn song(&self, id: u64) -> Result<SongDetails, LyricsError> {
        let song: SongResponse = self.get_api(&format!("/songs/{}", id), &[]).await?;
        Ok(song.song)
    }

    pub async fn lyrics(&self, id: u64) -> Result<Value, LyricsError> {
        let song = self.song(id).await?;
        let html = self
            .client
            .get(&song.url)
            .send()
            .await
            .map_err(map_send_error)?
            .text()
            .await
            .map_err(map_send_error)?;
        let lyrics = extract_lyrics(&html).inspect_err(|_| {
            warn!("No lyrics container found on {}", song.url);
        })?;
        Ok(json!({
            "lyrics": lyrics,
            "title": song.title,
            "artist": song.primary_artist.name,
        }))
    }
}

#[async_trait]
impl LyricsUpstream for GeniusClient {
    async fn fetch(&self, query: &str) -> Result<Value, LyricsError> {
        let Some(hit) = self.search_song(query).await? else {
            return Err(LyricsError::Upstream {
                status: 404,
                details: Value::String(format!("No song found for '{}'", query)),
            });
        };
        debug!("Genius match for '{}': {} ({})", query, hit.title, hit.id);
        self.lyrics(hit.id).await
    }
}
