use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use super::cache::LyricsCache;
use super::error::LyricsError;
use super::upstream::LyricsUpstream;

pub const DEFAULT_PRE_DELAY: Duration = Duration::from_secs(1);

/// Cache in front of an upstream, with a fixed pause before every upstream
/// call to stay under the provider's rate limit.
pub struct LyricsService {
    upstream: Arc<dyn LyricsUpstream>,
    cache: LyricsCache,
    pre_delay: Duration,
}

impl LyricsService {
    pub fn new(upstream: Arc<dyn LyricsUpstream>, cache: LyricsCache, pre_delay: Duration) -> Self {
        Self {
            upstream,
            cache,
            pre_delay,
        }
    }

    pub fn cache(&self) -> &LyricsCache {
        &self.cache
    }

    /// Only a missing or empty query is rejected. Anything else, blank
    /// text included, is looked up as given.
    pub async fn fetch_lyrics(&self, query: Option<&str>) -> Result<Value, LyricsError> {
        let query = match query {
            Some(q) if !q.is_empty() => q,
            _ => return Err(LyricsError::MissingQuery),
        };
        info!("Fetching lyrics for query: {}", query);

        if let Some(payload) = self.cache.get(query) {
            info!("Serving from cache: {}", LyricsCache::key(query));
            return Ok(payload);
        }

        if !self.pre_delay.is_zero() {
            tokio::time::sleep(self.pre_delay).await;
        }

        match self.upstream.fetch(query).await {
            Ok(payload) => {
                self.cache.insert(query, payload.clone());
                Ok(payload)
            }
            Err(e) => {
                error!("Lyrics lookup for '{}' failed: {}", query, e);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Upstream that replays canned results and counts calls.
    #[derive(Default)]
    pub struct ScriptedUpstream {
        pub calls: AtomicUsize,
        pub responses: Mutex<Vec<Result<Value, LyricsError>>>,
    }

    impl ScriptedUpstream {
        pub fn returning(responses: Vec<Result<Value, LyricsError>>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                responses: Mutex::new(responses),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl LyricsUpstream for ScriptedUpstream {
        async fn fetch(&self, query: &str) -> Result<Value, LyricsError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut responses = self.responses.lock().unwrap();
            if responses.is_empty() {
                return Ok(serde_json::json!({ "lyrics": format!("lyrics for {}", query) }));
            }
            responses.remove(0)
        }
    }
}
