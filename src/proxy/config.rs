use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use super::cache::DEFAULT_TTL;
use super::requests_logging::{parse_logging_level, RequestsLoggingLevel};
use super::service::DEFAULT_PRE_DELAY;
use super::upstream::LYRIST_URL;

pub const DEFAULT_PORT: u16 = 3002;
pub const DEFAULT_TIMEOUT_SEC: u64 = 10;
pub const DEFAULT_CORS_ORIGINS: [&str; 3] = [
    "http://localhost:8080",
    "http://192.168.29.63:8080",
    "http://192.168.80.1:8080",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum UpstreamKind {
    #[default]
    Lyrist,
    Genius,
}

/// Values taken from the command line, before the config file is applied.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub cors_origins: Vec<String>,
    pub upstream: UpstreamKind,
    pub upstream_url: Option<String>,
    pub genius_token: Option<String>,
    pub timeout_sec: u64,
    pub pre_delay_ms: u64,
    pub cache_ttl_sec: u64,
    pub cache_max_entries: Option<usize>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            logging_level: RequestsLoggingLevel::Path,
            cors_origins: Vec::new(),
            upstream: UpstreamKind::Lyrist,
            upstream_url: None,
            genius_token: None,
            timeout_sec: DEFAULT_TIMEOUT_SEC,
            pre_delay_ms: DEFAULT_PRE_DELAY.as_millis() as u64,
            cache_ttl_sec: DEFAULT_TTL.as_secs(),
            cache_max_entries: None,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub logging_level: Option<String>,
    pub cors_origins: Option<Vec<String>>,
    pub upstream: Option<String>,
    pub upstream_url: Option<String>,
    pub genius_token: Option<String>,
    pub timeout_sec: Option<u64>,
    pub pre_delay_ms: Option<u64>,
    pub cache_ttl_sec: Option<u64>,
    pub cache_max_entries: Option<usize>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}

#[derive(Debug, Clone)]
pub struct ProxyConfig {
    pub port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub cors_origins: Vec<String>,
    pub upstream: UpstreamKind,
    pub upstream_url: String,
    pub genius_token: Option<String>,
    pub timeout: Duration,
    pub pre_delay: Duration,
    pub cache_ttl: Duration,
    pub cache_max_entries: Option<usize>,
}

impl ProxyConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or(cli.logging_level);

        let cors_origins = file
            .cors_origins
            .or_else(|| (!cli.cors_origins.is_empty()).then(|| cli.cors_origins.clone()))
            .unwrap_or_else(|| DEFAULT_CORS_ORIGINS.iter().map(|s| s.to_string()).collect());

        let upstream = match file.upstream.as_deref() {
            Some(name) => <UpstreamKind as clap::ValueEnum>::from_str(name, true)
                .map_err(|_| anyhow::anyhow!("Unknown upstream in config file: {}", name))?,
            None => cli.upstream,
        };
        let genius_token = file.genius_token.or_else(|| cli.genius_token.clone());
        if upstream == UpstreamKind::Genius && genius_token.is_none() {
            bail!("The genius upstream needs --genius-token or genius_token in the config file");
        }

        let upstream_url = file
            .upstream_url
            .or_else(|| cli.upstream_url.clone())
            .unwrap_or_else(|| LYRIST_URL.to_string());

        Ok(Self {
            port,
            logging_level,
            cors_origins,
            upstream,
            upstream_url,
            genius_token,
            timeout: Duration::from_secs(file.timeout_sec.unwrap_or(cli.timeout_sec)),
            pre_delay: Duration::from_millis(file.pre_delay_ms.unwrap_or(cli.pre_delay_ms)),
            cache_ttl: Duration::from_secs(file.cache_ttl_sec.unwrap_or(cli.cache_ttl_sec)),
            cache_max_entries: file.cache_max_entries.or(cli.cache_max_entries),
        })
    }
}
