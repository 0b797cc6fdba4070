use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sonic_vision::proxy::{
    config::{DEFAULT_PORT, DEFAULT_TIMEOUT_SEC},
    run_server, CliConfig, FileConfig, ProxyConfig, RequestsLoggingLevel, UpstreamKind,
};

#[derive(Parser, Debug)]
struct CliArgs {
    #[clap(short, long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// Allowed CORS origin, repeatable.
    #[clap(long = "cors-origin")]
    pub cors_origins: Vec<String>,

    #[clap(long, default_value = "lyrist")]
    pub upstream: UpstreamKind,

    #[clap(long)]
    pub upstream_url: Option<String>,

    #[clap(long)]
    pub genius_token: Option<String>,

    #[clap(long, default_value_t = DEFAULT_TIMEOUT_SEC)]
    pub timeout_sec: u64,

    #[clap(long, default_value_t = 1000)]
    pub pre_delay_ms: u64,

    #[clap(long, default_value_t = 24 * 60 * 60)]
    pub cache_ttl_sec: u64,

    #[clap(long)]
    pub cache_max_entries: Option<usize>,

    /// Path to TOML config file. Values in the file override CLI arguments.
    #[clap(long)]
    pub config: Option<PathBuf>,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            port: self.port,
            logging_level: self.logging_level,
            cors_origins: self.cors_origins.clone(),
            upstream: self.upstream,
            upstream_url: self.upstream_url.clone(),
            genius_token: self.genius_token.clone(),
            timeout_sec: self.timeout_sec,
            pre_delay_ms: self.pre_delay_ms,
            cache_ttl_sec: self.cache_ttl_sec,
            cache_max_entries: self.cache_max_entries,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = ProxyConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    run_server(config).await
}

#[cfg(test)]
mod tests {
    use super::*;

    // the only test that touches PORT
    #[test]
    fn test_port_from_env_unless_given() {
        std::env::remove_var("PORT");
        let args = CliArgs::try_parse_from(["lyrics-proxy"]).unwrap();
        assert_eq!(args.port, DEFAULT_PORT);

        std::env::set_var("PORT", "4100");
        let args = CliArgs::try_parse_from(["lyrics-proxy"]).unwrap();
        assert_eq!(args.to_cli_config().port, 4100);
        let args = CliArgs::try_parse_from(["lyrics-proxy", "--port", "5000"]).unwrap();
        assert_eq!(args.port, 5000);
        std::env::remove_var("PORT");
    }
}
