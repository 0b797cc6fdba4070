//! Caching HTTP proxy in front of a lyrics provider.

pub mod cache;
pub mod config;
pub mod error;
pub mod genius;
pub mod requests_logging;
pub mod server;
pub mod service;
pub mod upstream;

pub use cache::{Clock, LyricsCache, ManualClock, SystemClock};
pub use config::{CliConfig, FileConfig, ProxyConfig, UpstreamKind};
pub use error::LyricsError;
pub use requests_logging::RequestsLoggingLevel;
pub use server::{make_app, run_server};
pub use service::LyricsService;
pub use upstream::{LyricsUpstream, LyristClient};
