use axum::{
    body::Body,
    extract::State,
    http::{Request, Response},
    middleware::Next,
};
use std::time::Instant;
use tracing::info;

#[derive(PartialEq, PartialOrd, Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    #[default]
    Path,
    Headers,
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub fn parse_logging_level(value: &str) -> Option<RequestsLoggingLevel> {
    <RequestsLoggingLevel as clap::ValueEnum>::from_str(value, true).ok()
}

pub async fn log_requests(
    State(level): State<RequestsLoggingLevel>,
    request: Request<Body>,
    next: Next,
) -> Response<Body> {
    let start = Instant::now();

    if level > RequestsLoggingLevel::None {
        info!(">>> {} {}", request.method(), request.uri());
    }
    if level >= RequestsLoggingLevel::Headers {
        info!("  Req Headers:");
        for (name, value) in request.headers().iter() {
            info!("    {:?}: {:?}", name, value);
        }
    }

    let response = next.run(request).await;

    if level >= RequestsLoggingLevel::Headers {
        info!("  Resp Headers:");
        for (name, value) in response.headers().iter() {
            info!("    {:?}: {:?}", name, value);
        }
    }
    if level > RequestsLoggingLevel::None {
        info!(
            "<<< {} ({}ms)",
            response.status().as_u16(),
            start.elapsed().as_millis()
        );
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_logging_level() {
        assert_eq!(parse_logging_level("none"), Some(RequestsLoggingLevel::None));
        assert_eq!(parse_logging_level("Headers"), Some(RequestsLoggingLevel::Headers));
        assert_eq!(parse_logging_level("body"), None);
        assert!(RequestsLoggingLevel::Headers > RequestsLoggingLevel::Path);
    }
}
