use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_LEVEL_ENV: &str = "TFFLOW_LOG_LEVEL";

/// Map a TFFLOW_LOG_LEVEL value onto a filter directive level
pub fn filter_level(level: &str) -> &'static str {
    match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" | "warning" => "warn",
        "error" => "error",
        _ => "info",
    }
}

/// Install the global subscriber. Output goes to stderr; stdout carries
/// resource state and the MCP stream.
pub fn init_logging() {
    let log_level = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
    let filter = filter_level(&log_level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("tfflow={},reqwest=warn,hyper=warn", filter).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Log debug level message
pub fn debug(message: &str) {
    tracing::debug!("{}", message);
}

/// Log info level message
pub fn info(message: &str) {
    tracing::info!("{}", message);
}

/// Log error level message
pub fn error(message: &str) {
    tracing::error!("{}", message);
}
