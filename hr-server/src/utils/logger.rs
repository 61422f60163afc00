//! Logging setup
//!
//! `RUST_LOG` wins over the configured level. With an existing log
//! directory, events go to `hr-server.YYYY-MM-DD` as JSON lines so the
//! `audit` and `security` targets can be grepped by field.

use std::path::Path;

use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "info";
const FILE_PREFIX: &str = "hr-server";

fn filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.unwrap_or(DEFAULT_LEVEL)))
}

/// Console logging at the default level
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Console logging, or daily JSON files when `log_dir` exists
///
/// A missing directory falls back to the console; it is not created.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter(log_level))
        .with_target(true);

    match log_dir.map(Path::new).filter(|p| p.is_dir()) {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, FILE_PREFIX);
            builder.json().with_ansi(false).with_writer(appender).init();
        }
        None => builder.init(),
    }
}
