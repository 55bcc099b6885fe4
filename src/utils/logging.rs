//! Logging utilities
//!
//! Provides logging setup and configuration.

use env_logger::Env;

/// Setup logging for the server.
///
/// `RUST_LOG` takes precedence over `default_filter`.
pub fn setup_logging(default_filter: &str) {
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter))
        .format_timestamp_millis()
        .init();
}
