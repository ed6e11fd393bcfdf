//! Logging setup shared by the testsock binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber with the specified default log level.
///
/// The filter covers the shared crate, the calling package and the binary.
/// It can be overridden with the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "testsock-server")
/// * `default_log_level` - The default log level (e.g., "debug", "info")
///
/// # Examples
///
/// ```no_run
/// use testsock_shared::logger::setup_logger;
///
/// setup_logger("testsock-server", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Build the default `EnvFilter` directive string.
///
/// Binary names use `-` while tracing targets use `_`; `testsock-client`
/// maps to the `testsock_client` target shared by its library and binary.
pub fn default_filter(binary_name: &str, level: &str) -> String {
    format!(
        "{}={},{}={}",
        env!("CARGO_PKG_NAME").replace('-', "_"),
        level,
        binary_name.replace('-', "_"),
        level
    )
}
