//! Tracing subscriber setup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Level used when `RUST_LOG` is unset or does not parse
const DEFAULT_DIRECTIVE: &str = "info";

/// Builds the filter from `RUST_LOG`-style directives.
///
/// Directives are taken as given, so `RUST_LOG=warn` quiets the generator and
/// `RUST_LOG=debug` shows per-frame collector replies. Anything missing or
/// malformed falls back to `info`.
pub fn env_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

/// Installs the global fmt subscriber filtered by `RUST_LOG`.
pub fn init() {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(env_filter(directives.as_deref()))
        .init();
}
