//! Tracing subscriber setup
//!
//! Log output goes to stderr; stdout belongs to the native program.

use std::io::IsTerminal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging at `level` (an `EnvFilter` directive such as `info`)
pub fn init_logging(level: &str) {
    install(EnvFilter::new(level));
}

/// Initialize logging from `RUST_LOG`, falling back to `default_level`
pub fn init_logging_from_env(default_level: &str) {
    install(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)));
}

fn install(filter: EnvFilter) {
    // A subscriber may already be set (tests, embedding hosts)
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .try_init();
}
