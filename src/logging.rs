//! Diagnostic tracing for the command-line front end.
//!
//! Player-facing output (boards, outcome messages) goes to stdout and is not
//! affected by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn`. Output goes to stderr in the
/// compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=gridbot=debug gridbot run 2 RURRDR
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
