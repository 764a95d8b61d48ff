//! Tracing subscriber setup for the binary.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install a stderr fmt layer filtered by `RUST_LOG`, or by `default_directive` when unset.
pub fn init(verbose: bool) {
    let default_directive = if verbose { "recap=debug" } else { "recap=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    // a subscriber may already be installed
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
