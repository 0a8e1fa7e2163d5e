//! Logging setup.
//!
//! Human-readable tracing output on stderr so it never mixes with the
//! table or JSON on stdout. RUST_LOG takes precedence over --verbose.

use std::sync::Once;
use tracing_subscriber::EnvFilter;

static INIT_ONCE: Once = Once::new();

pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "apdiff=debug"
    } else {
        "apdiff=warn"
    }
}

pub fn init(verbose: bool) {
    INIT_ONCE.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose))),
            )
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    });
}
