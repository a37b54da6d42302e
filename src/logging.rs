//! Tracing setup
//!
//! The library only emits `tracing` events:
//! - `trace`: raw transport chunks
//! - `debug`: every decoded frame and correlation outcome
//! - `warn`: dropped malformed frames and undecodable payloads
//!
//! Binaries and tests that want to see them call [`init_tracing`].

use tracing_subscriber::EnvFilter;

/// Install a compact fmt subscriber
///
/// Set `verbose` to true for debug-level output. `RUST_LOG` overrides the
/// level when set. Safe to call more than once; later calls are no-ops.
pub fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(false)
                .compact(),
        )
        .with(filter)
        .try_init();
}
