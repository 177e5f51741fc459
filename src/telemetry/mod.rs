//! Optional tracing setup for binaries and tests.
//!
//! The library itself only *emits* `tracing` events; it never installs a
//! global subscriber. Callers that want formatted output can use this
//! helper, which wires the standard stack: an env-filtered fmt layer plus
//! `tracing-error`'s span-trace capture.

use tracing_error::ErrorLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Install a global subscriber reading the `RUST_LOG` filter.
///
/// Safe to call more than once; only the first call wins. Returns whether
/// this call installed the subscriber.
pub fn init() -> bool {
    init_with_filter(EnvFilter::from_default_env())
}

/// Install a global subscriber with an explicit filter.
pub fn init_with_filter(filter: EnvFilter) -> bool {
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .try_init()
        .is_ok()
}
