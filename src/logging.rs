//! Tracing subscriber setup for the `portation` binary

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise the crate logs at `info`, or `debug`
/// with `verbose`. Output goes to stderr so exported data on stdout stays
/// clean.
pub fn init(verbose: bool) {
    let default_level = if verbose {
        "entity_portation=debug"
    } else {
        "entity_portation=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Subscriber for tests, captured by the test harness
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
