//! Tracing subscriber setup for the CLI.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber, writing to stderr.
///
/// Precedence: `--verbose`, then `--quiet`, then `RUST_LOG`, then the
/// configured level.
pub fn init(verbose: bool, quiet: bool, level: &str) {
    let filter = if verbose {
        EnvFilter::new("build_docs=debug")
    } else if quiet {
        EnvFilter::new("build_docs=error")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("build_docs={}", level)))
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    // A second init (tests) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
