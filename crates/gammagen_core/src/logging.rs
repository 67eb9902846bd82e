//! Structured logging setup.

use crate::config::Verbosity;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a global fmt subscriber writing to stderr.
///
/// `RUST_LOG` overrides the level implied by `verbosity`. Calling this twice
/// is harmless; the second call keeps the first subscriber.
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .ok();
}
