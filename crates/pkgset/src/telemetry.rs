//! Optional logging setup for binaries and tests embedding the crate.

use tracing_subscriber::EnvFilter;

/// Installs a formatted `tracing` subscriber filtered by `RUST_LOG`, falling
/// back to `default_filter`, and forwards `log` records to it.
///
/// Returns `false` when a global subscriber was already installed; calling
/// this more than once is harmless.
pub fn init_logging(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .finish();

    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return false;
    }

    // Fails only when another logger is already set
    if let Err(e) = tracing_log::LogTracer::init() {
        tracing::debug!(error = %e, "log records are not forwarded");
    }
    true
}
