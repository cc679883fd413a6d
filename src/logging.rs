use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "spotofile=info";

/// Installs the global tracing subscriber.
///
/// The filter is read from `RUST_LOG` and falls back to `spotofile=info`.
/// Calling it twice is harmless; the second subscriber is ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
