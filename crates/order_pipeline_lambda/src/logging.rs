use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::EnvFilter;

/// Installs the process-wide JSON subscriber. `RUST_LOG` overrides the
/// default `info` level.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // A second call (tests, warm re-init) keeps the existing subscriber.
    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_timer(ChronoUtc::rfc_3339())
        .with_target(false)
        .with_current_span(false)
        .with_ansi(false)
        .try_init();
}
