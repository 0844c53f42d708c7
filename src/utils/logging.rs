use tracing_subscriber::EnvFilter;

/// Install the global subscriber: compact lines on stderr, filtered by `RUST_LOG`
///
/// Stdout is reserved for encoded results. Later calls are no-ops.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    let _ = subscriber.try_init();
}
