use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber when `RUST_LOG` is set. Safe to call repeatedly.
pub fn enable_tracing_by_env() {
    if std::env::var("RUST_LOG").is_err() {
        return;
    }
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_test_writer()
        .try_init();
}
