/// Installs the process-wide subscriber. Call once at startup.
///
/// `RUST_LOG` wins when set; otherwise `default_filter` is used:
/// ```bash
/// RUST_LOG=debug cargo run
/// RUST_LOG=order_inventory::events=debug,info cargo run
/// ```
pub fn setup_tracing(default_filter: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}
