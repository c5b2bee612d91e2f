use tracing_subscriber::{fmt, EnvFilter};

/// Installs the stderr subscriber. `RUST_LOG` wins over `--log-level`; an
/// unparseable level falls back to `info`.
pub fn init(log_level: &str) {
    let _ = fmt()
        .with_env_filter(filter(log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}
