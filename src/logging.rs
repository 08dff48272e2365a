use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive, e.g. `tablestat=debug`.
pub const LOG_ENV: &str = "TABLESTAT_LOG";

/// Install the stderr subscriber. `TABLESTAT_LOG` wins over `verbose`.
pub fn init(verbose: bool) {
    let default = if verbose { "tablestat=debug" } else { "tablestat=warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
