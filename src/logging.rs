use std::env;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding the log filter, e.g. `CATIR_LOG=catir_ops=debug`.
pub const LOG_ENV: &str = "CATIR_LOG";

/// Install the global subscriber. Logs go to stderr so stdout stays the
/// rename report.
pub fn init_logger() {
    let filter = env::var(LOG_ENV).unwrap_or_else(|_| "warn".to_string());
    let filter_layer = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .without_time(),
        )
        .with(filter_layer)
        .init();
}
