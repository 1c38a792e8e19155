use std::fs::OpenOptions;
use std::io;

use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

const LOG_PATH_ENV: &str = "GSSAPI_SASL_LOG_PATH";
const LOG_LEVEL_ENV: &str = "GSSAPI_SASL_LOG_LEVEL";

pub fn init_logging() {
    let filter = EnvFilter::from_env(LOG_LEVEL_ENV);

    let Ok(path) = std::env::var(LOG_PATH_ENV) else {
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(filter)
            .init();
        return;
    };

    let file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("[GSSAPI-SASL] Couldn't open log file: {e}. File path: {}", path);
            return;
        }
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .pretty()
        .with_thread_names(true)
        .with_writer(file);

    tracing_subscriber::registry().with(fmt_layer).with(filter).init();
}
