//! Tracing setup shared by all binaries

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize the tracing subscriber for a named process.
///
/// `RUST_LOG` takes precedence when set; otherwise the given base level is
/// applied to our crates while noisy HTTP internals stay at `warn`.
pub fn init_tracing(process: &str, log_level: Option<&str>) {
    let base_level = log_level.unwrap_or("info");
    let default_filter = format!(
        "{process}={base_level},shared={base_level},tower_http=warn,hyper=warn,reqwest=warn"
    );

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&default_filter));

    fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}
