use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter directives.
pub const LOG_ENV_VAR: &str = "VERSION_STAMP_LOG";

/// Installs the `tracing` subscriber writing to stderr.
///
/// `VERSION_STAMP_LOG` takes precedence; otherwise the level is `info`, or
/// `debug` when `verbose` is set. Calling it twice is harmless.
pub fn initialize_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,version_stamp={}", default_level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
