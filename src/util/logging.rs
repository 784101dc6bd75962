// logroll - util/logging.rs
//
// Diagnostic channel setup. The rolling logger never reports its own
// failures to the caller; it reports them through `tracing`, and this module
// installs the subscriber that routes those events to stderr.
//
// Activation:
//   - Environment variable: RUST_LOG=debug (or trace)
//   - CLI flag: --debug (sets the filter to debug)
//   - Config file: diagnostic_level = "info"
//
// Library users who already install their own subscriber never call this.

use tracing_subscriber::EnvFilter;

/// Build the diagnostic filter.
///
/// Priority: RUST_LOG env var > CLI --debug flag > config level > default.
pub fn build_filter(debug_flag: bool, config_level: Option<&str>) -> EnvFilter {
    if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else if let Some(level) = config_level {
        EnvFilter::new(level)
    } else {
        EnvFilter::new(super::constants::DEFAULT_DIAGNOSTIC_LEVEL)
    }
}

/// Initialise the diagnostic channel on stderr.
///
/// Uses `try_init` so a second call (or a host application that already set a
/// global subscriber) is a no-op rather than a panic.
pub fn init(debug_flag: bool, config_level: Option<&str>) {
    let result = tracing_subscriber::fmt()
        .with_env_filter(build_filter(debug_flag, config_level))
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .compact()
        .try_init();

    if result.is_ok() {
        tracing::debug!(
            app = super::constants::APP_NAME,
            version = super::constants::APP_VERSION,
            "Diagnostics initialised"
        );
    }
}
