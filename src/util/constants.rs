// logroll - util/constants.rs
//
// Single source of truth for all named constants, limits, and defaults.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "logroll";

/// Application identifier used for config/data directories.
pub const APP_ID: &str = "logroll";

/// Current application version (updated by release script).
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Name of the configuration file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

// =============================================================================
// Record formatting
// =============================================================================

/// `chrono` format for the date column of every emitted line (`2006/01/02`).
pub const LINE_DATE_FORMAT: &str = "%Y/%m/%d";

/// `chrono` format for the time column of every emitted line (`15:04:05`).
pub const LINE_TIME_FORMAT: &str = "%H:%M:%S";

/// `chrono` format of the date suffix appended to daily archives
/// (`app.log.2024-01-31`).
pub const ARCHIVE_DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Rotation defaults
// =============================================================================

/// Generation count used by `LoggerConfig::rolling`.
pub const DEFAULT_MAX_GENERATIONS: u32 = 10;

/// Per-file size (in `DEFAULT_SIZE_UNIT`) used by `LoggerConfig::rolling`.
pub const DEFAULT_MAX_SIZE: u64 = 50;

/// Hard upper bound on the configured generation count. A ring larger than
/// this is almost certainly a typo in config.toml.
pub const ABSOLUTE_MAX_GENERATIONS: u32 = 100_000;

// =============================================================================
// Background monitor
// =============================================================================

/// Interval between two rotation checks performed by the monitor thread (ms).
pub const DEFAULT_MONITOR_INTERVAL_MS: u64 = 1_000;

/// Granularity at which the monitor thread re-checks its cancel flag while
/// sleeping between ticks (ms). Bounds the latency of `MonitorHandle` drop.
pub const MONITOR_CANCEL_CHECK_INTERVAL_MS: u64 = 50;

/// Smallest accepted monitor interval from config.toml (ms).
pub const MIN_MONITOR_INTERVAL_MS: u64 = 10;

/// Largest accepted monitor interval from config.toml (ms): one hour.
pub const MAX_MONITOR_INTERVAL_MS: u64 = 60 * 60 * 1_000;

// =============================================================================
// Diagnostics
// =============================================================================

/// Filter used for the diagnostic channel when neither `RUST_LOG`, `--debug`
/// nor config.toml select one.
pub const DEFAULT_DIAGNOSTIC_LEVEL: &str = "warn";
