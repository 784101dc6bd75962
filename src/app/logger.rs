// logroll - app/logger.rs
//
// The logger facade: level-keyed entry points consumed by application code.
//
// Contract:
//   - A record below the threshold costs one atomic load. Nothing is
//     formatted and no lock is taken.
//   - Logging calls never return an error and never panic. Every failure on
//     the write path (I/O errors and panics alike) is contained here, at
//     the single facade boundary, and reported on the diagnostic channel.
//   - Configuration (`set_level`, `set_console_mirror`, `set_rotation`) is
//     accepted only before the first record is written. Later calls fail
//     with `ConfigError::AlreadyStarted`.

use crate::app::console::ConsoleMirror;
use crate::app::monitor::MonitorHandle;
use crate::app::sink::FileSink;
use crate::core::level::{should_emit, Level};
use crate::core::record::{format_line, CallSite};
use crate::core::rotation::RotationMode;
use crate::platform::clock::{Clock, SystemClock};
use crate::platform::config::LoggerConfig;
use crate::platform::fs;
use crate::util::error::ConfigError;
use std::any::Any;
use std::fmt;
use std::io::Write;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

// =============================================================================
// Log trait
// =============================================================================

/// Level-keyed logging surface. Implemented by `Logger`; accept
/// `&dyn Log` where a component should not care which logger it writes to.
pub trait Log: Send + Sync {
    /// Cheap pre-check used by the macros before any formatting happens.
    fn enabled(&self, level: Level) -> bool;

    /// Emit one record. Fire-and-forget.
    fn log(&self, level: Level, site: &CallSite, args: fmt::Arguments<'_>);

    fn debug(&self, site: &CallSite, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, site, args);
    }

    fn trace(&self, site: &CallSite, args: fmt::Arguments<'_>) {
        self.log(Level::Trace, site, args);
    }

    fn info(&self, site: &CallSite, args: fmt::Arguments<'_>) {
        self.log(Level::Info, site, args);
    }

    fn warn(&self, site: &CallSite, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, site, args);
    }

    fn error(&self, site: &CallSite, args: fmt::Arguments<'_>) {
        self.log(Level::Error, site, args);
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builds a `Logger` with optional clock and console overrides.
pub struct LoggerBuilder {
    config: LoggerConfig,
    clock: Arc<dyn Clock>,
    console: Option<Box<dyn Write + Send>>,
}

impl LoggerBuilder {
    /// Replace the wall clock (line timestamps and daily rotation).
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Send the console mirror somewhere other than stderr.
    pub fn console_writer(mut self, out: Box<dyn Write + Send>) -> Self {
        self.console = Some(out);
        self
    }

    /// Create the log directory, open the sink, and return the logger.
    ///
    /// Never fails. A directory that cannot be created is reported as a
    /// `ConfigError::CreateDir` diagnostic; the sink then degrades to
    /// dropping records.
    pub fn build(self) -> Logger {
        let LoggerBuilder {
            config,
            clock,
            console,
        } = self;

        if let Err(e) = fs::ensure_dir(&config.directory) {
            let err = ConfigError::CreateDir {
                path: config.directory.clone(),
                source: e,
            };
            tracing::error!(error = %err, "Log directory unavailable");
        }

        let console = match console {
            Some(out) => ConsoleMirror::to_writer(out, config.console_mirror),
            None => ConsoleMirror::stderr(config.console_mirror),
        };

        let sink = FileSink::open(
            &config.directory,
            &config.base_filename,
            config.rotation,
            Arc::clone(&clock),
            console,
        );

        tracing::info!(
            path = %sink.active_path().display(),
            level = %config.level,
            rotation = ?config.rotation,
            console = config.console_mirror,
            "Logger ready"
        );

        Logger {
            threshold: AtomicU8::new(config.level.as_u8()),
            started: AtomicBool::new(false),
            sink: Arc::new(sink),
            clock,
            monitor_interval: config.monitor_interval,
        }
    }
}

// =============================================================================
// Logger
// =============================================================================

/// A rolling file logger. Owned by the caller; share it with `Arc<Logger>`
/// or by reference. Several independently configured loggers can coexist.
pub struct Logger {
    threshold: AtomicU8,
    /// Set by the first accepted record; closes the configuration window.
    started: AtomicBool,
    sink: Arc<FileSink>,
    clock: Arc<dyn Clock>,
    monitor_interval: Duration,
}

impl Logger {
    /// Logger on the system clock with the console mirror on stderr.
    pub fn new(config: LoggerConfig) -> Self {
        Self::builder(config).build()
    }

    pub fn builder(config: LoggerConfig) -> LoggerBuilder {
        LoggerBuilder {
            config,
            clock: Arc::new(SystemClock),
            console: None,
        }
    }

    pub fn level(&self) -> Level {
        Level::from_u8(self.threshold.load(Ordering::Relaxed))
    }

    pub fn active_path(&self) -> &Path {
        self.sink.active_path()
    }

    pub fn rotation_mode(&self) -> RotationMode {
        self.sink.rotation_mode()
    }

    /// True once a record has been written; configuration is then frozen.
    pub fn has_started(&self) -> bool {
        self.started.load(Ordering::Acquire)
    }

    pub fn set_level(&self, level: Level) -> Result<(), ConfigError> {
        self.ensure_configurable("level")?;
        self.threshold.store(level.as_u8(), Ordering::Relaxed);
        Ok(())
    }

    pub fn set_console_mirror(&self, enabled: bool) -> Result<(), ConfigError> {
        self.ensure_configurable("console_mirror")?;
        self.sink.set_console_mirror(enabled);
        Ok(())
    }

    pub fn set_rotation(&self, mode: RotationMode) -> Result<(), ConfigError> {
        self.ensure_configurable("rotation")?;
        self.sink.set_rotation(mode);
        Ok(())
    }

    /// Start the background rotation monitor at the configured interval.
    /// The monitor stops when the returned handle is dropped.
    pub fn spawn_monitor(&self) -> MonitorHandle {
        self.spawn_monitor_every(self.monitor_interval)
    }

    pub fn spawn_monitor_every(&self, interval: Duration) -> MonitorHandle {
        MonitorHandle::spawn(Arc::clone(&self.sink), interval)
    }

    /// Run one rotation check now, exactly like a monitor tick.
    pub fn check_rotation(&self) {
        crate::app::monitor::tick(&self.sink);
    }

    /// Number of archives written since the logger was built.
    pub fn rotations(&self) -> u64 {
        self.sink.rotations()
    }

    fn ensure_configurable(&self, setting: &'static str) -> Result<(), ConfigError> {
        if self.has_started() {
            return Err(ConfigError::AlreadyStarted { setting });
        }
        Ok(())
    }

    fn write_record(&self, level: Level, site: &CallSite, args: fmt::Arguments<'_>) {
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            let line = format_line(self.clock.now(), site, level, args);
            self.sink.append(line.as_bytes())
        }));

        match outcome {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                tracing::warn!(
                    error = %e,
                    level = %level,
                    file = site.short_file(),
                    line = site.line,
                    "Log record dropped"
                );
            }
            Err(payload) => {
                tracing::error!(
                    panic = %panic_message(payload.as_ref()),
                    file = site.short_file(),
                    line = site.line,
                    "Contained panic while writing log record"
                );
            }
        }
    }
}

impl Log for Logger {
    fn enabled(&self, level: Level) -> bool {
        should_emit(self.level(), level)
    }

    fn log(&self, level: Level, site: &CallSite, args: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        self.started.store(true, Ordering::Release);
        self.write_record(level, site, args);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("level", &self.level())
            .field("sink", &self.sink)
            .field("started", &self.has_started())
            .finish_non_exhaustive()
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::clock::ManualClock;
    use chrono::NaiveDate;
    use std::io;
    use std::sync::Mutex;
    use tempfile::TempDir;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn fixed_clock() -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(8, 30, 0)
                .unwrap(),
        ))
    }

    fn site() -> CallSite {
        CallSite::new("src/jobs/runner.rs", 77)
    }

    struct Exploding;

    impl fmt::Display for Exploding {
        fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
            panic!("display exploded")
        }
    }

    #[test]
    fn test_records_below_threshold_touch_nothing() {
        let tmp = TempDir::new().expect("tmpdir");
        let console = Captured::default();
        let logger = Logger::builder(
            LoggerConfig::new(tmp.path(), "app.log")
                .with_level(Level::Warn)
                .with_console_mirror(true),
        )
        .clock(fixed_clock())
        .console_writer(Box::new(console.clone()))
        .build();

        logger.info(&site(), format_args!("ignored"));
        logger.debug(&site(), format_args!("ignored"));
        assert!(!logger.has_started());
        assert_eq!(std::fs::read_to_string(logger.active_path()).unwrap(), "");
        assert!(console.text().is_empty());

        logger.warn(&site(), format_args!("disk at {}%", 91));
        let expected = "2024/06/01 08:30:00 runner.rs:77: [WARNING] disk at 91%\n";
        assert_eq!(std::fs::read_to_string(logger.active_path()).unwrap(), expected);
        assert_eq!(console.text(), expected);
    }

    #[test]
    fn test_configuration_freezes_after_first_record() {
        let tmp = TempDir::new().expect("tmpdir");
        let logger = Logger::builder(LoggerConfig::new(tmp.path(), "app.log"))
            .clock(fixed_clock())
            .build();

        logger.set_level(Level::Debug).unwrap();
        logger.set_console_mirror(false).unwrap();
        logger.debug(&site(), format_args!("first"));

        assert!(matches!(
            logger.set_level(Level::Error),
            Err(ConfigError::AlreadyStarted { setting: "level" })
        ));
        assert!(logger.set_rotation(RotationMode::Daily).is_err());
        assert_eq!(logger.level(), Level::Debug);
    }

    #[test]
    fn test_panicking_argument_is_contained() {
        let tmp = TempDir::new().expect("tmpdir");
        let logger = Logger::builder(LoggerConfig::new(tmp.path(), "app.log"))
            .clock(fixed_clock())
            .build();

        logger.error(&site(), format_args!("{}", Exploding));
        logger.error(&site(), format_args!("after"));

        let content = std::fs::read_to_string(logger.active_path()).unwrap();
        assert_eq!(content.lines().count(), 1);
        assert!(content.ends_with("[ERROR] after\n"));
    }

    #[test]
    fn test_unwritable_directory_never_reaches_caller() {
        let tmp = TempDir::new().expect("tmpdir");
        let blocker = tmp.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();

        let logger = Logger::builder(LoggerConfig::new(blocker.join("logs"), "app.log"))
            .clock(fixed_clock())
            .build();
        logger.error(&site(), format_args!("goes nowhere"));
        assert!(!logger.active_path().exists());
    }

    #[test]
    fn test_panic_message_extracts_strings() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "non-string panic payload");
    }
}
