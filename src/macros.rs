// logroll - macros.rs
//
// Logging macros. Each captures the call site with `file!()`/`line!()` and
// checks the level before `format_args!` runs, so a suppressed record costs
// one atomic load.
//
//     let logger = Logger::new(LoggerConfig::new("logs", "app.log"));
//     logroll::log_info!(logger, "listening on {}", addr);

/// `CallSite` for the line the macro is expanded on.
#[macro_export]
macro_rules! callsite {
    () => {
        $crate::core::record::CallSite::new(file!(), line!())
    };
}

/// Log at an explicit level through anything implementing `Log`
/// (including `Arc<Logger>` and `&Logger` via auto-deref).
#[macro_export]
macro_rules! log_at {
    ($logger:expr, $level:expr, $($arg:tt)+) => {{
        #[allow(unused_imports)]
        use $crate::app::logger::Log as _;
        let level = $level;
        let logger = &$logger;
        if logger.enabled(level) {
            logger.log(level, &$crate::callsite!(), format_args!($($arg)+));
        }
    }};
}

#[macro_export]
macro_rules! log_debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::core::level::Level::Debug, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_trace {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::core::level::Level::Trace, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::core::level::Level::Info, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::core::level::Level::Warn, $($arg)+)
    };
}

#[macro_export]
macro_rules! log_error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log_at!($logger, $crate::core::level::Level::Error, $($arg)+)
    };
}
