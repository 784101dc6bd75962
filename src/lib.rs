// logroll - lib.rs
//
// Library entry point. Rolling file logger with daily or size/generation
// rotation, a background rotation monitor, and optional console mirroring.
//
//     use logroll::{Logger, LoggerConfig, Level};
//
//     let logger = Logger::new(LoggerConfig::new("logs", "app.log").with_level(Level::Debug));
//     let _monitor = logger.spawn_monitor();
//     logroll::log_info!(logger, "service started on port {}", 8080);

#[macro_use]
mod macros;

pub mod app;
pub mod core;
pub mod platform;
pub mod util;

pub use crate::app::logger::{Log, Logger, LoggerBuilder};
pub use crate::app::monitor::MonitorHandle;
pub use crate::core::level::Level;
pub use crate::core::record::CallSite;
pub use crate::core::rotation::{RotationMode, SizeUnit};
pub use crate::platform::config::LoggerConfig;
