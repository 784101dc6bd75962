// logroll - core/level.rs
//
// Severity levels and the threshold filter. Pure logic.

use std::str::FromStr;

/// Severity of a record, ordered from least to most severe.
///
/// The ordering is `Debug < Trace < Info < Warn < Error`. Note that `Trace`
/// ranks above `Debug`, unlike `tracing::Level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Level {
    Debug,
    Trace,
    #[default]
    Info,
    Warn,
    Error,
}

impl Level {
    /// Returns all variants in ascending severity.
    pub fn all() -> &'static [Level] {
        &[
            Level::Debug,
            Level::Trace,
            Level::Info,
            Level::Warn,
            Level::Error,
        ]
    }

    /// Literal tag written in front of every message.
    pub fn tag(&self) -> &'static str {
        match self {
            Level::Debug => "[DEBUG]",
            Level::Trace => "[TRACE]",
            Level::Info => "[INFO]",
            Level::Warn => "[WARNING]",
            Level::Error => "[ERROR]",
        }
    }

    /// Lowercase name, as accepted in config.toml and on the CLI.
    pub fn name(&self) -> &'static str {
        match self {
            Level::Debug => "debug",
            Level::Trace => "trace",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        }
    }

    pub(crate) fn as_u8(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_u8(raw: u8) -> Level {
        match raw {
            0 => Level::Debug,
            1 => Level::Trace,
            2 => Level::Info,
            3 => Level::Warn,
            _ => Level::Error,
        }
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Level {
    type Err = String;

    /// Case-insensitive. `warning` is accepted as an alias of `warn`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Ok(Level::Debug),
            "trace" => Ok(Level::Trace),
            "info" => Ok(Level::Info),
            "warn" | "warning" => Ok(Level::Warn),
            "error" => Ok(Level::Error),
            other => Err(format!(
                "unknown level '{other}' (expected debug, trace, info, warn, error)"
            )),
        }
    }
}

/// Returns true iff a record at `level` passes a logger set to `threshold`.
#[inline]
pub fn should_emit(threshold: Level, level: Level) -> bool {
    level >= threshold
}
