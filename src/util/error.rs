// logroll - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// None of these ever escape a logging call: the facade turns them into
// diagnostics. They are public so configuration code and tests can match on
// them.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all logroll operations.
#[derive(Debug)]
pub enum LogRollError {
    /// Configuration loading, validation, or reconfiguration failed.
    Config(ConfigError),

    /// Writing to or rotating the active log file failed.
    Sink(SinkError),
}

impl fmt::Display for LogRollError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Sink(e) => write!(f, "Log sink error: {e}"),
        }
    }
}

impl std::error::Error for LogRollError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Sink(e) => Some(e),
        }
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to logger setup and configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The log directory could not be created or is not a directory.
    CreateDir { path: PathBuf, source: io::Error },

    /// A configuration call was made after the logger accepted its first
    /// record.
    AlreadyStarted { setting: &'static str },

    /// A required key is absent from config.toml.
    MissingField { field: &'static str },

    /// A config value is out of the allowed range or not recognised.
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },

    /// `max_size * unit` does not fit in 64 bits.
    SizeOverflow { max_size: u64, unit: &'static str },

    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateDir { path, source } => {
                write!(
                    f,
                    "Cannot create log directory '{}': {source}",
                    path.display()
                )
            }
            Self::AlreadyStarted { setting } => write!(
                f,
                "Cannot change '{setting}': the logger has already written records"
            ),
            Self::MissingField { field } => {
                write!(f, "Required config key '{field}' is missing")
            }
            Self::InvalidValue {
                field,
                value,
                expected,
            } => write!(
                f,
                "Config '{field}' = '{value}' is invalid. Expected: {expected}"
            ),
            Self::SizeOverflow { max_size, unit } => {
                write!(f, "Rotation size {max_size} {unit} overflows a 64-bit byte count")
            }
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<ConfigError> for LogRollError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Sink errors
// ---------------------------------------------------------------------------

/// Errors raised on the write and rotation path of a `FileSink`.
///
/// Each one means the record being appended was dropped.
#[derive(Debug)]
pub enum SinkError {
    /// The active file could not be opened (or reopened after rotation).
    Open { path: PathBuf, source: io::Error },

    /// Archiving the active file under its rotated name failed.
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Removing the oldest generation before reusing its name failed.
    Remove { path: PathBuf, source: io::Error },

    /// Writing the record to the active file failed.
    Write { path: PathBuf, source: io::Error },

    /// The sink has no open handle (an earlier open failed).
    Unavailable { path: PathBuf },
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "Cannot open log file '{}': {source}", path.display())
            }
            Self::Rename { from, to, source } => write!(
                f,
                "Cannot rename '{}' to '{}': {source}",
                from.display(),
                to.display()
            ),
            Self::Remove { path, source } => {
                write!(f, "Cannot remove old generation '{}': {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "Cannot write to '{}': {source}", path.display())
            }
            Self::Unavailable { path } => write!(
                f,
                "Log file '{}' is not open; record dropped",
                path.display()
            ),
        }
    }
}

impl std::error::Error for SinkError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } => Some(source),
            Self::Rename { source, .. } => Some(source),
            Self::Remove { source, .. } => Some(source),
            Self::Write { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<SinkError> for LogRollError {
    fn from(e: SinkError) -> Self {
        Self::Sink(e)
    }
}

/// Convenience type alias for logroll results.
pub type Result<T> = std::result::Result<T, LogRollError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_sink_error_preserves_io_source() {
        let err = SinkError::Write {
            path: PathBuf::from("logs/app.log"),
            source: io::Error::new(io::ErrorKind::Other, "disk full"),
        };
        assert!(err.to_string().contains("app.log"));
        assert_eq!(err.source().unwrap().to_string(), "disk full");
    }

    #[test]
    fn test_top_level_wraps_config_error() {
        let err: LogRollError = ConfigError::AlreadyStarted { setting: "level" }.into();
        assert!(matches!(
            err,
            LogRollError::Config(ConfigError::AlreadyStarted { .. })
        ));
        assert!(err.to_string().starts_with("Configuration error"));
    }
}
