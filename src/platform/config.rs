// logroll - platform/config.rs
//
// Logger configuration: the programmatic `LoggerConfig`, config.toml loading
// with startup validation, and platform config directory resolution.
//
// Uses the `directories` crate for XDG (Linux), AppData (Windows),
// Library (macOS) compliance.

use crate::core::level::Level;
use crate::core::rotation::{RotationMode, SizeUnit};
use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// =============================================================================
// Programmatic configuration
// =============================================================================

/// Everything a `Logger` needs at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfig {
    /// Directory holding the active file and its archives.
    pub directory: PathBuf,
    /// Name of the active file inside `directory`.
    pub base_filename: String,
    /// Minimum level written.
    pub level: Level,
    /// Echo every accepted record to stderr as well.
    pub console_mirror: bool,
    pub rotation: RotationMode,
    /// Period of the background rotation check.
    pub monitor_interval: Duration,
}

impl LoggerConfig {
    /// Process defaults: INFO threshold, daily rotation, no console echo.
    pub fn new(directory: impl Into<PathBuf>, base_filename: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            base_filename: base_filename.into(),
            level: Level::Info,
            console_mirror: false,
            rotation: RotationMode::Daily,
            monitor_interval: Duration::from_millis(constants::DEFAULT_MONITOR_INTERVAL_MS),
        }
    }

    /// Size-rolling preset: 10 generations of 50 MB each.
    pub fn rolling(
        directory: impl Into<PathBuf>,
        base_filename: impl Into<String>,
        level: Level,
        console_mirror: bool,
    ) -> Self {
        Self {
            level,
            console_mirror,
            rotation: RotationMode::SizeCount {
                max_generations: constants::DEFAULT_MAX_GENERATIONS,
                max_bytes: constants::DEFAULT_MAX_SIZE * SizeUnit::MB.multiplier(),
            },
            ..Self::new(directory, base_filename)
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn with_console_mirror(mut self, enabled: bool) -> Self {
        self.console_mirror = enabled;
        self
    }

    pub fn with_rotation(mut self, rotation: RotationMode) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_monitor_interval(mut self, interval: Duration) -> Self {
        self.monitor_interval = interval;
        self
    }

    /// `<directory>/<base_filename>`.
    pub fn active_path(&self) -> PathBuf {
        self.directory.join(&self.base_filename)
    }
}

// =============================================================================
// Platform paths
// =============================================================================

/// Default location of config.toml for the CLI.
///
/// Falls back to the current directory if platform dirs cannot be determined.
pub fn default_config_path() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
        let path = proj_dirs.config_dir().join(constants::CONFIG_FILE_NAME);
        tracing::debug!(config = %path.display(), "Platform config path resolved");
        path
    } else {
        tracing::warn!("Could not determine platform directories, using current directory");
        PathBuf::from(".").join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored for forward compatibility.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub directory: Option<String>,
    pub base_filename: Option<String>,
    /// "debug", "trace", "info", "warn", "error".
    pub level: Option<String>,
    pub console_mirror: Option<bool>,
    pub monitor_interval_ms: Option<u64>,
    /// Filter for the diagnostic channel (stderr), not for the log file.
    pub diagnostic_level: Option<String>,
    /// `[rotation]` section.
    pub rotation: RotationSection,
}

/// `[rotation]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RotationSection {
    /// "daily" or "size_count".
    pub mode: Option<String>,
    pub max_generations: Option<u32>,
    pub max_size: Option<u64>,
    /// "KB", "MB", "GB", "TB".
    pub unit: Option<String>,
}

/// Validated contents of config.toml.
#[derive(Debug, Clone)]
pub struct FileConfig {
    pub logger: LoggerConfig,
    pub diagnostic_level: Option<String>,
}

/// Load and validate config.toml at `path`.
///
/// Unreadable or unparseable files and missing required keys are errors.
/// Out-of-range or unrecognised optional values produce a warning and fall
/// back to the default, so a slightly wrong file still yields a working
/// logger.
pub fn load_config(path: &Path) -> Result<(FileConfig, Vec<String>), ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let result = parse_config(&content, path)?;
    tracing::info!(path = %path.display(), "Loaded config.toml");
    Ok(result)
}

/// Validate config.toml `content`. `path` is only used in error messages.
pub fn parse_config(content: &str, path: &Path) -> Result<(FileConfig, Vec<String>), ConfigError> {
    let raw: RawConfig = toml::from_str(content).map_err(|e| ConfigError::TomlParse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut warnings: Vec<String> = Vec::new();

    // -- Required: location --
    let directory = raw
        .directory
        .filter(|d| !d.trim().is_empty())
        .ok_or(ConfigError::MissingField { field: "directory" })?;
    let base_filename = raw
        .base_filename
        .filter(|f| !f.trim().is_empty())
        .ok_or(ConfigError::MissingField {
            field: "base_filename",
        })?;
    if base_filename.contains('/') || base_filename.contains('\\') {
        return Err(ConfigError::InvalidValue {
            field: "base_filename".to_string(),
            value: base_filename,
            expected: "a file name without path separators".to_string(),
        });
    }

    let mut config = LoggerConfig::new(directory, base_filename);

    // -- level --
    if let Some(ref level) = raw.level {
        match level.parse::<Level>() {
            Ok(l) => config.level = l,
            Err(_) => warnings.push(format!(
                "level = \"{level}\" is not recognised. \
                 Valid values: debug, trace, info, warn, error. Using default (info).",
            )),
        }
    }

    // -- console_mirror --
    if let Some(mirror) = raw.console_mirror {
        config.console_mirror = mirror;
    }

    // -- monitor_interval_ms --
    if let Some(ms) = raw.monitor_interval_ms {
        if (constants::MIN_MONITOR_INTERVAL_MS..=constants::MAX_MONITOR_INTERVAL_MS).contains(&ms) {
            config.monitor_interval = Duration::from_millis(ms);
        } else {
            warnings.push(format!(
                "monitor_interval_ms = {ms} is out of range ({}-{}). Using default ({}).",
                constants::MIN_MONITOR_INTERVAL_MS,
                constants::MAX_MONITOR_INTERVAL_MS,
                constants::DEFAULT_MONITOR_INTERVAL_MS,
            ));
        }
    }

    // -- [rotation] --
    config.rotation = validate_rotation(&raw.rotation, &mut warnings)?;

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Config validation produced warnings"
        );
    }

    Ok((
        FileConfig {
            logger: config,
            diagnostic_level: raw.diagnostic_level,
        },
        warnings,
    ))
}

fn validate_rotation(
    section: &RotationSection,
    warnings: &mut Vec<String>,
) -> Result<RotationMode, ConfigError> {
    let mode = section.mode.as_deref().map(str::to_ascii_lowercase);
    let size_based = match mode.as_deref() {
        None | Some("daily") => false,
        Some("size_count") | Some("sizecount") | Some("size") => true,
        Some(other) => {
            warnings.push(format!(
                "[rotation] mode = \"{other}\" is not recognised. \
                 Expected \"daily\" or \"size_count\". Using default (daily).",
            ));
            false
        }
    };

    if !size_based {
        if section.max_generations.is_some() || section.max_size.is_some() || section.unit.is_some()
        {
            warnings.push(
                "[rotation] max_generations/max_size/unit are ignored in daily mode.".to_string(),
            );
        }
        return Ok(RotationMode::Daily);
    }

    let mut max_generations = constants::DEFAULT_MAX_GENERATIONS;
    if let Some(gens) = section.max_generations {
        if gens <= constants::ABSOLUTE_MAX_GENERATIONS {
            max_generations = gens;
        } else {
            warnings.push(format!(
                "[rotation] max_generations = {gens} exceeds the maximum of {}. Using default ({}).",
                constants::ABSOLUTE_MAX_GENERATIONS,
                constants::DEFAULT_MAX_GENERATIONS,
            ));
        }
    }

    let max_size = section.max_size.unwrap_or(constants::DEFAULT_MAX_SIZE);

    let mut unit = SizeUnit::MB;
    if let Some(ref raw_unit) = section.unit {
        match raw_unit.parse::<SizeUnit>() {
            Ok(u) => unit = u,
            Err(_) => warnings.push(format!(
                "[rotation] unit = \"{raw_unit}\" is not recognised. \
                 Valid values: KB, MB, GB, TB. Using default (MB).",
            )),
        }
    }

    RotationMode::size_count(max_generations, max_size, unit)
}
