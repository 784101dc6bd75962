// logroll - main.rs
//
// Command-line front end: reads lines from stdin and writes each one as a
// record to a rotating log file, with the rotation monitor running.
//
//     my-service 2>&1 | logroll --dir /var/log/my-service --file out.log \
//         --max-generations 5 --max-size 10 --unit MB
//
// Handles:
// 1. CLI argument parsing
// 2. config.toml loading (explicit --config or the platform default)
// 3. Diagnostic channel initialisation
// 4. The stdin pump

use clap::Parser;
use logroll::platform::config::{self, FileConfig};
use logroll::util::error::{ConfigError, LogRollError};
use logroll::util::{constants, logging};
use logroll::{Level, Logger, LoggerConfig, RotationMode, SizeUnit};
use std::io::BufRead;
use std::path::PathBuf;

/// logroll - pipe stdin into a level-tagged, rotating log file.
#[derive(Parser, Debug)]
#[command(name = "logroll", version, about)]
struct Cli {
    /// config.toml to load. Defaults to the platform config file if present.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Directory for the active log file and its archives.
    #[arg(long = "dir")]
    dir: Option<PathBuf>,

    /// Name of the active log file.
    #[arg(long = "file")]
    file: Option<String>,

    /// Minimum level written to the file.
    #[arg(short = 'l', long = "level")]
    level: Option<Level>,

    /// Level assigned to every line read from stdin.
    #[arg(short = 'e', long = "emit-level", default_value = "info")]
    emit_level: Level,

    /// Echo every written record to stderr.
    #[arg(long = "console")]
    console: bool,

    /// Roll over at midnight.
    #[arg(long = "daily", conflicts_with_all = ["max_generations", "max_size", "unit"])]
    daily: bool,

    /// Number of numbered archives kept (size rotation). 0 or 1 disables rotation.
    #[arg(long = "max-generations")]
    max_generations: Option<u32>,

    /// Size at which the active file is archived, in --unit.
    #[arg(long = "max-size")]
    max_size: Option<u64>,

    /// Unit of --max-size: KB, MB, GB, TB.
    #[arg(long = "unit")]
    unit: Option<SizeUnit>,

    /// Enable debug diagnostics on stderr (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {e}");
        std::process::exit(2);
    }
}

fn run(cli: Cli) -> logroll::util::error::Result<()> {
    let loaded = load_file_config(&cli)?;

    let diagnostic_level = loaded
        .as_ref()
        .and_then(|(file, _)| file.diagnostic_level.clone());
    logging::init(cli.debug, diagnostic_level.as_deref());

    tracing::info!(
        version = constants::APP_VERSION,
        debug = cli.debug,
        "logroll starting"
    );

    let base = match loaded {
        Some((file, warnings)) => {
            for warning in &warnings {
                tracing::warn!(warning = %warning, "Config warning");
            }
            Some(file.logger)
        }
        None => None,
    };

    let config = apply_overrides(base, &cli)?;
    let logger = Logger::new(config);
    let monitor = logger.spawn_monitor();

    let stdin = std::io::stdin();
    let mut lines = 0_u64;
    for line in stdin.lock().lines() {
        match line {
            Ok(line) => {
                logroll::log_at!(logger, cli.emit_level, "{}", line);
                lines += 1;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read stdin; stopping");
                break;
            }
        }
    }

    monitor.stop();
    tracing::info!(lines, rotations = logger.rotations(), "logroll finished");
    Ok(())
}

/// Explicit --config must load; the platform default is used only if present.
fn load_file_config(cli: &Cli) -> Result<Option<(FileConfig, Vec<String>)>, ConfigError> {
    if let Some(ref path) = cli.config {
        return config::load_config(path).map(Some);
    }
    let default_path = config::default_config_path();
    if default_path.exists() {
        return config::load_config(&default_path).map(Some);
    }
    Ok(None)
}

/// Layer CLI flags over the file config (or build one from flags alone).
fn apply_overrides(base: Option<LoggerConfig>, cli: &Cli) -> Result<LoggerConfig, LogRollError> {
    let mut config = match (base, &cli.dir, &cli.file) {
        (Some(mut cfg), dir, file) => {
            if let Some(dir) = dir {
                cfg.directory = dir.clone();
            }
            if let Some(file) = file {
                cfg.base_filename = file.clone();
            }
            cfg
        }
        (None, Some(dir), Some(file)) => LoggerConfig::new(dir.clone(), file.clone()),
        (None, None, _) => return Err(ConfigError::MissingField { field: "directory" }.into()),
        (None, Some(_), None) => {
            return Err(ConfigError::MissingField {
                field: "base_filename",
            }
            .into())
        }
    };

    if let Some(level) = cli.level {
        config.level = level;
    }
    if cli.console {
        config.console_mirror = true;
    }

    let current_generations = match config.rotation {
        RotationMode::SizeCount {
            max_generations, ..
        } => Some(max_generations),
        RotationMode::Daily => None,
    };

    if cli.daily {
        config.rotation = RotationMode::Daily;
    } else if cli.max_size.is_some() || cli.unit.is_some() {
        let generations = cli
            .max_generations
            .or(current_generations)
            .unwrap_or(constants::DEFAULT_MAX_GENERATIONS);
        config.rotation = RotationMode::size_count(
            generations,
            cli.max_size.unwrap_or(constants::DEFAULT_MAX_SIZE),
            cli.unit.unwrap_or(SizeUnit::MB),
        )?;
    } else if let Some(generations) = cli.max_generations {
        config.rotation = match config.rotation {
            RotationMode::SizeCount { max_bytes, .. } => RotationMode::SizeCount {
                max_generations: generations,
                max_bytes,
            },
            RotationMode::Daily => RotationMode::size_count(
                generations,
                constants::DEFAULT_MAX_SIZE,
                SizeUnit::MB,
            )?,
        };
    }

    Ok(config)
}
