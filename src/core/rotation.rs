// logroll - core/rotation.rs
//
// Rotation state machine. Decides whether the active file must be archived
// before the next write and what the archive is called. Pure logic: the
// caller supplies today's date and the active file size, and performs the
// filesystem side of the rotation (`app::sink`).
//
// Two mutually exclusive modes:
//   - Daily:     archive to `<base>.<YYYY-MM-DD>` once the calendar day
//                advances past the stored date. Never overwrites an archive.
//   - SizeCount: archive to `<base>.<n>`, n cycling 1..=max_generations, once
//                the active file reaches max_bytes. Overwrites the oldest.

use crate::util::constants::ARCHIVE_DATE_FORMAT;
use crate::util::error::ConfigError;
use chrono::NaiveDate;
use std::str::FromStr;

// =============================================================================
// Size units
// =============================================================================

/// Multiplier applied to a configured maximum size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeUnit {
    KB,
    MB,
    GB,
    TB,
}

impl SizeUnit {
    /// Bytes per unit (binary multiples).
    pub fn multiplier(&self) -> u64 {
        match self {
            SizeUnit::KB => 1 << 10,
            SizeUnit::MB => 1 << 20,
            SizeUnit::GB => 1 << 30,
            SizeUnit::TB => 1 << 40,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SizeUnit::KB => "KB",
            SizeUnit::MB => "MB",
            SizeUnit::GB => "GB",
            SizeUnit::TB => "TB",
        }
    }
}

impl FromStr for SizeUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "KB" => Ok(SizeUnit::KB),
            "MB" => Ok(SizeUnit::MB),
            "GB" => Ok(SizeUnit::GB),
            "TB" => Ok(SizeUnit::TB),
            other => Err(format!("unknown size unit '{other}' (expected KB, MB, GB, TB)")),
        }
    }
}

// =============================================================================
// Rotation mode (configuration)
// =============================================================================

/// Rotation mode selected at configuration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationMode {
    /// Roll over when the calendar day changes.
    #[default]
    Daily,
    /// Roll over when the active file reaches `max_bytes`, keeping at most
    /// `max_generations` numbered archives. `max_generations <= 1` disables
    /// rotation entirely.
    SizeCount { max_generations: u32, max_bytes: u64 },
}

impl RotationMode {
    /// Build a `SizeCount` mode from a size expressed in `unit`s.
    pub fn size_count(
        max_generations: u32,
        max_size: u64,
        unit: SizeUnit,
    ) -> Result<Self, ConfigError> {
        let max_bytes =
            max_size
                .checked_mul(unit.multiplier())
                .ok_or(ConfigError::SizeOverflow {
                    max_size,
                    unit: unit.name(),
                })?;
        Ok(RotationMode::SizeCount {
            max_generations,
            max_bytes,
        })
    }
}

// =============================================================================
// Rotation policy (state machine)
// =============================================================================

/// What to do when the archive name computed for a rotation already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveConflict {
    /// Leave everything as is: no rename, no reopen, no state change.
    Skip,
    /// Delete the existing archive, then rename over its name.
    Replace,
}

/// Rotation cursor plus the parameters of the configured mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RotationPolicy {
    Daily {
        /// Calendar date the active file's content belongs to.
        stored: NaiveDate,
    },
    SizeCount {
        /// Suffix of the most recent archive; 0 means none yet.
        current: u32,
        max_generations: u32,
        max_bytes: u64,
    },
}

impl RotationPolicy {
    /// Initial policy for `mode`.
    ///
    /// `today` seeds the daily cursor. `resume_generation` seeds the size
    /// cursor (the highest contiguous archive already on disk); it is clamped
    /// to `max_generations`.
    pub fn new(mode: RotationMode, today: NaiveDate, resume_generation: u32) -> Self {
        match mode {
            RotationMode::Daily => RotationPolicy::Daily { stored: today },
            RotationMode::SizeCount {
                max_generations,
                max_bytes,
            } => RotationPolicy::SizeCount {
                current: resume_generation.min(max_generations),
                max_generations,
                max_bytes,
            },
        }
    }

    pub fn mode(&self) -> RotationMode {
        match *self {
            RotationPolicy::Daily { .. } => RotationMode::Daily,
            RotationPolicy::SizeCount {
                max_generations,
                max_bytes,
                ..
            } => RotationMode::SizeCount {
                max_generations,
                max_bytes,
            },
        }
    }

    /// True iff the active file must be archived before the next write.
    pub fn needs_rotation(&self, today: NaiveDate, active_size: u64) -> bool {
        match *self {
            RotationPolicy::Daily { stored } => today > stored,
            RotationPolicy::SizeCount {
                max_generations,
                max_bytes,
                ..
            } => max_generations > 1 && active_size >= max_bytes,
        }
    }

    /// Whether the size probe is needed at all. Daily mode never looks at
    /// the file size, so the sink can skip the `stat`.
    pub fn uses_size(&self) -> bool {
        matches!(self, RotationPolicy::SizeCount { .. })
    }

    /// Generation that the next size rotation will write: `(current % C) + 1`.
    /// `None` in daily mode.
    pub fn next_generation(&self) -> Option<u32> {
        match *self {
            RotationPolicy::Daily { .. } => None,
            RotationPolicy::SizeCount {
                current,
                max_generations,
                ..
            } => Some(current % max_generations.max(1) + 1),
        }
    }

    /// Suffix the active file is archived under on the next rotation.
    pub fn archive_suffix(&self) -> String {
        match self {
            RotationPolicy::Daily { stored } => stored.format(ARCHIVE_DATE_FORMAT).to_string(),
            RotationPolicy::SizeCount { .. } => {
                self.next_generation().unwrap_or(1).to_string()
            }
        }
    }

    /// Full archive file name for `base_filename`.
    pub fn archive_name(&self, base_filename: &str) -> String {
        format!("{base_filename}.{}", self.archive_suffix())
    }

    pub fn on_existing_archive(&self) -> ArchiveConflict {
        match self {
            RotationPolicy::Daily { .. } => ArchiveConflict::Skip,
            RotationPolicy::SizeCount { .. } => ArchiveConflict::Replace,
        }
    }

    /// Move the cursor past a rotation: the daily cursor takes `today`, the
    /// size cursor takes the generation just written.
    pub fn advance(&mut self, today: NaiveDate) {
        let next = self.next_generation();
        match self {
            RotationPolicy::Daily { stored } => *stored = today,
            RotationPolicy::SizeCount { current, .. } => {
                if let Some(n) = next {
                    *current = n;
                }
            }
        }
    }

    /// Current size cursor (0 when no archive has been written). `None` in
    /// daily mode.
    pub fn current_generation(&self) -> Option<u32> {
        match *self {
            RotationPolicy::Daily { .. } => None,
            RotationPolicy::SizeCount { current, .. } => Some(current),
        }
    }
}
