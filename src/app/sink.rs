// logroll - app/sink.rs
//
// The file sink: owns the single handle on `<directory>/<base_filename>` and
// serialises check-rotate-write under one mutex.
//
// Architecture:
//   - `append` and `check_rotation` (called by the monitor thread) take the
//     same lock, so a rotation can never interleave with a write and no two
//     records can interleave with each other.
//   - The handle always refers to the active path. It is dropped before the
//     rename and replaced by a fresh create+append open afterwards.
//   - All failures come back as `SinkError`; nothing here panics or exits.
//     If the active file cannot be opened the sink keeps running without a
//     handle. Every append and every monitor tick retries the open; until one
//     succeeds appends report `SinkError::Unavailable`.
//
// Daily archive conflicts: when `<base>.<date>` already exists that day's
// rename is skipped, the active file keeps its content and the cursor still
// moves to today, so the next day rolls over normally. The existence check
// looks at the filesystem, not at what this sink archived itself.

use crate::app::console::ConsoleMirror;
use crate::core::rotation::{ArchiveConflict, RotationMode, RotationPolicy};
use crate::platform::clock::Clock;
use crate::platform::fs;
use crate::util::error::SinkError;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Mutable state guarded by the sink lock.
#[derive(Debug)]
struct SinkState {
    file: Option<File>,
    policy: RotationPolicy,
    console: ConsoleMirror,
    /// Number of archives written by this sink.
    rotations: u64,
}

/// Rolling file output. Shared between writers and the monitor via `Arc`.
pub struct FileSink {
    directory: PathBuf,
    base_filename: String,
    active_path: PathBuf,
    clock: Arc<dyn Clock>,
    state: Mutex<SinkState>,
    poison_reported: AtomicBool,
}

impl FileSink {
    /// Open the sink. Never fails: an unopenable file is reported on the
    /// diagnostic channel and leaves the sink without a handle.
    ///
    /// In size mode the generation cursor resumes from the archives already
    /// on disk. If the existing active file already needs rotating, it is
    /// rotated here instead of being opened for append.
    pub fn open(
        directory: &Path,
        base_filename: &str,
        mode: RotationMode,
        clock: Arc<dyn Clock>,
        console: ConsoleMirror,
    ) -> Self {
        let active_path = directory.join(base_filename);
        let policy = initial_policy(directory, base_filename, mode, clock.as_ref());

        let sink = Self {
            directory: directory.to_path_buf(),
            base_filename: base_filename.to_string(),
            active_path,
            clock,
            state: Mutex::new(SinkState {
                file: None,
                policy,
                console,
                rotations: 0,
            }),
            poison_reported: AtomicBool::new(false),
        };

        {
            let mut state = sink.lock_state();
            sink.reset_handle(&mut state);
        }

        tracing::debug!(
            path = %sink.active_path.display(),
            mode = ?mode,
            "File sink opened"
        );
        sink
    }

    /// Path of the active file.
    pub fn active_path(&self) -> &Path {
        &self.active_path
    }

    /// Append one complete record.
    ///
    /// Rotates first if the policy demands it, then writes, then echoes to
    /// the console mirror, all under the sink lock. The console sees the
    /// record even when the file write failed.
    pub fn append(&self, line: &[u8]) -> Result<(), SinkError> {
        let mut state = self.lock_state();
        let result = self.rotate_if_needed(&mut state).and_then(|_| {
            self.reopen_if_missing(&mut state);
            self.write_line(&mut state, line)
        });
        state.console.echo(line);
        result
    }

    /// Run the rotation check on its own, as the monitor does each tick.
    ///
    /// Returns `Ok(true)` if an archive was written.
    pub fn check_rotation(&self) -> Result<bool, SinkError> {
        let mut state = self.lock_state();
        let rotated = self.rotate_if_needed(&mut state);
        self.reopen_if_missing(&mut state);
        rotated
    }

    /// Switch rotation mode. The cursor is rebuilt exactly as at `open`.
    pub fn set_rotation(&self, mode: RotationMode) {
        let mut state = self.lock_state();
        state.policy = initial_policy(
            &self.directory,
            &self.base_filename,
            mode,
            self.clock.as_ref(),
        );
        self.reset_handle(&mut state);
    }

    pub fn set_console_mirror(&self, enabled: bool) {
        self.lock_state().console.set_enabled(enabled);
    }

    pub fn rotation_mode(&self) -> RotationMode {
        self.lock_state().policy.mode()
    }

    /// Number of archives this sink has written since it was opened.
    pub fn rotations(&self) -> u64 {
        self.lock_state().rotations
    }

    /// Whether the sink currently holds an open handle.
    pub fn is_available(&self) -> bool {
        self.lock_state().file.is_some()
    }

    // -------------------------------------------------------------------------
    // Internals (all called with the lock held)
    // -------------------------------------------------------------------------

    /// A panic on another thread while holding the lock must not disable
    /// logging for the rest of the process: recover the guard and carry on.
    fn lock_state(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            if !self.poison_reported.swap(true, Ordering::Relaxed) {
                tracing::warn!(
                    path = %self.active_path.display(),
                    "Log sink lock was poisoned by a panicking writer; continuing"
                );
            }
            poisoned.into_inner()
        })
    }

    /// Rotate now if the policy says so, otherwise (re)open for append.
    fn reset_handle(&self, state: &mut SinkState) {
        state.file = None;
        if let Err(e) = self.rotate_if_needed(state) {
            tracing::warn!(error = %e, "Initial rotation failed");
        }
        if state.file.is_none() {
            state.file = self.open_active();
        }
    }

    fn open_active(&self) -> Option<File> {
        match fs::open_active(&self.active_path) {
            Ok(f) => Some(f),
            Err(e) => {
                tracing::error!(
                    path = %self.active_path.display(),
                    error = %e,
                    "Cannot open log file; records will be dropped"
                );
                None
            }
        }
    }

    /// Retry the open after an earlier failure. Failures here stay at trace
    /// level; the first one was already reported by `open_active`.
    fn reopen_if_missing(&self, state: &mut SinkState) {
        if state.file.is_some() {
            return;
        }
        match fs::open_active(&self.active_path) {
            Ok(f) => {
                tracing::info!(path = %self.active_path.display(), "Log file reopened");
                state.file = Some(f);
            }
            Err(e) => {
                tracing::trace!(
                    path = %self.active_path.display(),
                    error = %e,
                    "Log file still unavailable"
                );
            }
        }
    }

    fn active_size(&self) -> u64 {
        match fs::file_size(&self.active_path) {
            Ok(n) => n,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    tracing::debug!(
                        path = %self.active_path.display(),
                        error = %e,
                        "Cannot stat active log file; treating size as 0"
                    );
                }
                0
            }
        }
    }

    fn rotate_if_needed(&self, state: &mut SinkState) -> Result<bool, SinkError> {
        let today = self.clock.today();
        let size = if state.policy.uses_size() {
            self.active_size()
        } else {
            0
        };
        if !state.policy.needs_rotation(today, size) {
            return Ok(false);
        }

        let target = self
            .directory
            .join(state.policy.archive_name(&self.base_filename));
        let conflict = state.policy.on_existing_archive();
        let target_exists = fs::exists(&target);

        if target_exists && conflict == ArchiveConflict::Skip {
            tracing::debug!(
                target = %target.display(),
                "Archive already exists; rename skipped for this day"
            );
            state.policy.advance(today);
            return Ok(false);
        }

        // Close before renaming: required on Windows, harmless elsewhere.
        state.file = None;
        state.policy.advance(today);

        let archived = self.archive(&target, target_exists);
        if archived.is_ok() {
            state.rotations += 1;
            tracing::debug!(
                from = %self.active_path.display(),
                to = %target.display(),
                "Log file rotated"
            );
        }

        state.file = Some(fs::open_active(&self.active_path).map_err(|e| SinkError::Open {
            path: self.active_path.clone(),
            source: e,
        })?);

        archived.map(|()| true)
    }

    fn archive(&self, target: &Path, replace: bool) -> Result<(), SinkError> {
        if replace {
            std::fs::remove_file(target).map_err(|e| SinkError::Remove {
                path: target.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::rename(&self.active_path, target).map_err(|e| SinkError::Rename {
            from: self.active_path.clone(),
            to: target.to_path_buf(),
            source: e,
        })
    }

    fn write_line(&self, state: &mut SinkState, line: &[u8]) -> Result<(), SinkError> {
        let file = state.file.as_mut().ok_or_else(|| SinkError::Unavailable {
            path: self.active_path.clone(),
        })?;
        file.write_all(line).map_err(|e| SinkError::Write {
            path: self.active_path.clone(),
            source: e,
        })
    }
}

impl std::fmt::Debug for FileSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileSink")
            .field("active_path", &self.active_path)
            .finish_non_exhaustive()
    }
}

fn initial_policy(
    directory: &Path,
    base_filename: &str,
    mode: RotationMode,
    clock: &dyn Clock,
) -> RotationPolicy {
    let resume = match mode {
        RotationMode::SizeCount {
            max_generations, ..
        } => fs::contiguous_generations(directory, base_filename, max_generations),
        RotationMode::Daily => 0,
    };
    RotationPolicy::new(mode, clock.today(), resume)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::clock::ManualClock;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn clock_at(day: u32) -> Arc<ManualClock> {
        Arc::new(ManualClock::new(
            NaiveDate::from_ymd_opt(2024, 5, day)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        ))
    }

    fn quiet() -> ConsoleMirror {
        ConsoleMirror::to_writer(Box::new(io::sink()), false)
    }

    fn read(dir: &Path, name: &str) -> String {
        std::fs::read_to_string(dir.join(name)).unwrap_or_default()
    }

    #[test]
    fn test_append_writes_to_active_file() {
        let tmp = TempDir::new().expect("tmpdir");
        let sink = FileSink::open(tmp.path(), "app.log", RotationMode::Daily, clock_at(1), quiet());
        sink.append(b"one\n").unwrap();
        sink.append(b"two\n").unwrap();
        assert_eq!(read(tmp.path(), "app.log"), "one\ntwo\n");
        assert!(sink.is_available());
    }

    #[test]
    fn test_size_rotation_replaces_oldest_generation() {
        let tmp = TempDir::new().expect("tmpdir");
        let mode = RotationMode::SizeCount {
            max_generations: 2,
            max_bytes: 1,
        };
        let sink = FileSink::open(tmp.path(), "svc.log", mode, clock_at(1), quiet());
        for rec in ["a\n", "b\n", "c\n", "d\n"] {
            sink.append(rec.as_bytes()).unwrap();
        }
        // a -> .1, b -> .2, c -> .1 (replacing a), d active.
        assert_eq!(read(tmp.path(), "svc.log"), "d\n");
        assert_eq!(read(tmp.path(), "svc.log.1"), "c\n");
        assert_eq!(read(tmp.path(), "svc.log.2"), "b\n");
        assert_eq!(sink.rotations(), 3);
    }

    #[test]
    fn test_size_rotation_resumes_ring_after_restart() {
        let tmp = TempDir::new().expect("tmpdir");
        std::fs::write(tmp.path().join("svc.log.1"), b"old1\n").unwrap();
        std::fs::write(tmp.path().join("svc.log.2"), b"old2\n").unwrap();
        std::fs::write(tmp.path().join("svc.log"), b"big active\n").unwrap();

        let mode = RotationMode::SizeCount {
            max_generations: 3,
            max_bytes: 4,
        };
        // The existing active file is over the limit: rotated at open.
        let sink = FileSink::open(tmp.path(), "svc.log", mode, clock_at(1), quiet());
        assert_eq!(read(tmp.path(), "svc.log.3"), "big active\n");
        assert_eq!(read(tmp.path(), "svc.log"), "");
        assert_eq!(sink.rotations(), 1);
    }

    #[test]
    fn test_daily_rotation_skips_existing_archive() {
        let tmp = TempDir::new().expect("tmpdir");
        let clock = clock_at(1);
        let sink = FileSink::open(tmp.path(), "app.log", RotationMode::Daily, clock.clone(), quiet());
        sink.append(b"day one\n").unwrap();
        std::fs::write(tmp.path().join("app.log.2024-05-01"), b"someone else\n").unwrap();

        clock.advance(chrono::Duration::days(1));
        assert!(!sink.check_rotation().unwrap());
        // Same day again: nothing left to do.
        assert!(!sink.check_rotation().unwrap());
        sink.append(b"day two\n").unwrap();

        assert_eq!(read(tmp.path(), "app.log"), "day one\nday two\n");
        assert_eq!(read(tmp.path(), "app.log.2024-05-01"), "someone else\n");
        assert_eq!(sink.rotations(), 0);
    }

    #[test]
    fn test_daily_collision_does_not_stop_later_rollovers() {
        let tmp = TempDir::new().expect("tmpdir");
        let clock = clock_at(1);
        let sink = FileSink::open(tmp.path(), "app.log", RotationMode::Daily, clock.clone(), quiet());
        sink.append(b"d1\n").unwrap();
        std::fs::write(tmp.path().join("app.log.2024-05-01"), b"foreign\n").unwrap();

        clock.advance(chrono::Duration::days(1));
        assert!(!sink.check_rotation().unwrap());
        sink.append(b"d2\n").unwrap();

        clock.advance(chrono::Duration::days(1));
        assert!(sink.check_rotation().unwrap());
        sink.append(b"d3\n").unwrap();

        // The skipped day's content rolls out with the next archive.
        assert_eq!(read(tmp.path(), "app.log.2024-05-02"), "d1\nd2\n");
        assert_eq!(read(tmp.path(), "app.log.2024-05-01"), "foreign\n");
        assert_eq!(read(tmp.path(), "app.log"), "d3\n");
        assert_eq!(sink.rotations(), 1);
    }

    #[test]
    fn test_failed_remove_drops_record_and_ring_moves_on() {
        let tmp = TempDir::new().expect("tmpdir");
        let mode = RotationMode::SizeCount {
            max_generations: 3,
            max_bytes: 1,
        };
        let sink = FileSink::open(tmp.path(), "svc.log", mode, clock_at(1), quiet());
        sink.append(b"a\n").unwrap();

        // Generation 1 is occupied by a non-empty directory: remove_file fails.
        let squatter = tmp.path().join("svc.log.1");
        std::fs::create_dir(&squatter).unwrap();
        std::fs::write(squatter.join("keep"), b"x").unwrap();

        let err = sink.append(b"b\n").unwrap_err();
        assert!(matches!(err, SinkError::Remove { .. }), "got {err:?}");
        assert_eq!(read(tmp.path(), "svc.log"), "a\n");
        assert!(sink.is_available());

        // The cursor moved to generation 1, so the next rotation writes .2.
        sink.append(b"c\n").unwrap();
        assert_eq!(read(tmp.path(), "svc.log.2"), "a\n");
        assert_eq!(read(tmp.path(), "svc.log"), "c\n");
        assert!(squatter.join("keep").exists());
        assert_eq!(sink.rotations(), 1);
    }

    #[test]
    fn test_unopenable_file_degrades_to_dropping() {
        let tmp = TempDir::new().expect("tmpdir");
        // A directory squatting on the active path cannot be opened as a file.
        std::fs::create_dir(tmp.path().join("app.log")).unwrap();
        let sink = FileSink::open(tmp.path(), "app.log", RotationMode::Daily, clock_at(1), quiet());
        assert!(!sink.is_available());
        let err = sink.append(b"lost\n").unwrap_err();
        assert!(matches!(err, SinkError::Unavailable { .. }));
    }

    #[test]
    fn test_sink_recovers_once_file_can_be_opened() {
        let tmp = TempDir::new().expect("tmpdir");
        let mode = RotationMode::SizeCount {
            max_generations: 3,
            max_bytes: 1 << 30,
        };
        std::fs::create_dir(tmp.path().join("svc.log")).unwrap();
        let sink = FileSink::open(tmp.path(), "svc.log", mode, clock_at(1), quiet());
        assert!(sink.append(b"lost\n").is_err());

        std::fs::remove_dir(tmp.path().join("svc.log")).unwrap();
        sink.append(b"back\n").unwrap();
        assert!(sink.is_available());
        assert_eq!(read(tmp.path(), "svc.log"), "back\n");
    }

    #[test]
    fn test_check_rotation_reopens_missing_handle() {
        let tmp = TempDir::new().expect("tmpdir");
        std::fs::create_dir(tmp.path().join("app.log")).unwrap();
        let sink = FileSink::open(tmp.path(), "app.log", RotationMode::Daily, clock_at(1), quiet());
        assert!(!sink.is_available());

        std::fs::remove_dir(tmp.path().join("app.log")).unwrap();
        assert!(!sink.check_rotation().unwrap());
        assert!(sink.is_available());
    }

    #[test]
    fn test_set_rotation_switches_mode() {
        let tmp = TempDir::new().expect("tmpdir");
        let sink = FileSink::open(tmp.path(), "app.log", RotationMode::Daily, clock_at(1), quiet());
        let mode = RotationMode::SizeCount {
            max_generations: 5,
            max_bytes: 1024,
        };
        sink.set_rotation(mode);
        assert_eq!(sink.rotation_mode(), mode);
        sink.append(b"still works\n").unwrap();
        assert_eq!(read(tmp.path(), "app.log"), "still works\n");
    }
}
