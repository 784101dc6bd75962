// logroll - platform/fs.rs
//
// Thin filesystem helpers used by the sink. Every function either returns an
// `io::Result` or is an infallible probe; none of them log. Reporting is the
// caller's job.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::Path;

/// Create `dir` (and parents) unless it already exists as a directory.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    match std::fs::metadata(dir) {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "path exists and is not a directory",
        )),
        Err(_) => std::fs::create_dir_all(dir),
    }
}

/// Open the active log file for appending, creating it if absent.
///
/// Never truncates: if an earlier rename failed, the existing content stays.
pub fn open_active(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

/// True when `path` exists (file, directory, or anything else).
pub fn exists(path: &Path) -> bool {
    std::fs::symlink_metadata(path).is_ok()
}

/// Size of `path` in bytes.
pub fn file_size(path: &Path) -> io::Result<u64> {
    std::fs::metadata(path).map(|m| m.len())
}

/// Highest `k <= max` such that `<base>.1 ..= <base>.k` all exist in `dir`.
///
/// Used to resume the generation ring after a restart: the scan stops at the
/// first gap.
pub fn contiguous_generations(dir: &Path, base_filename: &str, max: u32) -> u32 {
    let mut found = 0;
    for n in 1..=max {
        if exists(&dir.join(format!("{base_filename}.{n}"))) {
            found = n;
        } else {
            break;
        }
    }
    found
}
