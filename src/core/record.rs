// logroll - core/record.rs
//
// Call-site metadata and line formatting. Pure logic: the timestamp is
// supplied by the caller so formatting is deterministic under test.

use crate::core::level::Level;
use crate::util::constants::{LINE_DATE_FORMAT, LINE_TIME_FORMAT};
use chrono::NaiveDateTime;
use std::fmt::{self, Write as _};

/// Source location of a logging call, captured at compile time by the
/// `log_*!` macros via `file!()` and `line!()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallSite {
    pub file: &'static str,
    pub line: u32,
}

impl CallSite {
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// Final path component of `file`, accepting both separators.
    pub fn short_file(&self) -> &'static str {
        self.file
            .rsplit(|c| c == '/' || c == '\\')
            .next()
            .unwrap_or(self.file)
    }
}

/// Render one record as a complete line:
/// `<date> <time> <file>:<line>: [TAG] <message>\n`.
///
/// A trailing newline in the message is not doubled.
pub fn format_line(
    timestamp: NaiveDateTime,
    site: &CallSite,
    level: Level,
    args: fmt::Arguments<'_>,
) -> String {
    let mut line = String::with_capacity(64);
    // Writing into a String cannot fail.
    let _ = write!(
        line,
        "{} {} {}:{}: {} {}",
        timestamp.format(LINE_DATE_FORMAT),
        timestamp.format(LINE_TIME_FORMAT),
        site.short_file(),
        site.line,
        level.tag(),
        args
    );
    if !line.ends_with('\n') {
        line.push('\n');
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_format_line_layout() {
        let site = CallSite::new("src/app/worker.rs", 42);
        let line = format_line(at(7, 5, 3), &site, Level::Info, format_args!("started {} jobs", 3));
        assert_eq!(line, "2024/03/09 07:05:03 worker.rs:42: [INFO] started 3 jobs\n");
    }

    #[test]
    fn test_trailing_newline_not_doubled() {
        let site = CallSite::new("main.rs", 1);
        let line = format_line(at(0, 0, 0), &site, Level::Error, format_args!("boom\n"));
        assert!(line.ends_with("[ERROR] boom\n"));
        assert!(!line.ends_with("\n\n"));
    }

    #[test]
    fn test_short_file_handles_windows_separators() {
        let site = CallSite::new(r"src\platform\fs.rs", 9);
        assert_eq!(site.short_file(), "fs.rs");
        assert_eq!(CallSite::new("lib.rs", 1).short_file(), "lib.rs");
    }
}
