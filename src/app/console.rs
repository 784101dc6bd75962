// logroll - app/console.rs
//
// Optional echo of every accepted record to a human-facing stream (stderr
// by default). The mirror is owned by the sink and written inside the sink's
// locked section, right after the file write, so the console order matches
// the file order.
//
// A failing console never affects the file: errors are reported once on the
// diagnostic channel and then suppressed until the console recovers.

use std::io::Write;

/// Secondary, non-authoritative copy of emitted lines.
pub struct ConsoleMirror {
    out: Box<dyn Write + Send>,
    enabled: bool,
    /// Set after a failed echo so a closed terminal does not flood
    /// diagnostics.
    failing: bool,
}

impl ConsoleMirror {
    /// Mirror to the process's stderr.
    pub fn stderr(enabled: bool) -> Self {
        Self::to_writer(Box::new(std::io::stderr()), enabled)
    }

    /// Mirror to an arbitrary writer.
    pub fn to_writer(out: Box<dyn Write + Send>, enabled: bool) -> Self {
        Self {
            out,
            enabled,
            failing: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Echo one complete line. No-op when disabled.
    pub fn echo(&mut self, line: &[u8]) {
        if !self.enabled {
            return;
        }
        match self.out.write_all(line).and_then(|()| self.out.flush()) {
            Ok(()) => self.failing = false,
            Err(e) => {
                if !self.failing {
                    tracing::warn!(error = %e, "Console mirror write failed; suppressing further reports");
                }
                self.failing = true;
            }
        }
    }
}

impl std::fmt::Debug for ConsoleMirror {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleMirror")
            .field("enabled", &self.enabled)
            .field("failing", &self.failing)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Closed;

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_disabled_mirror_writes_nothing() {
        let buf = Captured::default();
        let mut mirror = ConsoleMirror::to_writer(Box::new(buf.clone()), false);
        mirror.echo(b"line\n");
        assert!(buf.0.lock().unwrap().is_empty());

        mirror.set_enabled(true);
        mirror.echo(b"line\n");
        assert_eq!(buf.0.lock().unwrap().as_slice(), b"line\n");
    }

    #[test]
    fn test_closed_console_is_absorbed() {
        let mut mirror = ConsoleMirror::to_writer(Box::new(Closed), true);
        mirror.echo(b"one\n");
        mirror.echo(b"two\n");
        assert!(mirror.failing);
    }
}
