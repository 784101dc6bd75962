// logroll - app/monitor.rs
//
// Background rotation monitor: a ticker thread that runs the sink's rotation
// check on a fixed interval, so a daily file rolls over at midnight even when
// nothing is being logged.
//
// Architecture:
//   - `MonitorHandle` is returned by `Logger::spawn_monitor`; `run_monitor`
//     runs on a named background thread.
//   - An `Arc<AtomicBool>` cancel flag stops the thread. Dropping the handle
//     sets the flag; `stop` sets it and joins.
//   - The sleep between ticks is cut into MONITOR_CANCEL_CHECK_INTERVAL_MS
//     slices so the flag is honoured promptly. Intervals below
//     MIN_MONITOR_INTERVAL_MS are raised to it.
//   - Each tick is wrapped in `catch_unwind`: neither an I/O error nor a
//     panic in the rotation path ends the thread.

use crate::app::sink::FileSink;
use crate::util::constants::{MIN_MONITOR_INTERVAL_MS, MONITOR_CANCEL_CHECK_INTERVAL_MS};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Scoped handle on a running monitor thread. The thread exits shortly after
/// the handle is dropped.
#[derive(Debug)]
pub struct MonitorHandle {
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    pub(crate) fn spawn(sink: Arc<FileSink>, interval: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(MIN_MONITOR_INTERVAL_MS));
        let cancel = Arc::new(AtomicBool::new(false));
        let thread_cancel = Arc::clone(&cancel);

        let spawned = std::thread::Builder::new()
            .name("logroll-monitor".to_string())
            .spawn(move || run_monitor(sink, interval, thread_cancel));

        let thread = match spawned {
            Ok(handle) => {
                tracing::debug!(
                    interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
                    "Rotation monitor started"
                );
                Some(handle)
            }
            Err(e) => {
                tracing::error!(error = %e, "Cannot spawn rotation monitor; rotation will only happen on write");
                None
            }
        };

        Self { cancel, thread }
    }

    /// Returns `true` while the background thread is alive.
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().map(|t| !t.is_finished()).unwrap_or(false)
    }

    /// Signal the thread and wait for it to exit.
    pub fn stop(mut self) {
        self.cancel.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Rotation monitor thread terminated abnormally");
            }
        }
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        self.cancel.store(true, Ordering::SeqCst);
    }
}

/// Thread body: sleep, tick, repeat until cancelled.
fn run_monitor(sink: Arc<FileSink>, interval: Duration, cancel: Arc<AtomicBool>) {
    let (slice, slices) = sleep_plan(interval);

    loop {
        for _ in 0..slices {
            if cancel.load(Ordering::SeqCst) {
                tracing::debug!("Rotation monitor: cancel flag set, exiting");
                return;
            }
            std::thread::sleep(slice);
        }
        if cancel.load(Ordering::SeqCst) {
            tracing::debug!("Rotation monitor: cancel flag set, exiting");
            return;
        }
        tick(&sink);
    }
}

/// Split `interval` into cancel-check slices: `(slice length, slice count)`.
fn sleep_plan(interval: Duration) -> (Duration, u32) {
    let interval = interval.max(Duration::from_millis(MIN_MONITOR_INTERVAL_MS));
    let slice = Duration::from_millis(MONITOR_CANCEL_CHECK_INTERVAL_MS).min(interval);
    let slices = u32::try_from((interval.as_millis() / slice.as_millis().max(1)).max(1))
        .unwrap_or(u32::MAX);
    (slice, slices)
}

/// One rotation check with every failure contained.
pub(crate) fn tick(sink: &FileSink) {
    match panic::catch_unwind(AssertUnwindSafe(|| sink.check_rotation())) {
        Ok(Ok(true)) => {
            tracing::debug!(path = %sink.active_path().display(), "Rotation monitor rotated log file");
        }
        Ok(Ok(false)) => {}
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Rotation monitor: rotation failed");
        }
        Err(payload) => {
            tracing::error!(
                panic = %crate::app::logger::panic_message(payload.as_ref()),
                "Rotation monitor: contained panic in rotation check"
            );
        }
    }
}
