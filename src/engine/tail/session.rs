// src/engine/tail/session.rs

//! Single-session log tailer.
//!
//! At most one session runs at a time. A session is a Tokio task polling one
//! file: it survives the file not existing yet, being truncated, or being
//! replaced, and reports transient I/O trouble as [`TailEvent::Error`]
//! without ending.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::fs::File;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::errors::TailError;
use crate::events::{Event, EventSink, TailEvent};

use super::cursor::{TailCursor, into_batches};
use super::ticks::{IntervalTicks, TickSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TailOptions {
    pub poll_interval: Duration,
    /// Upper bound on the lines carried by one `Lines` event.
    pub max_batch_lines: usize,
}

impl Default for TailOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(200),
            max_batch_lines: 2000,
        }
    }
}

#[derive(Debug, Default)]
struct SessionState {
    active: bool,
    cancel: Option<oneshot::Sender<()>>,
}

#[derive(Debug, Clone)]
pub struct LogTailer {
    state: Arc<Mutex<SessionState>>,
    sink: Arc<dyn EventSink>,
}

impl LogTailer {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SessionState::default())),
            sink,
        }
    }

    pub fn is_active(&self) -> bool {
        lock(&self.state).active
    }

    /// Start tailing `path`, polling every `options.poll_interval`.
    ///
    /// The file is always read from the beginning.
    pub fn start(
        &self,
        path: impl Into<PathBuf>,
        options: TailOptions,
    ) -> Result<JoinHandle<()>, TailError> {
        self.start_with(
            path,
            IntervalTicks::new(options.poll_interval),
            options.max_batch_lines,
        )
    }

    /// Start tailing `path`, polling on every tick of `ticks` and emitting at
    /// most `max_batch_lines` lines per event.
    ///
    /// Fails with `AlreadyRunning` if a session is active (that session is
    /// left alone) and with `InvalidPath` for a blank path. The returned
    /// handle completes once the session has fully stopped.
    pub fn start_with<T: TickSource>(
        &self,
        path: impl Into<PathBuf>,
        ticks: T,
        max_batch_lines: usize,
    ) -> Result<JoinHandle<()>, TailError> {
        let path = path.into();

        let cancel_rx = {
            let mut state = lock(&self.state);
            if state.active {
                return Err(TailError::AlreadyRunning);
            }
            if path.to_string_lossy().trim().is_empty() {
                return Err(TailError::InvalidPath);
            }

            let (cancel_tx, cancel_rx) = oneshot::channel();
            state.active = true;
            state.cancel = Some(cancel_tx);
            cancel_rx
        };

        info!(?path, "log tail started");
        self.sink.emit(Event::Tail(TailEvent::Started(path.clone())));

        let reset = SessionReset {
            state: Arc::clone(&self.state),
            sink: Arc::clone(&self.sink),
        };
        let sink = Arc::clone(&self.sink);

        Ok(tokio::spawn(async move {
            let _reset = reset;
            poll_loop(path, ticks, cancel_rx, sink, max_batch_lines).await;
        }))
    }

    /// Ask the running session to stop. Does nothing when idle and does not
    /// wait for the session to exit.
    pub fn stop(&self) {
        let mut state = lock(&self.state);
        if let Some(cancel) = state.cancel.take() {
            debug!("log tail stop requested");
            let _ = cancel.send(());
        }
    }
}

fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns the tailer to idle when the session task ends, however it ends.
struct SessionReset {
    state: Arc<Mutex<SessionState>>,
    sink: Arc<dyn EventSink>,
}

impl Drop for SessionReset {
    fn drop(&mut self) {
        {
            let mut state = lock(&self.state);
            state.active = false;
            state.cancel = None;
        }
        info!("log tail stopped");
        self.sink.emit(Event::Tail(TailEvent::Stopped));
    }
}

async fn poll_loop<T: TickSource>(
    path: PathBuf,
    mut ticks: T,
    mut cancel_rx: oneshot::Receiver<()>,
    sink: Arc<dyn EventSink>,
    max_batch: usize,
) {
    let mut cursor = TailCursor::new();
    let mut file: Option<File> = None;

    loop {
        tokio::select! {
            biased;

            _ = &mut cancel_rx => {
                debug!(?path, "log tail cancelled");
                break;
            }

            more = ticks.tick() => {
                if !more {
                    debug!(?path, "tick source exhausted; ending log tail");
                    break;
                }
                poll_once(&path, &mut file, &mut cursor, sink.as_ref(), max_batch).await;
            }
        }
    }

    drop(file);
}

async fn poll_once(
    path: &Path,
    file: &mut Option<File>,
    cursor: &mut TailCursor,
    sink: &dyn EventSink,
    max_batch: usize,
) {
    if let Some(open) = file.as_ref() {
        if replaced_on_disk(path, open).await {
            debug!(?path, "log file replaced on disk; reopening");
            *file = None;
        }
    }

    if file.is_none() {
        match File::open(path).await {
            Ok(opened) => {
                // A fresh handle may name a different file; read it whole.
                debug!(?path, "log file opened");
                cursor.reset();
                *file = Some(opened);
            }
            Err(e) => {
                // The file may simply not exist yet.
                trace!(?path, error = %e, "log file not available");
                return;
            }
        }
    }

    let Some(open) = file.as_mut() else {
        return;
    };

    let size = match open.metadata().await {
        Ok(meta) => meta.len(),
        Err(e) => {
            warn!(?path, error = %e, "stat log file failed");
            sink.emit(Event::Tail(TailEvent::Error(format!("stat log file: {e}"))));
            *file = None;
            return;
        }
    };

    match cursor.read_new(open, size).await {
        Ok(lines) => {
            if lines.is_empty() {
                return;
            }
            trace!(?path, lines = lines.len(), offset = cursor.offset(), "log lines read");
            for batch in into_batches(lines, max_batch) {
                sink.emit(Event::Tail(TailEvent::Lines(batch)));
            }
        }
        Err(e) => {
            warn!(?path, error = %e, "read log file failed");
            sink.emit(Event::Tail(TailEvent::Error(format!("read log file: {e}"))));
            *file = None;
        }
    }
}

/// Whether `path` now names a different file than the open handle (deleted
/// and recreated, or rotated by rename).
#[cfg(unix)]
async fn replaced_on_disk(path: &Path, open: &File) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (tokio::fs::metadata(path).await, open.metadata().await) {
        (Ok(on_disk), Ok(current)) => on_disk.dev() != current.dev() || on_disk.ino() != current.ino(),
        _ => false,
    }
}

#[cfg(not(unix))]
async fn replaced_on_disk(_path: &Path, _open: &File) -> bool {
    false
}
