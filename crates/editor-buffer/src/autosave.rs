//! Background autosave.
//!
//! The worker only ever calls [`TextBuffer::save`], which reads under shared locks, so it runs
//! alongside foreground edits without blocking on anything but the groups it is reading.

use crate::buffer::TextBuffer;
use crate::error::Result;
use crate::options::AutosaveOptions;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, warn};

/// Save `buffer` to `path` if it is dirty.
///
/// The dirty flag is cleared before writing, so an edit made during the write marks the buffer
/// dirty again. On failure the flag is restored. Returns whether a save happened.
pub fn save_if_dirty(buffer: &TextBuffer, path: &Path) -> Result<bool> {
    if !buffer.take_dirty() {
        return Ok(false);
    }
    if let Err(err) = buffer.save(path) {
        buffer.set_dirty(true);
        return Err(err);
    }
    Ok(true)
}

/// Handle to a background thread that periodically saves a buffer.
///
/// Dropping the handle stops the thread after a final save.
#[derive(Debug)]
pub struct Autosave {
    stop: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    saves: Arc<AtomicUsize>,
}

impl Autosave {
    /// Start saving `buffer` to `path` every `options.interval` while it is dirty.
    pub fn spawn(
        buffer: Arc<TextBuffer>,
        path: impl Into<PathBuf>,
        options: AutosaveOptions,
    ) -> Result<Self> {
        let path = path.into();
        let (stop, stopped) = mpsc::channel::<()>();
        let saves = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&saves);

        debug!(path = %path.display(), interval = ?options.interval, "starting autosave");
        let handle = thread::Builder::new()
            .name("autosave".to_string())
            .spawn(move || {
                let save = || match save_if_dirty(&buffer, &path) {
                    Ok(true) => {
                        counter.fetch_add(1, Ordering::Relaxed);
                    }
                    Ok(false) => {}
                    Err(err) => warn!(path = %path.display(), error = %err, "autosave failed"),
                };

                loop {
                    match stopped.recv_timeout(options.interval) {
                        Err(RecvTimeoutError::Timeout) => save(),
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                            save();
                            break;
                        }
                    }
                }
                debug!(path = %path.display(), "autosave stopped");
            })?;

        Ok(Self {
            stop: Some(stop),
            handle: Some(handle),
            saves,
        })
    }

    /// Number of saves performed so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::Relaxed)
    }

    /// Stop the thread, performing a final save if the buffer is dirty, and return the total
    /// number of saves.
    pub fn stop(mut self) -> usize {
        self.shutdown();
        self.save_count()
    }

    fn shutdown(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("autosave thread panicked");
        }
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.shutdown();
    }
}
