use std::{
    io,
    os::fd::{AsRawFd, OwnedFd},
    sync::{Mutex, MutexGuard, PoisonError},
};

use crate::log::dev_warn;

use super::{dup, dup2, flush_stderr};

static CAPTURE: Mutex<()> = Mutex::new(());

/// Serialise redirections of standard error within this process.
///
/// This only orders redirections made through this crate; other code writing to
/// descriptor 2 meanwhile still ends up wherever it currently points.
pub(crate) fn capture_lock() -> MutexGuard<'static, ()> {
    CAPTURE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Standard error, temporarily pointed at another open file.
///
/// When a value of this type is dropped, descriptor 2 is pointed back at the file it referred to
/// when [`StderrRedirect::to`] was called.
pub(crate) struct StderrRedirect {
    saved: Option<OwnedFd>,
}

impl StderrRedirect {
    /// Point standard error at `target`.
    ///
    /// Pending output is flushed to the original destination first. On error,
    /// standard error is left untouched.
    pub(crate) fn to<F: AsRawFd>(target: &F) -> io::Result<Self> {
        let saved = dup(libc::STDERR_FILENO)?;
        flush_stderr();
        dup2(target, libc::STDERR_FILENO)?;

        Ok(Self { saved: Some(saved) })
    }

    /// Point standard error back at its original file, reporting any failure.
    pub(crate) fn restore(mut self) -> io::Result<()> {
        match self.saved.take() {
            Some(saved) => Self::reinstate(&saved),
            None => Ok(()),
        }
    }

    fn reinstate(saved: &OwnedFd) -> io::Result<()> {
        flush_stderr();
        dup2(saved, libc::STDERR_FILENO)
    }
}

impl Drop for StderrRedirect {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            if let Err(err) = Self::reinstate(&saved) {
                dev_warn!("cannot restore standard error: {err}");
            }
        }
    }
}
