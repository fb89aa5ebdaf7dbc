//! Scoped redirection of a standard stream to the null device.
//!
//! The redirect rewires a process-wide file descriptor, so it must only be
//! held on the UI thread while nothing else writes to the stream. The guard
//! is `!Send` to keep it there.

use std::marker::PhantomData;

use tracing::warn;

use crate::Result;

#[cfg(unix)]
use std::os::fd::{AsRawFd, RawFd};

/// Guard that points a stream at the null device until dropped.
///
/// The original descriptor is restored on every exit path, including early
/// returns and unwinding.
#[must_use = "the stream is restored as soon as the guard is dropped"]
pub struct StreamRedirect {
    #[cfg(unix)]
    target: RawFd,
    #[cfg(unix)]
    saved: RawFd,
    _not_send: PhantomData<*const ()>,
}

impl StreamRedirect {
    /// Redirect `stream` to `/dev/null`.
    #[cfg(unix)]
    pub fn to_null(stream: &impl AsRawFd) -> Result<Self> {
        use nix::unistd::{close, dup, dup2};

        let target = stream.as_raw_fd();
        let null = std::fs::OpenOptions::new().write(true).open("/dev/null")?;
        let saved = dup(target).map_err(std::io::Error::from)?;
        if let Err(e) = dup2(null.as_raw_fd(), target) {
            let _ = close(saved);
            return Err(std::io::Error::from(e).into());
        }
        Ok(Self {
            target,
            saved,
            _not_send: PhantomData,
        })
    }

    #[cfg(not(unix))]
    pub fn to_null<S>(_stream: &S) -> Result<Self> {
        Ok(Self {
            _not_send: PhantomData,
        })
    }

    /// Redirect the process's stderr.
    pub fn stderr() -> Result<Self> {
        Self::to_null(&std::io::stderr())
    }
}

impl Drop for StreamRedirect {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            use nix::unistd::{close, dup2};

            if let Err(e) = dup2(self.saved, self.target) {
                warn!(fd = self.target, error = %e, "Failed to restore redirected stream");
            }
            let _ = close(self.saved);
        }
    }
}

/// Run `f` with stderr sent to the null device.
pub fn with_stderr_suppressed<T>(f: impl FnOnce() -> T) -> Result<T> {
    let _guard = StreamRedirect::stderr()?;
    Ok(f())
}
