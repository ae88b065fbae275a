//! Between-job cancellation.
//!
//! A running capture is not interrupted by the first Ctrl-C: it only stops
//! the batch from starting its next job. A second Ctrl-C kills the running
//! Blender process; a third exits immediately.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::warn;

/// Exit status after an interrupt aborted the batch.
pub const EXIT_INTERRUPTED: u8 = 130;

/// Shared "stop before the next job" flag, plus the "kill the running
/// capture" escalation.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag {
    cancelled: Arc<AtomicBool>,
    aborted: Arc<AtomicBool>,
}

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Cancels and asks engines to kill the capture in flight.
    pub fn abort(&self) {
        self.cancel();
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Flag handed to render engines; set by [`CancelFlag::abort`].
    pub fn abort_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.aborted)
    }
}

/// First Ctrl-C cancels, second aborts the running capture, third exits
/// with status 130.
pub fn install_ctrl_c_handler(flag: CancelFlag) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    std::thread::Builder::new()
        .name("spritebake-ctrl-c".into())
        .spawn(move || {
            rt.block_on(async move {
                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                warn!("Interrupt received; finishing the current capture. Press Ctrl-C again to abort it");
                flag.cancel();

                if tokio::signal::ctrl_c().await.is_err() {
                    return;
                }
                warn!("Aborting the current capture. Press Ctrl-C again to exit immediately");
                flag.abort();

                if tokio::signal::ctrl_c().await.is_ok() {
                    std::process::exit(EXIT_INTERRUPTED.into());
                }
            })
        })
        .context("Failed to spawn signal thread")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_is_shared_between_clones() {
        let flag = CancelFlag::new();
        let other = flag.clone();
        assert!(!other.is_cancelled());
        flag.cancel();
        assert!(other.is_cancelled());
        assert!(!other.is_aborted());
    }

    #[test]
    fn test_abort_reaches_engine_handle() {
        let flag = CancelFlag::new();
        let handle = flag.abort_handle();
        assert!(!handle.load(Ordering::SeqCst));

        flag.abort();
        assert!(handle.load(Ordering::SeqCst));
        assert!(flag.is_cancelled());
        assert!(flag.is_aborted());
    }
}
