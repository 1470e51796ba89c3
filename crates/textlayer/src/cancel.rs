//! Cooperative cancellation.
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable cancellation flag for one job.
///
/// The caller keeps one clone and passes another into
/// [`process`](crate::OcrPipeline::process). Cancellation is cooperative:
/// the engine checks the token at page boundaries at minimum, so a request
/// settles promptly with `Cancelled` and no further work once the flag is
/// raised. The flag stays set; tokens are not reusable across jobs.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from any thread, any number of
    /// times.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}
