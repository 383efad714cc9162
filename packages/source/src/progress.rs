//! Progress reporting for the per-file extraction loop.
//!
//! [`ProgressCallback`] keeps the pipeline independent of any rendering
//! backend. The CLI plugs in an `indicatif` bar; library callers and tests
//! use [`null_progress`].

use std::sync::Arc;

/// Receives progress updates while report files are processed.
pub trait ProgressCallback: Send + Sync {
    /// Set the total number of files.
    fn set_total(&self, total: u64);

    /// Advance by `delta` files.
    fn inc(&self, delta: u64);

    /// Show the file currently being processed.
    fn set_message(&self, msg: String);

    /// Mark the loop as complete.
    fn finish(&self, msg: String);
}

/// Ignores every update.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn set_message(&self, _msg: String) {}
    fn finish(&self, _msg: String) {}
}

/// Returns a shared [`NullProgress`].
#[must_use]
pub fn null_progress() -> Arc<dyn ProgressCallback> {
    Arc::new(NullProgress)
}
