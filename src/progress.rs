//! Progress-callback trait for per-file run events.
//!
//! Inject an [`Arc<dyn RunProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! events as the orchestrator processes each candidate. The library itself
//! prints nothing; the CLI turns these events into status lines and a
//! progress bar.
//!
//! # Example
//!
//! ```rust
//! use ocrprep::{ConversionResult, RunProgressCallback};
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! struct CountingCallback {
//!     seen: AtomicUsize,
//! }
//!
//! impl RunProgressCallback for CountingCallback {
//!     fn on_file_done(&self, index: usize, total: usize, _result: &ConversionResult) {
//!         self.seen.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("{}/{}", index + 1, total);
//!     }
//! }
//! ```

use crate::output::{ConversionResult, RunSummary};
use std::path::Path;
use std::sync::Arc;

/// Called by the orchestrator as it processes each candidate.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Events arrive in order from a single thread; the
/// `Send + Sync` bound only lets the callback live inside a shared config.
pub trait RunProgressCallback: Send + Sync {
    /// Called once after discovery, before any file is classified.
    ///
    /// # Arguments
    /// * `root`       — canonical scan root
    /// * `candidates` — number of candidate image files found
    fn on_run_start(&self, root: &Path, candidates: usize) {
        let _ = (root, candidates);
    }

    /// Called just before a candidate is classified and converted.
    ///
    /// # Arguments
    /// * `index` — 0-based position in the candidate list
    /// * `total` — total candidates
    /// * `path`  — source file
    fn on_file_start(&self, index: usize, total: usize, path: &Path) {
        let _ = (index, total, path);
    }

    /// Called once per candidate with its outcome.
    fn on_file_done(&self, index: usize, total: usize, result: &ConversionResult) {
        let _ = (index, total, result);
    }

    /// Called after the last candidate with the final tally.
    fn on_run_complete(&self, summary: &RunSummary) {
        let _ = summary;
    }
}

/// Shared handle stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn RunProgressCallback>;

/// A callback that does nothing; used when none is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopProgressCallback;

impl RunProgressCallback for NoopProgressCallback {}
