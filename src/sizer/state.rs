//! Per-run state
//!
//! Created fresh by every `DirSizer::size` call and threaded through the
//! recursion as an `Arc<RunState>`. Nothing here outlives the call.

use crate::config::{SaturationPolicy, SizerConfig};
use crate::error::{SizeError, SizeResult};
use crate::sizer::budget::WorkerBudget;
use crate::sizer::DirSize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

/// Counters accumulated during a run
#[derive(Debug, Default)]
pub struct RunStats {
    pub bytes: AtomicU64,
    pub files: AtomicU64,
    pub dirs: AtomicU64,
}

impl RunStats {
    pub fn record_file(&self, size: u64) {
        self.bytes.fetch_add(size, Ordering::Relaxed);
        self.files.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dir(&self) {
        self.dirs.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DirSize {
        DirSize {
            total_size: self.bytes.load(Ordering::Relaxed),
            file_count: self.files.load(Ordering::Relaxed),
        }
    }

    pub fn dir_count(&self) -> u64 {
        self.dirs.load(Ordering::Relaxed)
    }
}

/// Shared state of one sizing run
#[derive(Debug)]
pub struct RunState {
    pub stats: RunStats,
    pub budget: WorkerBudget,
    pub tracker: TaskTracker,
    pub cancel: CancellationToken,
    pub policy: SaturationPolicy,
    first_error: OnceLock<SizeError>,
}

impl RunState {
    /// Fresh state for a run; `cancel` should be a child of the caller's token
    pub fn new(config: &SizerConfig, cancel: CancellationToken) -> Self {
        Self {
            stats: RunStats::default(),
            budget: WorkerBudget::new(config.max_workers),
            tracker: TaskTracker::new(),
            cancel,
            policy: config.policy,
            first_error: OnceLock::new(),
        }
    }

    /// Record `err` if no error has been recorded yet
    ///
    /// The first recorded error also cancels the run so that sibling
    /// traversals stop at their next checkpoint. Returns whether `err`
    /// was the one kept.
    pub fn record_error(&self, err: SizeError) -> bool {
        match self.first_error.set(err) {
            Ok(()) => {
                if let Some(err) = self.first_error.get() {
                    if err.is_cancelled() {
                        debug!(error = %err, "Run cancelled");
                    } else {
                        warn!(error = %err, "Run failed, cancelling remaining traversals");
                    }
                }
                self.cancel.cancel();
                true
            }
            Err(_) => false,
        }
    }

    /// Record a cancellation; a no-op if the run already failed
    pub fn record_cancelled(&self) -> bool {
        self.record_error(SizeError::Cancelled)
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn error(&self) -> Option<&SizeError> {
        self.first_error.get()
    }

    /// Final outcome; only meaningful once every task has finished
    pub fn outcome(&self) -> SizeResult<DirSize> {
        match self.first_error.get() {
            Some(err) => Err(err.clone()),
            None => Ok(self.stats.snapshot()),
        }
    }
}
