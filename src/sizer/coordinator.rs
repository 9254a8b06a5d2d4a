//! Size coordinator - recursive fan-out/fan-in over a directory tree
//!
//! Every traversal lists its directory, stats its files in order, then
//! hands each subdirectory either to a new task (if the budget has a free
//! slot) or, depending on the saturation policy, traverses it inline or
//! waits for a slot.
//!
//! ```text
//! size(root)
//! │
//! ├── acquire slot ── traverse(root)
//! │                   ├── list ─ stat files ─ accumulate
//! │                   ├── subdir A ── slot free ──► tracker.spawn(traverse(A))
//! │                   └── subdir B ── exhausted ──► traverse(B) inline
//! │
//! └── tracker.close() ─ tracker.wait() ─ first error or totals
//! ```

use crate::config::{SaturationPolicy, SizerConfig};
use crate::error::{SizeError, SizeResult};
use crate::sizer::budget::WorkerPermit;
use crate::sizer::state::RunState;
use crate::sizer::DirSize;
use crate::tree::Directory;
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Bounded-concurrency directory size aggregator
///
/// Holds configuration only. Each call to [`DirSizer::size`] builds its
/// own run state, so a single `DirSizer` can be shared and reused.
#[derive(Debug, Clone, Default)]
pub struct DirSizer {
    config: SizerConfig,
}

impl DirSizer {
    /// Create a sizer from an already validated configuration
    pub fn new(config: SizerConfig) -> Self {
        Self { config }
    }

    /// Create a sizer with the given ceiling and default policy
    pub fn with_max_workers(max_workers: usize) -> Self {
        Self::new(SizerConfig::with_max_workers(max_workers))
    }

    pub fn config(&self) -> &SizerConfig {
        &self.config
    }

    /// Compute the total size and file count beneath `root`
    ///
    /// Returns the first error recorded by any traversal, or
    /// [`SizeError::Cancelled`] if `cancel` fires first. Never returns a
    /// partial total. Does not return before every spawned task is done.
    pub async fn size(
        &self,
        cancel: &CancellationToken,
        root: Box<dyn Directory>,
    ) -> SizeResult<DirSize> {
        let start = Instant::now();
        let run = Arc::new(RunState::new(&self.config, cancel.child_token()));

        // Dropping this future mid-run still stops every spawned traversal
        let _guard = run.cancel.clone().drop_guard();

        info!(
            root = %root.path().display(),
            max_workers = self.config.max_workers,
            policy = ?self.config.policy,
            "Starting size run"
        );

        let deadline = self.config.timeout.map(|after| {
            let run = Arc::clone(&run);
            tokio::spawn(async move {
                tokio::select! {
                    _ = run.cancel.cancelled() => {}
                    _ = tokio::time::sleep(after) => {
                        run.record_error(SizeError::TimedOut { after });
                    }
                }
            })
        });

        if run.is_cancelled() {
            run.record_cancelled();
        } else {
            match run.budget.acquire(&run.cancel).await {
                Some(permit) => traverse(Arc::clone(&run), root, Some(permit)).await,
                None => {
                    run.record_cancelled();
                }
            }
        }

        run.tracker.close();
        run.tracker.wait().await;

        // A cancel seen after the last checkpoint must not leave a partial total
        if run.is_cancelled() {
            run.record_cancelled();
        }

        if let Some(deadline) = deadline {
            deadline.abort();
        }

        let outcome = run.outcome();
        let budget = run.budget.stats();

        match &outcome {
            Ok(total) => info!(
                files = total.file_count,
                bytes = total.total_size,
                dirs = run.stats.dir_count(),
                spawned = budget.spawned_count(),
                inline = budget.inline_count(),
                waited = budget.wait_count(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Size run completed"
            ),
            Err(e) => info!(
                error = %e,
                dirs = run.stats.dir_count(),
                duration_ms = start.elapsed().as_millis() as u64,
                "Size run failed"
            ),
        }

        outcome
    }
}

/// Await `fut` unless the run is cancelled first
async fn unless_cancelled<T>(cancel: &CancellationToken, fut: impl Future<Output = T>) -> Option<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => None,
        out = fut => Some(out),
    }
}

/// Traverse one directory and everything below it
///
/// `permit` is `None` when running inline under a parent's slot.
fn traverse(
    run: Arc<RunState>,
    dir: Box<dyn Directory>,
    permit: Option<WorkerPermit>,
) -> BoxFuture<'static, ()> {
    async move {
        if run.is_cancelled() {
            run.record_cancelled();
            return;
        }

        let listing = match unless_cancelled(&run.cancel, dir.list(&run.cancel)).await {
            None => {
                run.record_cancelled();
                return;
            }
            // Collaborators may see the token inside `list` itself
            Some(_) if run.is_cancelled() => {
                run.record_cancelled();
                return;
            }
            Some(Ok(listing)) => listing,
            Some(Err(source)) => {
                run.record_error(SizeError::List {
                    path: dir.path().to_path_buf(),
                    source,
                });
                return;
            }
        };

        run.stats.record_dir();
        debug!(
            path = %dir.path().display(),
            dirs = listing.dirs.len(),
            files = listing.files.len(),
            "Listed directory"
        );

        for file in &listing.files {
            if run.is_cancelled() {
                run.record_cancelled();
                return;
            }

            match unless_cancelled(&run.cancel, file.stat(&run.cancel)).await {
                None => {
                    run.record_cancelled();
                    return;
                }
                Some(_) if run.is_cancelled() => {
                    run.record_cancelled();
                    return;
                }
                Some(Ok(size)) => run.stats.record_file(size),
                Some(Err(source)) => {
                    run.record_error(SizeError::Stat {
                        path: file.path().to_path_buf(),
                        source,
                    });
                    return;
                }
            }
        }

        match run.policy {
            SaturationPolicy::Inline => fan_out_inline(&run, listing.dirs).await,
            SaturationPolicy::Wait => {
                // Never wait for a slot while holding one
                drop(permit);
                fan_out_waiting(&run, listing.dirs).await;
            }
        }
    }
    .boxed()
}

/// Spawn while slots are free, otherwise recurse in the current task
async fn fan_out_inline(run: &Arc<RunState>, dirs: Vec<Box<dyn Directory>>) {
    for child in dirs {
        if run.is_cancelled() {
            run.record_cancelled();
            return;
        }

        match run.budget.try_acquire() {
            Some(permit) => {
                run.budget.stats().record_spawn();
                debug!(path = %child.path().display(), "Spawning traversal");
                run.tracker.spawn(traverse(Arc::clone(run), child, Some(permit)));
            }
            None => {
                run.budget.stats().record_inline();
                debug!(path = %child.path().display(), "Budget exhausted, traversing inline");
                traverse(Arc::clone(run), child, None).await;
            }
        }
    }
}

/// Wait for a slot per subdirectory and spawn into it
async fn fan_out_waiting(run: &Arc<RunState>, dirs: Vec<Box<dyn Directory>>) {
    for child in dirs {
        if run.is_cancelled() {
            run.record_cancelled();
            return;
        }

        let Some(permit) = run.budget.acquire(&run.cancel).await else {
            run.record_cancelled();
            return;
        };

        run.budget.stats().record_spawn();
        debug!(path = %child.path().display(), "Spawning traversal");
        run.tracker.spawn(traverse(Arc::clone(run), child, Some(permit)));
    }
}
