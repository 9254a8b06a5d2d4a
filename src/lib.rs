//! dir-sizer - Bounded-Concurrency Directory Size Aggregator
//!
//! Computes the total byte size and file count of a directory tree,
//! exploring subdirectories in parallel under a fixed worker budget.
//!
//! # Features
//!
//! - **Shared Budget**: One counting semaphore bounds concurrent
//!   traversals across the whole tree, whatever its shape.
//!
//! - **No Deadlock on Saturation**: When the budget is exhausted a
//!   traversal either continues inline or releases its own slot before
//!   waiting for another.
//!
//! - **First Error Wins**: The first listing or stat failure is kept,
//!   cancels the rest of the run, and is returned with its path.
//!
//! - **Cooperative Cancellation**: A `CancellationToken` (or a timeout)
//!   stops the run at the next list, stat or slot acquisition.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     DirSizer::size                        │
//! │              (fresh RunState per call)                    │
//! └─────────────────────────────┬────────────────────────────┘
//!                               │
//!            ┌──────────────────┼──────────────────┐
//!            ▼                  ▼                  ▼
//!     ┌────────────┐     ┌────────────┐     ┌────────────┐
//!     │ traverse / │     │ traverse B │ ... │ traverse N │
//!     │  (inline   │     │  (spawned) │     │  (spawned) │
//!     │  children) │     └─────┬──────┘     └─────┬──────┘
//!     └─────┬──────┘           │                  │
//!           └──────────────────┼──────────────────┘
//!                              ▼
//!              ┌────────────────────────────────┐
//!              │  RunState                      │
//!              │  - atomic byte/file counters   │
//!              │  - first-error slot (OnceLock) │
//!              │  - WorkerBudget (semaphore)    │
//!              │  - TaskTracker (fan-in)        │
//!              └────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dir_sizer::tree::LocalDir;
//! use dir_sizer::DirSizer;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), dir_sizer::SizeError> {
//! let sizer = DirSizer::with_max_workers(8);
//! let total = sizer
//!     .size(&CancellationToken::new(), Box::new(LocalDir::new("/var/log")))
//!     .await?;
//! println!("{} bytes in {} files", total.total_size, total.file_count);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod progress;
pub mod sizer;
pub mod tree;

pub use config::{CliArgs, RunConfig, SaturationPolicy, SizerConfig};
pub use error::{ConfigError, FsError, SizeError, SizeResult};
pub use sizer::{DirSize, DirSizer};
