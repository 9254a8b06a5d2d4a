//! Bounded-concurrency size aggregation
//!
//! [`DirSizer`] walks a [`Directory`](crate::tree::Directory) tree,
//! spawning at most `max_workers` concurrent traversals drawn from a
//! single budget shared by the whole tree.

pub mod budget;
pub mod coordinator;
pub mod state;

pub use budget::{WorkerBudget, WorkerPermit};
pub use coordinator::DirSizer;

use std::fmt;

/// Result of a sizing run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DirSize {
    /// Sum of all file sizes in bytes
    pub total_size: u64,

    /// Number of files visited
    pub file_count: u64,
}

impl DirSize {
    pub fn new(total_size: u64, file_count: u64) -> Self {
        Self {
            total_size,
            file_count,
        }
    }
}

impl fmt::Display for DirSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes in {} files", self.total_size, self.file_count)
    }
}
