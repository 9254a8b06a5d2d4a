//! Directory tree collaborators
//!
//! The aggregator only sees a tree through two capabilities:
//!
//! ```text
//! Directory::list(cancel) -> Listing { dirs, files }
//! File::stat(cancel)      -> size in bytes
//! ```
//!
//! Two implementations ship with the crate: [`local`] over the real
//! filesystem and [`memory`] over an immutable in-memory tree.

pub mod local;
pub mod memory;

use crate::error::FsResult;
use async_trait::async_trait;
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub use local::{LocalDir, LocalFile};
pub use memory::{MemDir, MemFile};

/// Immediate children of a directory
///
/// An empty listing is a valid leaf that contributes nothing.
#[derive(Default)]
pub struct Listing {
    /// Immediate subdirectories
    pub dirs: Vec<Box<dyn Directory>>,

    /// Immediate files
    pub files: Vec<Box<dyn File>>,
}

impl Listing {
    pub fn new(dirs: Vec<Box<dyn Directory>>, files: Vec<Box<dyn File>>) -> Self {
        Self { dirs, files }
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty() && self.files.is_empty()
    }
}

impl std::fmt::Debug for Listing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listing")
            .field("dirs", &self.dirs.len())
            .field("files", &self.files.len())
            .finish()
    }
}

/// A directory that can enumerate its immediate children
#[async_trait]
pub trait Directory: Send + Sync {
    /// Path used for error context and logging
    fn path(&self) -> &Path;

    /// List immediate subdirectories and files
    async fn list(&self, cancel: &CancellationToken) -> FsResult<Listing>;
}

/// A file whose size can be read
#[async_trait]
pub trait File: Send + Sync {
    /// Path used for error context and logging
    fn path(&self) -> &Path;

    /// Size of the file in bytes
    async fn stat(&self, cancel: &CancellationToken) -> FsResult<u64>;
}
