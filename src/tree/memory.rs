//! In-memory directory tree
//!
//! An immutable tree built once and shared by reference counting, so the
//! same fixture can be sized any number of times:
//!
//! ```
//! use dir_sizer::tree::MemDir;
//!
//! let root = MemDir::new("root")
//!     .file("a.txt", 10)
//!     .file("b.txt", 20)
//!     .dir(MemDir::new("sub").file("c.txt", 5));
//!
//! assert_eq!(root.total_size(), 35);
//! assert_eq!(root.file_count(), 3);
//! ```

use crate::error::FsResult;
use crate::tree::{Directory, File, Listing};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone)]
struct MemFileNode {
    name: String,
    size: u64,
}

#[derive(Debug, Clone, Default)]
struct MemDirNode {
    name: String,
    dirs: Vec<MemDir>,
    files: Vec<MemFileNode>,
}

/// Builder and handle for an in-memory directory
#[derive(Debug, Clone)]
pub struct MemDir {
    node: Arc<MemDirNode>,
}

impl MemDir {
    /// Create an empty directory
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            node: Arc::new(MemDirNode {
                name: name.into(),
                ..Default::default()
            }),
        }
    }

    /// Add a file of `size` bytes
    pub fn file(mut self, name: impl Into<String>, size: u64) -> Self {
        self.node_mut().files.push(MemFileNode {
            name: name.into(),
            size,
        });
        self
    }

    /// Add a subdirectory
    pub fn dir(mut self, child: MemDir) -> Self {
        self.node_mut().dirs.push(child);
        self
    }

    /// Directory name
    pub fn name(&self) -> &str {
        &self.node.name
    }

    /// Sum of every file size in this subtree
    pub fn total_size(&self) -> u64 {
        self.node.files.iter().map(|f| f.size).sum::<u64>()
            + self.node.dirs.iter().map(MemDir::total_size).sum::<u64>()
    }

    /// Number of files in this subtree
    pub fn file_count(&self) -> u64 {
        self.node.files.len() as u64 + self.node.dirs.iter().map(MemDir::file_count).sum::<u64>()
    }

    /// Number of directories in this subtree, including this one
    pub fn dir_count(&self) -> u64 {
        1 + self.node.dirs.iter().map(MemDir::dir_count).sum::<u64>()
    }

    /// Handle rooted at `/<name>`, ready to be sized
    pub fn into_directory(self) -> Box<dyn Directory> {
        let path = PathBuf::from("/").join(&self.node.name);
        Box::new(MemDirHandle { dir: self, path })
    }

    fn node_mut(&mut self) -> &mut MemDirNode {
        // Copies the node only if a clone of this handle is still alive
        Arc::make_mut(&mut self.node)
    }
}

/// A directory of an in-memory tree, located at `path`
struct MemDirHandle {
    dir: MemDir,
    path: PathBuf,
}

#[async_trait]
impl Directory for MemDirHandle {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn list(&self, _cancel: &CancellationToken) -> FsResult<Listing> {
        let node = &self.dir.node;

        let dirs = node
            .dirs
            .iter()
            .map(|child| {
                Box::new(MemDirHandle {
                    path: self.path.join(child.name()),
                    dir: child.clone(),
                }) as Box<dyn Directory>
            })
            .collect();

        let files = node
            .files
            .iter()
            .map(|f| {
                Box::new(MemFile {
                    path: self.path.join(&f.name),
                    size: f.size,
                }) as Box<dyn File>
            })
            .collect();

        Ok(Listing::new(dirs, files))
    }
}

/// A file of an in-memory tree
#[derive(Debug, Clone)]
pub struct MemFile {
    path: PathBuf,
    size: u64,
}

#[async_trait]
impl File for MemFile {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn stat(&self, _cancel: &CancellationToken) -> FsResult<u64> {
        Ok(self.size)
    }
}
