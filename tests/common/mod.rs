//! Shared fixtures for integration tests
//!
//! `TestDir` is an in-memory tree whose nodes can be slowed down, made
//! to fail, or made to hang until cancelled. Every collaborator future it
//! creates is counted by a shared `Probe`.

#![allow(dead_code)]

use async_trait::async_trait;
use dir_sizer::error::{FsError, FsResult};
use dir_sizer::tree::{Directory, File, Listing, MemDir};
use dir_sizer::DirSize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Counts collaborator calls and how many run at once
#[derive(Debug, Default)]
pub struct Probe {
    active_lists: AtomicUsize,
    peak_lists: AtomicUsize,
    total_lists: AtomicUsize,
    live: AtomicUsize,
}

impl Probe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Highest number of `list` calls observed in flight at once
    pub fn peak_lists(&self) -> usize {
        self.peak_lists.load(Ordering::SeqCst)
    }

    /// Number of `list` calls started
    pub fn total_lists(&self) -> usize {
        self.total_lists.load(Ordering::SeqCst)
    }

    /// Collaborator futures currently alive
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn enter_list(self: &Arc<Self>) -> ProbeGuard {
        let now = self.active_lists.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_lists.fetch_max(now, Ordering::SeqCst);
        self.total_lists.fetch_add(1, Ordering::SeqCst);
        self.live.fetch_add(1, Ordering::SeqCst);
        ProbeGuard {
            probe: Arc::clone(self),
            listing: true,
        }
    }

    fn enter_stat(self: &Arc<Self>) -> ProbeGuard {
        self.live.fetch_add(1, Ordering::SeqCst);
        ProbeGuard {
            probe: Arc::clone(self),
            listing: false,
        }
    }
}

struct ProbeGuard {
    probe: Arc<Probe>,
    listing: bool,
}

impl Drop for ProbeGuard {
    fn drop(&mut self) {
        if self.listing {
            self.probe.active_lists.fetch_sub(1, Ordering::SeqCst);
        }
        self.probe.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
struct TestFileEntry {
    name: String,
    size: u64,
    error: Option<FsError>,
}

/// Instrumented directory fixture
#[derive(Debug, Clone, Default)]
pub struct TestDir {
    name: String,
    files: Vec<TestFileEntry>,
    dirs: Vec<Arc<TestDir>>,
    delay: Option<Duration>,
    list_error: Option<FsError>,
    hang: bool,
    cancels: Option<CancellationToken>,
}

impl TestDir {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn file(mut self, name: &str, size: u64) -> Self {
        self.files.push(TestFileEntry {
            name: name.to_string(),
            size,
            error: None,
        });
        self
    }

    /// A file whose stat fails with `err`
    pub fn bad_file(mut self, name: &str, err: FsError) -> Self {
        self.files.push(TestFileEntry {
            name: name.to_string(),
            size: 0,
            error: Some(err),
        });
        self
    }

    pub fn dir(mut self, child: TestDir) -> Self {
        self.dirs.push(Arc::new(child));
        self
    }

    /// Sleep before answering `list`
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Fail `list` with `err` (after any delay)
    pub fn fail_list(mut self, err: FsError) -> Self {
        self.list_error = Some(err);
        self
    }

    /// Never answer `list`
    pub fn hang(mut self) -> Self {
        self.hang = true;
        self
    }

    /// Cancel `token` from inside `list`, then answer with whatever was
    /// read so far (nothing)
    pub fn cancels(mut self, token: &CancellationToken) -> Self {
        self.cancels = Some(token.clone());
        self
    }

    /// Totals of this subtree, ignoring injected failures
    pub fn expected(&self) -> DirSize {
        let mut total = DirSize::new(
            self.files.iter().map(|f| f.size).sum(),
            self.files.len() as u64,
        );
        for child in &self.dirs {
            let sub = child.expected();
            total.total_size += sub.total_size;
            total.file_count += sub.file_count;
        }
        total
    }

    pub fn into_directory(self, probe: &Arc<Probe>) -> Box<dyn Directory> {
        let path = PathBuf::from("/").join(&self.name);
        Box::new(ProbedDir {
            node: Arc::new(self),
            path,
            probe: Arc::clone(probe),
        })
    }
}

struct ProbedDir {
    node: Arc<TestDir>,
    path: PathBuf,
    probe: Arc<Probe>,
}

#[async_trait]
impl Directory for ProbedDir {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn list(&self, _cancel: &CancellationToken) -> FsResult<Listing> {
        let _guard = self.probe.enter_list();

        if let Some(delay) = self.node.delay {
            tokio::time::sleep(delay).await;
        }

        if self.node.hang {
            std::future::pending::<()>().await;
        }

        if let Some(err) = &self.node.list_error {
            return Err(err.clone());
        }

        if let Some(token) = &self.node.cancels {
            token.cancel();
            return Ok(Listing::default());
        }

        let dirs = self
            .node
            .dirs
            .iter()
            .map(|child| {
                Box::new(ProbedDir {
                    path: self.path.join(&child.name),
                    node: Arc::clone(child),
                    probe: Arc::clone(&self.probe),
                }) as Box<dyn Directory>
            })
            .collect();

        let files = self
            .node
            .files
            .iter()
            .map(|entry| {
                Box::new(ProbedFile {
                    path: self.path.join(&entry.name),
                    entry: entry.clone(),
                    probe: Arc::clone(&self.probe),
                }) as Box<dyn File>
            })
            .collect();

        Ok(Listing::new(dirs, files))
    }
}

struct ProbedFile {
    path: PathBuf,
    entry: TestFileEntry,
    probe: Arc<Probe>,
}

#[async_trait]
impl File for ProbedFile {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn stat(&self, _cancel: &CancellationToken) -> FsResult<u64> {
        let _guard = self.probe.enter_stat();
        match &self.entry.error {
            Some(err) => Err(err.clone()),
            None => Ok(self.entry.size),
        }
    }
}

/// Balanced tree with `fanout` subdirectories per level
pub fn balanced(name: &str, depth: u32, fanout: usize, files_per_dir: usize) -> MemDir {
    let mut dir = MemDir::new(name);
    for i in 0..files_per_dir {
        dir = dir.file(format!("f{i}"), (depth as u64 + 1) * 31 + i as u64 * 7);
    }
    if depth > 0 {
        for i in 0..fanout {
            dir = dir.dir(balanced(&format!("{name}-{i}"), depth - 1, fanout, files_per_dir));
        }
    }
    dir
}

/// Same shape as [`balanced`], with every listing delayed
pub fn slow_balanced(name: &str, depth: u32, fanout: usize, delay: Duration) -> TestDir {
    let mut dir = TestDir::new(name).file("f", depth as u64 + 1).delay(delay);
    if depth > 0 {
        for i in 0..fanout {
            dir = dir.dir(slow_balanced(&format!("{name}-{i}"), depth - 1, fanout, delay));
        }
    }
    dir
}

pub fn read_dir_failed(path: &str, reason: &str) -> FsError {
    FsError::ReadDirFailed {
        path: path.into(),
        reason: reason.to_string(),
    }
}

/// Poll until the probe reports no live collaborator futures
pub async fn wait_for_quiescence(probe: &Probe) -> bool {
    for _ in 0..200 {
        if probe.live() == 0 {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    false
}
