//! Configuration types for dir-sizer
//!
//! This module defines:
//! - CLI argument parsing using clap derive macros
//! - Aggregator configuration with validation
//! - Runtime configuration for the binary

use crate::error::ConfigError;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// Default concurrency ceiling for library callers
pub const DEFAULT_MAX_WORKERS: usize = 4;

/// Maximum reasonable worker count
const MAX_WORKERS: usize = 512;

/// Recursive directory size aggregator
#[derive(Parser, Debug, Clone)]
#[command(
    name = "dir-sizer",
    version,
    about = "Compute the total size and file count of a directory tree",
    long_about = "Walks a directory tree with a bounded number of concurrent traversals \
                  and prints the total byte size and file count.\n\n\
                  Any listing or stat failure aborts the run; no partial totals are printed.",
    after_help = "EXAMPLES:\n    \
        dir-sizer /var/log\n    \
        dir-sizer ~/src -w 16 --timeout 30\n    \
        dir-sizer /data --policy wait --bytes"
)]
pub struct CliArgs {
    /// Root directory to size
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Maximum number of concurrent subtree traversals
    #[arg(
        short = 'w',
        long,
        default_value_t = default_workers(),
        value_name = "NUM"
    )]
    pub workers: usize,

    /// What a traversal does when every worker slot is taken
    #[arg(long, value_enum, default_value_t = SaturationPolicy::Inline)]
    pub policy: SaturationPolicy,

    /// Give up after this many seconds
    #[arg(short = 't', long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Quiet mode - suppress header and spinner
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Verbose output (debug logging)
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Print the exact byte count instead of a human-readable size
    #[arg(long)]
    pub bytes: bool,
}

fn default_workers() -> usize {
    // Directory listing is I/O bound
    (num_cpus::get() * 2).min(MAX_WORKERS)
}

/// Behavior when the worker budget is exhausted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SaturationPolicy {
    /// Traverse the subdirectory inline in the current task
    #[default]
    Inline,
    /// Release the current slot, then wait for a free one and spawn
    ///
    /// Concurrent listings stay within the ceiling, but a parent task stays
    /// alive (without a slot) until all its children are spawned, so the
    /// number of live tasks grows with the number of non-leaf directories.
    Wait,
}

/// Validated aggregator configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SizerConfig {
    /// Ceiling on concurrently running traversals, the root included
    pub max_workers: usize,

    /// Saturation behavior
    pub policy: SaturationPolicy,

    /// Optional deadline for a whole run
    pub timeout: Option<Duration>,
}

impl Default for SizerConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            policy: SaturationPolicy::Inline,
            timeout: None,
        }
    }
}

impl SizerConfig {
    /// Configuration with the given ceiling and default everything else
    pub fn with_max_workers(max_workers: usize) -> Self {
        Self {
            max_workers,
            ..Default::default()
        }
    }

    pub fn policy(mut self, policy: SaturationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Check the configuration is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 || self.max_workers > MAX_WORKERS {
            return Err(ConfigError::InvalidWorkerCount {
                count: self.max_workers,
                max: MAX_WORKERS,
            });
        }

        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(ConfigError::InvalidTimeout {
                    secs: timeout.as_secs(),
                });
            }
        }

        Ok(())
    }

    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: &CliArgs) -> Result<Self, ConfigError> {
        if args.timeout == Some(0) {
            return Err(ConfigError::InvalidTimeout { secs: 0 });
        }

        let config = Self {
            max_workers: args.workers,
            policy: args.policy,
            timeout: args.timeout.map(Duration::from_secs),
        };
        config.validate()?;
        Ok(config)
    }
}

/// Validated runtime configuration for the binary
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Root directory
    pub root: PathBuf,

    /// Aggregator settings
    pub sizer: SizerConfig,

    /// Show header and spinner
    pub show_progress: bool,

    /// Verbose logging
    pub verbose: bool,

    /// Print raw byte counts
    pub exact_bytes: bool,
}

impl RunConfig {
    /// Create and validate configuration from CLI arguments
    pub fn from_args(args: CliArgs) -> Result<Self, ConfigError> {
        let sizer = SizerConfig::from_args(&args)?;

        let metadata = std::fs::metadata(&args.path).map_err(|e| ConfigError::InvalidRoot {
            path: args.path.clone(),
            reason: e.to_string(),
        })?;

        if !metadata.is_dir() {
            return Err(ConfigError::InvalidRoot {
                path: args.path.clone(),
                reason: "Not a directory".to_string(),
            });
        }

        Ok(Self {
            root: args.path,
            sizer,
            show_progress: !args.quiet,
            verbose: args.verbose,
            exact_bytes: args.bytes,
        })
    }
}
