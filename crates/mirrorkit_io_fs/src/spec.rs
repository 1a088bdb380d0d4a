//! Sync options, plan units and top-level error types.

use std::path::PathBuf;

use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Default size of the inner per-worker pool.
pub const N_THREADS_PER_WORKER_DEFAULT: usize = 4;

/// Input options for `sync_tree`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSyncOptions {
    /// Bounded concurrency of one copy worker, and size of the delete pool.
    pub threads_per_worker: usize,
    /// Upper bound for the number of copy workers.
    /// `None` means available hardware parallelism.
    pub num_workers_max: Option<usize>,
    /// Build the plan and report it; do not mutate the filesystem.
    pub if_dry_run: bool,
}

impl Default for SpecSyncOptions {
    fn default() -> Self {
        Self {
            threads_per_worker: N_THREADS_PER_WORKER_DEFAULT,
            num_workers_max: None,
            if_dry_run: false,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region PlanUnits

/// One scanned filesystem entry.
///
/// `path_rel` is the join key between the source and destination trees.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SpecEntry {
    /// Absolute (root-joined) path of the entry.
    pub path_abs: PathBuf,
    /// Path relative to the scan root.
    pub path_rel: PathBuf,
}

/// Source file that must be (re)written at `destination/path_rel`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecCopyTask {
    pub path_file_src: PathBuf,
    pub path_rel: PathBuf,
}

/// Destination file scheduled for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDeleteTask {
    pub path_file_dst: PathBuf,
    pub path_rel: PathBuf,
    /// Selected because the name is an OS artifact, not because the source lacks it.
    pub if_junk: bool,
}

/// Destination directory without a source counterpart.
///
/// Removed only if it is empty when its turn comes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecObsoleteDir {
    pub path_dir_dst: PathBuf,
    pub path_rel: PathBuf,
}

impl SpecObsoleteDir {
    /// Number of components in the relative path.
    pub fn depth(&self) -> usize {
        self.path_rel.components().count()
    }
}

/// Everything one run is going to do, computed before any mutation.
///
/// Never persisted; rebuilt from the current filesystem state on every run.
#[derive(Debug, Clone, Default)]
pub struct SpecSyncPlan {
    /// Relative directories that must exist under the destination.
    pub l_dirs_rel_create: Vec<PathBuf>,
    pub l_tasks_copy: Vec<SpecCopyTask>,
    pub l_tasks_delete: Vec<SpecDeleteTask>,
    /// Sorted by depth, deepest first.
    pub l_dirs_obsolete: Vec<SpecObsoleteDir>,
    /// Source files whose destination copy is considered current.
    pub cnt_unchanged: u64,
    /// Non-fatal problems hit while scanning either tree.
    pub warnings: Vec<String>,
}

impl SpecSyncPlan {
    /// `true` when the plan would neither copy nor delete any file.
    pub fn is_converged(&self) -> bool {
        self.l_tasks_copy.is_empty() && self.l_tasks_delete.is_empty()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// One failed task with path + error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSyncError {
    /// Failed source or destination path.
    pub path: PathBuf,
    /// User-facing error text.
    pub exception: String,
}

/// "Top-level call failed" errors (input validation / setup stage).
///
/// When one of these is returned no plan was built and nothing was mutated.
#[derive(Debug, Error)]
pub enum SyncTreeError {
    /// Source root does not exist.
    #[error("Source directory does not exist: {}", .0.display())]
    SourceNotFound(PathBuf),
    /// Source path exists but is not a directory.
    #[error("Source is not a directory: {}", .0.display())]
    SourceNotDirectory(PathBuf),
    /// Source and destination overlap (`src` contains `dst` or vice versa).
    #[error(
        "Source and destination directories overlap: {} <-> {}",
        .dir_source.display(),
        .dir_destination.display()
    )]
    SourceDestinationOverlap {
        /// Normalized source directory.
        dir_source: PathBuf,
        /// Normalized destination directory.
        dir_destination: PathBuf,
    },
    /// `threads_per_worker` must be a positive integer.
    #[error("Arg `threads_per_worker` must be >= 1, got {0}.")]
    InvalidThreadsPerWorker(usize),
    /// Destination directory initialization failed.
    #[error("Failed to initialize destination {}: {message}", .path.display())]
    DestinationInitFailed {
        /// Destination path that failed initialization.
        path: PathBuf,
        /// Underlying IO error text.
        message: String,
    },
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{SpecObsoleteDir, SpecSyncOptions, SyncTreeError};

    #[test]
    fn options_default_uses_four_threads_per_worker() {
        let spec_sync_options = SpecSyncOptions::default();
        assert_eq!(spec_sync_options.threads_per_worker, 4);
        assert_eq!(spec_sync_options.num_workers_max, None);
        assert!(!spec_sync_options.if_dry_run);
    }

    #[test]
    fn obsolete_dir_depth_counts_components() {
        let spec_dir = SpecObsoleteDir {
            path_dir_dst: PathBuf::from("/dst/a/b/c"),
            path_rel: PathBuf::from("a/b/c"),
        };
        assert_eq!(spec_dir.depth(), 3);
    }

    #[test]
    fn error_display_mentions_path() {
        let err = SyncTreeError::SourceNotFound(PathBuf::from("/nowhere"));
        assert!(err.to_string().contains("/nowhere"));

        let err = SyncTreeError::InvalidThreadsPerWorker(0);
        assert!(err.to_string().contains("threads_per_worker"));
    }
}
