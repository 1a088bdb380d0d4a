//! One-way sync entry points.

use std::fs;
use std::path::Path;

use crate::event::{EnumSyncEvent, SyncEventSink, TracingEventSink};
use crate::execute::execute_plan;
use crate::plan::build_sync_plan;
use crate::report::ReportSync;
use crate::spec::{SpecSyncOptions, SyncTreeError};
use crate::util::is_overlap;

/// Make `dir_destination` mirror `dir_source`, logging through `tracing`.
///
/// See [`sync_tree_with_sink`].
pub fn sync_tree<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_sync_options: SpecSyncOptions,
) -> Result<ReportSync, SyncTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    sync_tree_with_sink(
        dir_source,
        dir_destination,
        spec_sync_options,
        &TracingEventSink,
    )
}

/// Make `dir_destination` mirror `dir_source`.
///
/// This function performs:
/// 1. Input validation; on failure nothing is scanned or mutated.
/// 2. Destination root creation (skipped in dry-run).
/// 3. Planning: both trees are scanned and every entry classified.
/// 4. Execution: directories, then copies, then deletions, then obsolete
///    directory pruning.
///
/// Returns [`ReportSync`] when the run completes (with possible per-task
/// errors stored in the report). Returns [`SyncTreeError`] only for
/// configuration failures.
pub fn sync_tree_with_sink<P, Q>(
    dir_source: P,
    dir_destination: Q,
    spec_sync_options: SpecSyncOptions,
    sink: &dyn SyncEventSink,
) -> Result<ReportSync, SyncTreeError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    if spec_sync_options.threads_per_worker == 0 {
        return Err(SyncTreeError::InvalidThreadsPerWorker(0));
    }

    let path_dir_src = dir_source.as_ref().to_path_buf();
    let path_dir_dst = dir_destination.as_ref().to_path_buf();

    if !path_dir_src.exists() {
        return Err(SyncTreeError::SourceNotFound(path_dir_src));
    }
    if !path_dir_src.is_dir() {
        return Err(SyncTreeError::SourceNotDirectory(path_dir_src));
    }
    if is_overlap(&path_dir_src, &path_dir_dst) {
        return Err(SyncTreeError::SourceDestinationOverlap {
            dir_source: path_dir_src,
            dir_destination: path_dir_dst,
        });
    }

    sink.emit(&EnumSyncEvent::SyncStarted {
        path_dir_src: path_dir_src.clone(),
        path_dir_dst: path_dir_dst.clone(),
        if_dry_run: spec_sync_options.if_dry_run,
    });

    if !spec_sync_options.if_dry_run {
        fs::create_dir_all(&path_dir_dst).map_err(|e| SyncTreeError::DestinationInitFailed {
            path: path_dir_dst.clone(),
            message: e.to_string(),
        })?;
    }

    let spec_sync_plan = build_sync_plan(&path_dir_src, &path_dir_dst);
    let report_sync = execute_plan(&spec_sync_plan, &path_dir_dst, &spec_sync_options, sink);

    sink.emit(&EnumSyncEvent::SyncFinished {
        report: report_sync.clone(),
    });
    Ok(report_sync)
}
