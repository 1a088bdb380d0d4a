//! Plan execution: directory creation, copy phase, delete phase.
//!
//! Order is fixed: directories are created before any copy starts, and
//! obsolete directories are pruned only after every file deletion finished.
//! Inside the copy and delete phases task order is unspecified; each task
//! owns a distinct destination path, so no locking is needed.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::dirs::{create_directories, remove_directories};
use crate::event::{EnumSyncEvent, SyncEventSink};
use crate::report::{ReportSync, ReportSyncBuilder};
use crate::spec::{SpecCopyTask, SpecDeleteTask, SpecSyncOptions, SpecSyncPlan};
use crate::util::{
    calculate_chunk_size, calculate_copy_worker_count, calculate_worker_limit,
    copy_file_with_metadata, remove_file_if_present,
};

/// Apply `spec_sync_plan` to `dir_destination`.
///
/// Per-task failures are recorded in the returned report and emitted as
/// error events; they never abort the run. With `if_dry_run` only the
/// planned counts are reported.
pub fn execute_plan<Q: AsRef<Path>>(
    spec_sync_plan: &SpecSyncPlan,
    dir_destination: Q,
    spec_sync_options: &SpecSyncOptions,
    sink: &dyn SyncEventSink,
) -> ReportSync {
    let path_dir_dst = dir_destination.as_ref();
    let mut builder_sync_report = ReportSyncBuilder::default();

    let cnt_copy = spec_sync_plan.l_tasks_copy.len() as u64;
    let cnt_delete = spec_sync_plan.l_tasks_delete.len() as u64;
    builder_sync_report.add_counts(&["cnt_scanned"], cnt_copy + spec_sync_plan.cnt_unchanged);
    builder_sync_report.add_counts(&["cnt_skipped"], spec_sync_plan.cnt_unchanged);
    builder_sync_report.add_counts(&["cnt_planned_copy"], cnt_copy);
    builder_sync_report.add_counts(&["cnt_planned_delete"], cnt_delete);
    for warning in &spec_sync_plan.warnings {
        builder_sync_report.add_warning(warning.clone());
        sink.emit(&EnumSyncEvent::Warning {
            message: warning.clone(),
        });
    }
    sink.emit(&EnumSyncEvent::Planned {
        cnt_copy,
        cnt_delete,
        cnt_unchanged: spec_sync_plan.cnt_unchanged,
    });

    if spec_sync_options.if_dry_run {
        return builder_sync_report.build();
    }

    create_directories(
        path_dir_dst,
        &spec_sync_plan.l_dirs_rel_create,
        sink,
        &mut builder_sync_report,
    );
    run_copy_phase(
        &spec_sync_plan.l_tasks_copy,
        path_dir_dst,
        spec_sync_options,
        sink,
        &mut builder_sync_report,
    );
    run_delete_phase(
        spec_sync_plan,
        spec_sync_options,
        sink,
        &mut builder_sync_report,
    );

    builder_sync_report.build()
}

fn build_thread_pool(
    n_threads: usize,
    sink: &dyn SyncEventSink,
    builder_sync_report: &mut ReportSyncBuilder,
) -> Option<ThreadPool> {
    if n_threads <= 1 {
        return None;
    }
    match ThreadPoolBuilder::new().num_threads(n_threads).build() {
        Ok(thread_pool) => Some(thread_pool),
        Err(e) => {
            let message = format!(
                "Failed to initialize thread pool (threads={n_threads}, {e}); fallback to serial."
            );
            builder_sync_report.add_warning(message.clone());
            sink.emit(&EnumSyncEvent::Warning { message });
            None
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region CopyPhase

fn copy_task(
    spec_task: &SpecCopyTask,
    path_dir_dst: &Path,
    sink: &dyn SyncEventSink,
) -> Result<(), String> {
    let path_file_dst = path_dir_dst.join(&spec_task.path_rel);
    match copy_file_with_metadata(&spec_task.path_file_src, &path_file_dst) {
        Ok(()) => {
            sink.emit(&EnumSyncEvent::FileCopied {
                path_rel: spec_task.path_rel.clone(),
            });
            Ok(())
        }
        Err(e) => {
            sink.emit(&EnumSyncEvent::CopyFailed {
                path: spec_task.path_file_src.clone(),
                exception: e.to_string(),
            });
            Err(e.to_string())
        }
    }
}

/// Copy phase: `n_workers` contiguous chunks on one pool of
/// `n_workers * threads_per_worker` threads.
fn run_copy_phase(
    l_tasks_copy: &[SpecCopyTask],
    path_dir_dst: &Path,
    spec_sync_options: &SpecSyncOptions,
    sink: &dyn SyncEventSink,
    builder_sync_report: &mut ReportSyncBuilder,
) {
    if l_tasks_copy.is_empty() {
        return;
    }

    let n_workers = calculate_copy_worker_count(
        l_tasks_copy.len(),
        calculate_worker_limit(spec_sync_options.num_workers_max),
    );
    let n_chunk_size = calculate_chunk_size(l_tasks_copy.len(), n_workers);
    let n_threads = n_workers.saturating_mul(spec_sync_options.threads_per_worker);

    let l_results: Vec<(&SpecCopyTask, Result<(), String>)> =
        match build_thread_pool(n_threads, sink, builder_sync_report) {
            Some(thread_pool) => thread_pool.install(|| {
                l_tasks_copy
                    .par_chunks(n_chunk_size)
                    .flat_map(|l_chunk| {
                        l_chunk
                            .par_iter()
                            .map(move |t| (t, copy_task(t, path_dir_dst, sink)))
                    })
                    .collect()
            }),
            None => l_tasks_copy
                .iter()
                .map(|t| (t, copy_task(t, path_dir_dst, sink)))
                .collect(),
        };

    for (spec_task, res_copy) in l_results {
        match res_copy {
            Ok(()) => builder_sync_report.add_copied(),
            Err(msg) => builder_sync_report.add_error(spec_task.path_file_src.clone(), msg),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DeletePhase

fn delete_task(spec_task: &SpecDeleteTask, sink: &dyn SyncEventSink) -> Result<(), String> {
    match remove_file_if_present(&spec_task.path_file_dst) {
        Ok(()) => {
            sink.emit(&EnumSyncEvent::FileDeleted {
                path_rel: spec_task.path_rel.clone(),
                if_junk: spec_task.if_junk,
            });
            Ok(())
        }
        Err(e) => {
            sink.emit(&EnumSyncEvent::DeleteFailed {
                path: spec_task.path_file_dst.clone(),
                exception: e.to_string(),
            });
            Err(e.to_string())
        }
    }
}

/// Delete phase: file removals on one pool of `threads_per_worker` threads,
/// then obsolete directories, deepest level first, on the same pool.
fn run_delete_phase(
    spec_sync_plan: &SpecSyncPlan,
    spec_sync_options: &SpecSyncOptions,
    sink: &dyn SyncEventSink,
    builder_sync_report: &mut ReportSyncBuilder,
) {
    if spec_sync_plan.l_tasks_delete.is_empty() && spec_sync_plan.l_dirs_obsolete.is_empty() {
        remove_directories(&[], None, sink, builder_sync_report);
        return;
    }
    let thread_pool = build_thread_pool(
        spec_sync_options.threads_per_worker,
        sink,
        builder_sync_report,
    );

    let l_tasks_delete = &spec_sync_plan.l_tasks_delete;
    let l_results: Vec<(PathBuf, Result<(), String>)> = match &thread_pool {
        Some(thread_pool) => thread_pool.install(|| {
            l_tasks_delete
                .par_iter()
                .map(|t| (t.path_file_dst.clone(), delete_task(t, sink)))
                .collect()
        }),
        None => l_tasks_delete
            .iter()
            .map(|t| (t.path_file_dst.clone(), delete_task(t, sink)))
            .collect(),
    };
    for (path_file_dst, res_delete) in l_results {
        match res_delete {
            Ok(()) => builder_sync_report.add_deleted(),
            Err(msg) => builder_sync_report.add_error(path_file_dst, msg),
        }
    }

    remove_directories(
        &spec_sync_plan.l_dirs_obsolete,
        thread_pool.as_ref(),
        sink,
        builder_sync_report,
    );
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
