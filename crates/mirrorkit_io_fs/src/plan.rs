//! Scan both trees and classify every entry into an action.
//!
//! Planning is synchronous and read-only. Its output is consumed by the
//! execution phase; nothing is mutated until the whole plan exists.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::classify::should_copy;
use crate::dirs::collect_obsolete_dirs;
use crate::scan::{EnumScanKind, scan_tree};
use crate::skip::is_junk_name;
use crate::spec::{SpecCopyTask, SpecDeleteTask, SpecSyncPlan};

/// Build the plan that makes `dir_destination` mirror `dir_source`.
///
/// - copy set: junk-filtered source files for which [`should_copy`] holds;
/// - delete set: destination files that are junk, or whose relative path is
///   not a (junk-filtered) source file;
/// - directories: every source directory to create, and destination-only
///   directories to prune (deepest first).
///
/// A missing destination simply yields an empty delete set.
pub fn build_sync_plan<P, Q>(dir_source: P, dir_destination: Q) -> SpecSyncPlan
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_dir_src = dir_source.as_ref();
    let path_dir_dst = dir_destination.as_ref();
    let mut spec_sync_plan = SpecSyncPlan::default();

    let spec_scan_dirs_src = scan_tree(path_dir_src, EnumScanKind::Dirs, false);
    let spec_scan_files_src = scan_tree(path_dir_src, EnumScanKind::Files, true);

    let mut l_dirs_rel_src_unreadable = spec_scan_files_src.l_dirs_rel_unreadable.clone();
    for path_rel in &spec_scan_dirs_src.l_dirs_rel_unreadable {
        if !l_dirs_rel_src_unreadable.contains(path_rel) {
            l_dirs_rel_src_unreadable.push(path_rel.clone());
        }
    }
    spec_sync_plan
        .warnings
        .extend(spec_scan_files_src.warnings.iter().cloned());

    // Directories
    let set_dirs_rel_src: HashSet<PathBuf> = spec_scan_dirs_src
        .l_entries
        .iter()
        .map(|e| e.path_rel.clone())
        .collect();
    spec_sync_plan.l_dirs_rel_create = spec_scan_dirs_src
        .l_entries
        .into_iter()
        .map(|e| e.path_rel)
        .collect();

    // Copy set
    let mut set_files_rel_src: HashSet<PathBuf> =
        HashSet::with_capacity(spec_scan_files_src.l_entries.len());
    for entry in spec_scan_files_src.l_entries {
        let path_file_dst = path_dir_dst.join(&entry.path_rel);
        if should_copy(&entry.path_abs, &path_file_dst) {
            spec_sync_plan.l_tasks_copy.push(SpecCopyTask {
                path_file_src: entry.path_abs,
                path_rel: entry.path_rel.clone(),
            });
        } else {
            spec_sync_plan.cnt_unchanged += 1;
        }
        set_files_rel_src.insert(entry.path_rel);
    }

    if !path_dir_dst.is_dir() {
        return spec_sync_plan;
    }

    // Delete set
    let spec_scan_files_dst = scan_tree(path_dir_dst, EnumScanKind::Files, false);
    spec_sync_plan
        .warnings
        .extend(spec_scan_files_dst.warnings.iter().cloned());
    for entry in spec_scan_files_dst.l_entries {
        let if_junk = entry
            .path_rel
            .file_name()
            .is_some_and(|name| is_junk_name(&name.to_string_lossy()));
        let if_orphan = !set_files_rel_src.contains(&entry.path_rel)
            && !l_dirs_rel_src_unreadable
                .iter()
                .any(|p| entry.path_rel.starts_with(p));
        if if_junk || if_orphan {
            spec_sync_plan.l_tasks_delete.push(SpecDeleteTask {
                path_file_dst: entry.path_abs,
                path_rel: entry.path_rel,
                if_junk,
            });
        }
    }

    // Obsolete directories
    let spec_scan_dirs_dst = scan_tree(path_dir_dst, EnumScanKind::Dirs, false);
    spec_sync_plan.l_dirs_obsolete = collect_obsolete_dirs(
        &set_dirs_rel_src,
        spec_scan_dirs_dst.l_entries,
        &l_dirs_rel_src_unreadable,
    );

    spec_sync_plan
}
