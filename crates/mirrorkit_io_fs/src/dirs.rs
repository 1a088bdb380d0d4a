//! Directory reconciliation: mirror source directories, prune obsolete ones.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rayon::ThreadPool;
use rayon::prelude::*;

use crate::event::{EnumSyncEvent, SyncEventSink};
use crate::report::{ReportSync, ReportSyncBuilder};
use crate::scan::enumerate_dirs;
use crate::spec::{SpecEntry, SpecObsoleteDir};
use crate::util::is_dir_empty;

#[derive(Debug)]
enum EnumDirRemoval {
    Removed,
    Retained,
    Vanished,
    Failed(String),
}

/// Create under `dir_destination` every directory found under `dir_source`.
///
/// Idempotent: directories that already exist are left alone.
pub fn sync_directories<P, Q>(
    dir_source: P,
    dir_destination: Q,
    sink: &dyn SyncEventSink,
) -> ReportSync
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let l_dirs_rel: Vec<PathBuf> = enumerate_dirs(dir_source)
        .into_iter()
        .map(|e| e.path_rel)
        .collect();
    let mut builder_sync_report = ReportSyncBuilder::default();
    create_directories(
        dir_destination.as_ref(),
        &l_dirs_rel,
        sink,
        &mut builder_sync_report,
    );
    builder_sync_report.build()
}

/// Remove destination directories that have no source counterpart.
///
/// Deepest first; a directory is removed only if it is empty, otherwise it is
/// kept and a warning is emitted. Nothing is ever deleted recursively.
pub fn remove_obsolete_directories<P, Q>(
    dir_source: P,
    dir_destination: Q,
    sink: &dyn SyncEventSink,
) -> ReportSync
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let set_dirs_rel_src: HashSet<PathBuf> = enumerate_dirs(dir_source)
        .into_iter()
        .map(|e| e.path_rel)
        .collect();
    let l_dirs_obsolete =
        collect_obsolete_dirs(&set_dirs_rel_src, enumerate_dirs(dir_destination), &[]);
    let mut builder_sync_report = ReportSyncBuilder::default();
    remove_directories(&l_dirs_obsolete, None, sink, &mut builder_sync_report);
    builder_sync_report.build()
}

pub(crate) fn create_directories(
    path_dir_dst: &Path,
    l_dirs_rel: &[PathBuf],
    sink: &dyn SyncEventSink,
    builder_sync_report: &mut ReportSyncBuilder,
) {
    // Parents first, so each created directory is counted exactly once.
    let mut l_dirs_rel_sorted: Vec<&PathBuf> = l_dirs_rel.iter().collect();
    l_dirs_rel_sorted.sort_by_key(|p| p.components().count());

    let mut cnt_created = 0_u64;
    for path_rel in l_dirs_rel_sorted {
        let path_dir_dst_sub = path_dir_dst.join(path_rel);
        if path_dir_dst_sub.is_dir() {
            continue;
        }
        match fs::create_dir_all(&path_dir_dst_sub) {
            Ok(()) => {
                cnt_created += 1;
                builder_sync_report.add_dir_created();
                sink.emit(&EnumSyncEvent::DirectoryCreated {
                    path_rel: path_rel.clone(),
                });
            }
            Err(e) => {
                builder_sync_report.add_error(path_dir_dst_sub.clone(), e.to_string());
                sink.emit(&EnumSyncEvent::DirectoryCreateFailed {
                    path: path_dir_dst_sub,
                    exception: e.to_string(),
                });
            }
        }
    }
    if cnt_created == 0 {
        sink.emit(&EnumSyncEvent::NoDirectoriesCreated);
    }
}

/// Destination directories absent from the source, deepest first.
///
/// Directories under a source location that could not be listed are left
/// out: their absence from the source is not established.
pub(crate) fn collect_obsolete_dirs(
    set_dirs_rel_src: &HashSet<PathBuf>,
    l_dirs_dst: Vec<SpecEntry>,
    l_dirs_rel_src_unreadable: &[PathBuf],
) -> Vec<SpecObsoleteDir> {
    let mut l_dirs_obsolete: Vec<SpecObsoleteDir> = l_dirs_dst
        .into_iter()
        .filter(|e| !set_dirs_rel_src.contains(&e.path_rel))
        .filter(|e| {
            !l_dirs_rel_src_unreadable
                .iter()
                .any(|p| e.path_rel.starts_with(p))
        })
        .map(|e| SpecObsoleteDir {
            path_dir_dst: e.path_abs,
            path_rel: e.path_rel,
        })
        .collect();
    l_dirs_obsolete.sort_by(|a, b| b.depth().cmp(&a.depth()).then(a.path_rel.cmp(&b.path_rel)));
    l_dirs_obsolete
}

/// Remove obsolete directories level by level, deepest level first.
///
/// Siblings on one level are independent, so with a pool each level runs in
/// parallel; a level starts only after the deeper one is done.
pub(crate) fn remove_directories(
    l_dirs_obsolete: &[SpecObsoleteDir],
    thread_pool: Option<&ThreadPool>,
    sink: &dyn SyncEventSink,
    builder_sync_report: &mut ReportSyncBuilder,
) {
    let mut dict_levels: BTreeMap<usize, Vec<&SpecObsoleteDir>> = BTreeMap::new();
    for spec_dir in l_dirs_obsolete {
        dict_levels.entry(spec_dir.depth()).or_default().push(spec_dir);
    }

    let mut cnt_removed = 0_u64;
    for (_, l_dirs_level) in dict_levels.into_iter().rev() {
        let l_results: Vec<(&SpecObsoleteDir, EnumDirRemoval)> = match thread_pool {
            Some(thread_pool) => thread_pool.install(|| {
                l_dirs_level
                    .par_iter()
                    .map(|d| (*d, remove_dir_if_empty(&d.path_dir_dst)))
                    .collect()
            }),
            None => l_dirs_level
                .iter()
                .map(|d| (*d, remove_dir_if_empty(&d.path_dir_dst)))
                .collect(),
        };

        for (spec_dir, enum_removal) in l_results {
            match enum_removal {
                EnumDirRemoval::Removed => {
                    cnt_removed += 1;
                    builder_sync_report.add_dir_removed();
                    sink.emit(&EnumSyncEvent::DirectoryRemoved {
                        path_rel: spec_dir.path_rel.clone(),
                    });
                }
                EnumDirRemoval::Retained => {
                    builder_sync_report.add_dir_retained();
                    builder_sync_report.add_warning(format!(
                        "Directory not empty, not removed: {}",
                        spec_dir.path_rel.display()
                    ));
                    sink.emit(&EnumSyncEvent::DirectoryRetained {
                        path_rel: spec_dir.path_rel.clone(),
                    });
                }
                EnumDirRemoval::Vanished => {}
                EnumDirRemoval::Failed(exception) => {
                    builder_sync_report.add_error(spec_dir.path_dir_dst.clone(), exception.clone());
                    sink.emit(&EnumSyncEvent::DirectoryRemoveFailed {
                        path: spec_dir.path_dir_dst.clone(),
                        exception,
                    });
                }
            }
        }
    }
    if cnt_removed == 0 {
        sink.emit(&EnumSyncEvent::NoObsoleteDirectories);
    } else {
        sink.emit(&EnumSyncEvent::ObsoleteDirectoriesRemoved { cnt_removed });
    }
}

fn remove_dir_if_empty(path_dir: &Path) -> EnumDirRemoval {
    match is_dir_empty(path_dir) {
        Ok(false) => return EnumDirRemoval::Retained,
        Ok(true) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => return EnumDirRemoval::Vanished,
        Err(e) => return EnumDirRemoval::Failed(e.to_string()),
    }
    match fs::remove_dir(path_dir) {
        Ok(()) => EnumDirRemoval::Removed,
        Err(e) if e.kind() == io::ErrorKind::NotFound => EnumDirRemoval::Vanished,
        // Something appeared between the emptiness check and the removal.
        Err(_) if path_dir.is_dir() && !is_dir_empty(path_dir).unwrap_or(true) => {
            EnumDirRemoval::Retained
        }
        Err(e) => EnumDirRemoval::Failed(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::path::{Path, PathBuf};

    use super::{collect_obsolete_dirs, remove_obsolete_directories, sync_directories};
    use crate::event::{CollectEventSink, EnumSyncEvent, EnumSyncEventLevel};
    use crate::spec::SpecEntry;

    fn write_text(path: &Path, txt: &str) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, txt).expect("write text");
    }

    #[test]
    fn sync_directories_mirrors_empty_and_nested_dirs() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        std::fs::create_dir_all(src.join("empty")).expect("mkdir");
        std::fs::create_dir_all(src.join("a/b/c")).expect("mkdir");
        std::fs::create_dir_all(&dst).expect("mkdir");

        let sink = CollectEventSink::new();
        let report = sync_directories(&src, &dst, &sink);
        assert_eq!(report.cnt_dirs_created, 4);
        assert!(dst.join("empty").is_dir());
        assert!(dst.join("a/b/c").is_dir());

        let report_again = sync_directories(&src, &dst, &sink);
        assert_eq!(report_again.cnt_dirs_created, 0);
        assert!(sink.events().contains(&EnumSyncEvent::NoDirectoriesCreated));
    }

    #[test]
    fn obsolete_dirs_are_sorted_deepest_first() {
        let set_dirs_rel_src = HashSet::from([PathBuf::from("keep")]);
        let l_dirs_dst = ["keep", "old", "old/x", "old/x/y", "other"]
            .iter()
            .map(|p| SpecEntry {
                path_abs: Path::new("/dst").join(p),
                path_rel: PathBuf::from(p),
            })
            .collect();

        let l_dirs_obsolete = collect_obsolete_dirs(&set_dirs_rel_src, l_dirs_dst, &[]);
        let l_rel: Vec<PathBuf> = l_dirs_obsolete.iter().map(|d| d.path_rel.clone()).collect();
        assert_eq!(
            l_rel,
            vec![
                PathBuf::from("old/x/y"),
                PathBuf::from("old/x"),
                PathBuf::from("old"),
                PathBuf::from("other"),
            ]
        );
    }

    #[test]
    fn obsolete_dirs_under_unreadable_source_are_left_out() {
        let l_dirs_dst = ["locked/sub", "stale"]
            .iter()
            .map(|p| SpecEntry {
                path_abs: Path::new("/dst").join(p),
                path_rel: PathBuf::from(p),
            })
            .collect();

        let l_dirs_obsolete =
            collect_obsolete_dirs(&HashSet::new(), l_dirs_dst, &[PathBuf::from("locked")]);
        assert_eq!(l_dirs_obsolete.len(), 1);
        assert_eq!(l_dirs_obsolete[0].path_rel, PathBuf::from("stale"));
    }

    #[test]
    fn remove_obsolete_removes_empty_chain_and_keeps_non_empty() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        std::fs::create_dir_all(src.join("kept")).expect("mkdir");
        std::fs::create_dir_all(dst.join("kept")).expect("mkdir");
        std::fs::create_dir_all(dst.join("gone/deeper/deepest")).expect("mkdir");
        write_text(&dst.join("full/file.txt"), "data");

        let sink = CollectEventSink::new();
        let report = remove_obsolete_directories(&src, &dst, &sink);

        assert_eq!(report.cnt_dirs_removed, 3);
        assert_eq!(report.cnt_dirs_retained, 1);
        assert!(!dst.join("gone").exists());
        assert!(dst.join("kept").is_dir());
        assert!(dst.join("full/file.txt").is_file());
        assert_eq!(sink.count_level(EnumSyncEventLevel::Warning), 1);
        assert!(sink.events().contains(&EnumSyncEvent::DirectoryRetained {
            path_rel: PathBuf::from("full"),
        }));
        assert_eq!(
            sink.events().last(),
            Some(&EnumSyncEvent::ObsoleteDirectoriesRemoved { cnt_removed: 3 })
        );
    }

    #[test]
    fn remove_obsolete_on_missing_destination_is_a_no_op() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let src = tmp.path().join("src");
        std::fs::create_dir_all(&src).expect("mkdir");

        let sink = CollectEventSink::new();
        let report = remove_obsolete_directories(&src, tmp.path().join("nope"), &sink);
        assert_eq!(report.cnt_dirs_removed, 0);
        assert!(report.is_clean());
        assert_eq!(sink.events(), vec![EnumSyncEvent::NoObsoleteDirectories]);
    }
}
