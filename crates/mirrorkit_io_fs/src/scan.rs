//! Recursive tree enumeration.
//!
//! Only regular files and real directories are reported. Symlinks and
//! special files are neither listed nor followed. Traversal order is
//! whatever `read_dir` yields; callers must only rely on set membership.

use std::fs;
use std::path::{Path, PathBuf};

use crate::skip::is_junk_name;
use crate::spec::SpecEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EnumScanKind {
    Files,
    Dirs,
}

/// Entries of one scan plus the places it could not look into.
#[derive(Debug, Default)]
pub(crate) struct SpecScanOutput {
    pub(crate) l_entries: Vec<SpecEntry>,
    /// Relative paths of directories whose listing failed (`""` is the root).
    pub(crate) l_dirs_rel_unreadable: Vec<PathBuf>,
    pub(crate) warnings: Vec<String>,
}

/// List every regular file below `root` as `(absolute, relative)` entries.
///
/// With `apply_skip_filter`, files whose name is junk are left out.
pub fn enumerate_files<P: AsRef<Path>>(root: P, apply_skip_filter: bool) -> Vec<SpecEntry> {
    scan_tree(root.as_ref(), EnumScanKind::Files, apply_skip_filter).l_entries
}

/// List every directory below `root` (the root itself excluded).
pub fn enumerate_dirs<P: AsRef<Path>>(root: P) -> Vec<SpecEntry> {
    scan_tree(root.as_ref(), EnumScanKind::Dirs, false).l_entries
}

pub(crate) fn scan_tree(
    path_root: &Path,
    enum_kind: EnumScanKind,
    if_apply_skip_filter: bool,
) -> SpecScanOutput {
    let mut spec_scan_output = SpecScanOutput::default();
    let mut l_stack: Vec<(PathBuf, PathBuf)> = vec![(path_root.to_path_buf(), PathBuf::new())];

    while let Some((path_dir, path_dir_rel)) = l_stack.pop() {
        let iter_entries = match fs::read_dir(&path_dir) {
            Ok(iter) => iter,
            Err(e) => {
                spec_scan_output.warnings.push(format!(
                    "Failed to read directory {} ({e})",
                    path_dir.display()
                ));
                spec_scan_output.l_dirs_rel_unreadable.push(path_dir_rel);
                continue;
            }
        };

        for _entry_res in iter_entries {
            let entry = match _entry_res {
                Ok(v) => v,
                Err(e) => {
                    spec_scan_output.warnings.push(format!(
                        "Failed to read directory entry under {} ({e})",
                        path_dir.display()
                    ));
                    spec_scan_output
                        .l_dirs_rel_unreadable
                        .push(path_dir_rel.clone());
                    continue;
                }
            };

            let path_entry = entry.path();
            let cfg_file_type = match entry.file_type() {
                Ok(v) => v,
                Err(e) => {
                    spec_scan_output
                        .warnings
                        .push(format!("Failed to inspect {} ({e})", path_entry.display()));
                    continue;
                }
            };
            let path_entry_rel = path_dir_rel.join(entry.file_name());

            if cfg_file_type.is_dir() {
                if enum_kind == EnumScanKind::Dirs {
                    spec_scan_output.l_entries.push(SpecEntry {
                        path_abs: path_entry.clone(),
                        path_rel: path_entry_rel.clone(),
                    });
                }
                l_stack.push((path_entry, path_entry_rel));
            } else if cfg_file_type.is_file() && enum_kind == EnumScanKind::Files {
                if if_apply_skip_filter && is_junk_name(&entry.file_name().to_string_lossy()) {
                    continue;
                }
                spec_scan_output.l_entries.push(SpecEntry {
                    path_abs: path_entry,
                    path_rel: path_entry_rel,
                });
            }
        }
    }

    spec_scan_output
}
