use std::fs;
use std::io;
use std::path::{Path, PathBuf};

////////////////////////////////////////////////////////////////////////////////
// #region PathUtilities

/// Copy tasks per outer worker before another worker is worth starting.
pub(crate) const N_TASKS_PER_WORKER_MIN: usize = 100;

/// Name prefix of the in-flight sibling written by [`copy_file_with_metadata`].
pub(crate) const C_PART_FILE_PREFIX: &str = ".mirrorkit-";

fn _is_relative_to_base(path: &Path, base: &Path) -> bool {
    path.starts_with(base)
}

fn _normalize_path(path: &Path) -> PathBuf {
    if let Ok(resolved) = fs::canonicalize(path) {
        return resolved;
    }
    // Destination may not exist yet: resolve the closest existing ancestor.
    if let (Some(parent), Some(name)) = (path.parent(), path.file_name())
        && !parent.as_os_str().is_empty()
    {
        return _normalize_path(parent).join(name);
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(path)
}

pub(crate) fn is_overlap(src: &Path, dst: &Path) -> bool {
    let src_resolved = _normalize_path(src);
    let dst_resolved = _normalize_path(dst);
    _is_relative_to_base(&dst_resolved, &src_resolved)
        || _is_relative_to_base(&src_resolved, &dst_resolved)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FileOperations

/// Copy one file, creating its parent directory, and carry over timestamps.
///
/// Content is written to a hidden sibling first and renamed over
/// `path_file_dst` only once data and metadata are in place; on failure the
/// sibling is removed and `path_file_dst` is left as it was.
/// On Linux, permissions and extended attributes follow as well.
pub(crate) fn copy_file_with_metadata(
    path_file_src: &Path,
    path_file_dst: &Path,
) -> Result<(), io::Error> {
    let path_parent_dst = match path_file_dst.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(path_parent_dst)?;

    let path_file_part = tempfile::Builder::new()
        .prefix(C_PART_FILE_PREFIX)
        .suffix(".part")
        .tempfile_in(path_parent_dst)?
        .into_temp_path();
    fs::copy(path_file_src, &path_file_part)?;
    apply_file_times(path_file_src, &path_file_part)?;
    #[cfg(target_os = "linux")]
    {
        apply_metadata_linux(path_file_src, &path_file_part)?;
    }
    path_file_part.persist(path_file_dst).map_err(|e| e.error)
}

fn apply_file_times(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    use filetime::{FileTime, set_file_times};

    let stat_src = fs::metadata(path_file_src)?;
    let file_time_access = FileTime::from_last_access_time(&stat_src);
    let file_time_modify = FileTime::from_last_modification_time(&stat_src);
    set_file_times(path_file_dst, file_time_access, file_time_modify)
}

#[cfg(target_os = "linux")]
fn apply_metadata_linux(path_file_src: &Path, path_file_dst: &Path) -> Result<(), io::Error> {
    let stat_src = fs::metadata(path_file_src)?;
    fs::set_permissions(path_file_dst, stat_src.permissions())?;
    copy_xattrs_linux(path_file_src, path_file_dst);
    Ok(())
}

#[cfg(target_os = "linux")]
fn copy_xattrs_linux(path_file_src: &Path, path_file_dst: &Path) {
    let iter_xattr_names = match xattr::list(path_file_src) {
        Ok(v) => v,
        Err(_) => return,
    };

    for name in iter_xattr_names {
        let Some(raw_value) = xattr::get(path_file_src, &name).ok().flatten() else {
            continue;
        };
        let _ = xattr::set(path_file_dst, &name, &raw_value);
    }
}

/// Remove one file; a path that is already gone counts as removed.
pub(crate) fn remove_file_if_present(path_file: &Path) -> Result<(), io::Error> {
    match fs::remove_file(path_file) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

pub(crate) fn is_dir_empty(path_dir: &Path) -> Result<bool, io::Error> {
    Ok(fs::read_dir(path_dir)?.next().is_none())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WorkerSizing

/// Cap for the number of outer copy workers.
pub(crate) fn calculate_worker_limit(num_workers_max: Option<usize>) -> usize {
    let n_cpu = std::thread::available_parallelism()
        .map(|v| v.get())
        .unwrap_or(1);

    match num_workers_max {
        Some(n) => n.clamp(1, n_cpu),
        None => n_cpu,
    }
}

/// `min(limit, max(1, n_tasks / 100))`: small batches stay on one worker.
pub(crate) fn calculate_copy_worker_count(n_tasks: usize, n_workers_limit: usize) -> usize {
    n_workers_limit
        .min((n_tasks / N_TASKS_PER_WORKER_MIN).max(1))
        .max(1)
}

/// Size of each contiguous chunk so that `n_workers` chunks cover `n_tasks`.
pub(crate) fn calculate_chunk_size(n_tasks: usize, n_workers: usize) -> usize {
    n_tasks.div_ceil(n_workers.max(1)).max(1)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
