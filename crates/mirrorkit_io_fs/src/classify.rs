//! Change detection between a source file and its destination candidate.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::Path;

use filetime::FileTime;
use xxhash_rust::xxh3::Xxh3;

/// Read block size used when fingerprinting file content.
pub const N_FINGERPRINT_BLOCK_SIZE: usize = 8192;

/// Decide whether `path_file_dst` must be (re)written from `path_file_src`.
///
/// 1. Destination missing: copy.
/// 2. Source strictly newer: copy iff the content fingerprints differ.
/// 3. Otherwise: keep the destination, even if its content differs.
///
/// Metadata or read failures answer "copy" so the copy task reports the real
/// error instead of the file being silently kept.
pub fn should_copy<P, Q>(path_file_src: P, path_file_dst: Q) -> bool
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_file_src = path_file_src.as_ref();
    let path_file_dst = path_file_dst.as_ref();

    let meta_dst = match fs::metadata(path_file_dst) {
        Ok(v) => v,
        Err(_) => return true,
    };
    let Ok(meta_src) = fs::metadata(path_file_src) else {
        return true;
    };

    let file_time_src = FileTime::from_last_modification_time(&meta_src);
    let file_time_dst = FileTime::from_last_modification_time(&meta_dst);
    if file_time_src <= file_time_dst {
        return false;
    }

    match (
        file_fingerprint(path_file_src),
        file_fingerprint(path_file_dst),
    ) {
        (Ok(n_hash_src), Ok(n_hash_dst)) => n_hash_src != n_hash_dst,
        _ => true,
    }
}

/// XXH3-64 fingerprint of the whole file, streamed in fixed-size blocks.
///
/// Not a security primitive; only used to detect content changes.
pub fn file_fingerprint<P: AsRef<Path>>(path_file: P) -> io::Result<u64> {
    let mut file = File::open(path_file)?;
    let mut hasher = Xxh3::new();
    let mut buf = [0_u8; N_FINGERPRINT_BLOCK_SIZE];
    loop {
        let n_read = match file.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buf[..n_read]);
    }
    Ok(hasher.digest())
}
