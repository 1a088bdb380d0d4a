//! OS artifact ("junk") name predicate.

/// Prefix of AppleDouble resource-fork companions.
pub const C_JUNK_PREFIX_RESOURCE_FORK: &str = "._";

/// Exact names of known OS-generated artifacts.
pub const L_JUNK_NAMES: [&str; 6] = [
    ".DS_Store",
    "._.DS_Store",
    "Thumbs.db",
    "Desktop.ini",
    ".localized",
    "__MACOSX",
];

/// Return `true` if `name` (a basename, not a path) is an OS artifact.
///
/// Junk files are never copied and are purged from the destination even
/// when the source holds a file at the same relative path.
pub fn is_junk_name(name: &str) -> bool {
    name.starts_with(C_JUNK_PREFIX_RESOURCE_FORK) || L_JUNK_NAMES.contains(&name)
}
