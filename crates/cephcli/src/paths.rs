//! String-level path helpers for mixing local and remote paths.
//!
//! Command arguments are handled as strings on both sides of a
//! transfer, so a trailing slash stays visible to the destination
//! logic instead of being normalized away.

/// The part after the last `/`; the whole path when there is none.
///
/// A trailing slash yields the empty string.
pub fn basename(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

/// The part before the last `/`; empty when there is none.
///
/// Unlike [`cephfstool::path::parent_of`] this keeps everything up to
/// the last slash, so `a/b/` maps to `a/b`.
pub fn dirname(path: &str) -> &str {
    match path.rfind('/') {
        Some(pos) => &path[..pos],
        None => "",
    }
}
