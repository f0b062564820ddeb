/*!
 * Virtual Paths
 * Composition and normalization of '/'-separated absolute paths
 */

use std::path::Path;

use crate::core::{NxfsError, NxfsResult};

/// Root of every virtual tree and source container
pub const ROOT: &str = "/";

/// Compose a child path; children of root are `"/" + name`
pub fn join(parent: &str, name: &str) -> String {
    if parent == ROOT {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}

/// Parent of `path`, or `None` for root and relative paths
pub fn parent(path: &str) -> Option<&str> {
    if path == ROOT {
        return None;
    }
    match path.rfind('/') {
        Some(0) => Some(ROOT),
        Some(index) => Some(&path[..index]),
        None => None,
    }
}

/// Last segment of `path`; empty for root
pub fn file_name(path: &str) -> &str {
    match path.rfind('/') {
        Some(index) => &path[index + 1..],
        None => path,
    }
}

/// Make absolute and clean (`.`, `..`, repeated and trailing separators)
pub fn normalize(path: &str) -> NxfsResult<String> {
    let absolute = if path.starts_with('/') {
        Path::new(path).to_path_buf()
    } else {
        Path::new(ROOT).join(path)
    };

    let cleaned = path_clean::clean(&absolute);
    cleaned
        .to_str()
        .map(str::to_string)
        .ok_or_else(|| NxfsError::InvalidPath(format!("non UTF-8 path: {}", cleaned.display())))
}

/// Check that `name` can be used as a single path segment
pub fn is_valid_segment(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains('/') && !name.contains('\0')
}
