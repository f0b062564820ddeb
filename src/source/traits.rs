/*!
 * Source Container Traits
 * Capability consumed by the tree builder and the rule renderers
 */

use super::element::TypedArray;
use super::types::{Selection, SourceNode};
use crate::core::NxfsResult;

/// Read-only view of a hierarchical data container
///
/// Implementations are not assumed to be thread-safe; the filesystem context
/// serializes every call behind a single lock. Paths are absolute,
/// `/`-separated and rooted at `/`.
pub trait SourceContainer: Send {
    /// Open (or reopen) the underlying container
    fn open(&mut self) -> NxfsResult<()>;

    /// Release the underlying container
    fn close(&mut self);

    /// Check whether the container is currently open
    fn is_open(&self) -> bool;

    /// Describe the node at `path`
    fn node(&self, path: &str) -> NxfsResult<SourceNode>;

    /// Describe the direct children of the group at `path`, in container order
    fn children(&self, path: &str) -> NxfsResult<Vec<SourceNode>>;

    /// Read the values of the field at `path`
    fn read(&self, path: &str, selection: &Selection) -> NxfsResult<TypedArray>;

    /// Short name used in log output
    fn name(&self) -> &str {
        "source"
    }
}
