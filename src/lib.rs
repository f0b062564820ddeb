/*!
 * NXFS Library
 * Read-only virtual filesystem over hierarchical data containers
 *
 * Every group and field of a source container becomes a folder or file whose
 * content is rendered on demand by a configurable rule: plain text, a
 * delimited table, or a stack of encoded images.
 */

pub mod cache;
pub mod codec;
pub mod config;
pub mod core;
pub mod fs;
#[cfg(feature = "fuse")]
pub mod fuse;
pub mod monitoring;
pub mod rules;
pub mod source;
pub mod tree;

// Re-exports
pub use cache::{CacheStats, ContentCache, FixedBudget, MemoryBudget, SystemMemory};
pub use codec::{ColorMode, ImageCodec, ImageFrame, TiffCodec};
pub use config::{CacheConfig, NxfsConfig, RuleDocument};
pub use self::core::{NxfsError, NxfsResult};
pub use fs::{NxFs, RuleResolver, TreeBuilder};
pub use monitoring::{init_tracing, span_operation, OperationSpan};
pub use rules::{FsObjectType, ImageRule, PlainRule, Rule, RuleOptions, TabularRule};
pub use source::{
    ElementType, MemorySource, NodeKind, Selection, SourceContainer, SourceNode, TypedArray,
};
pub use tree::{VirtualNode, VirtualTree};
