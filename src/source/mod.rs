/*!
 * Source Container Module
 * Read access to the hierarchical data container being exposed
 */

pub mod element;
pub mod memory;
pub mod traits;
pub mod types;

// Re-exports
pub use element::{Element, TypedArray};
pub use memory::{MemorySource, MemorySourceBuilder};
pub use traits::SourceContainer;
pub use types::{ElementType, NodeKind, Selection, SourceAttribute, SourceNode};
