/*!
 * Configuration Module
 * Rules document and runtime settings
 */

pub mod document;
pub mod settings;

pub use document::{OptionMap, RuleDocument, SpecificRule};
pub use settings::{CacheConfig, NxfsConfig};
