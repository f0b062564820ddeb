/*!
 * Virtual Node
 * One entry of the virtual tree
 */

use crate::rules::{FsObjectType, Rule};
use crate::source::NodeKind;

/// Entry keyed by `full_path` in the virtual tree
///
/// Parent/child links are kept as child names only; the parent is found by
/// stripping the last path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualNode {
    pub name: String,
    pub full_path: String,
    /// Child names in insertion order
    pub children: Vec<String>,
    pub rule: Option<Rule>,
    /// Path of the backing node in the source container
    pub source_ref: String,
    /// Kind of the backing source node
    pub source_kind: NodeKind,
    /// Content length reported before rendering
    pub estimated_size: u64,
}

impl VirtualNode {
    pub fn new(
        name: impl Into<String>,
        full_path: impl Into<String>,
        source_ref: impl Into<String>,
        source_kind: NodeKind,
    ) -> Self {
        Self {
            name: name.into(),
            full_path: full_path.into(),
            children: Vec::new(),
            rule: None,
            source_ref: source_ref.into(),
            source_kind,
            estimated_size: 0,
        }
    }

    pub fn with_rule(mut self, rule: impl Into<Rule>) -> Self {
        self.rule = Some(rule.into());
        self
    }

    /// Classification from the rule, or from the source kind when no rule is set
    pub fn object_type(&self) -> FsObjectType {
        match &self.rule {
            Some(rule) => rule.object_type(self.source_kind),
            None if self.source_kind == NodeKind::Group => FsObjectType::Folder,
            None => FsObjectType::File,
        }
    }

    #[inline]
    pub fn is_folder(&self) -> bool {
        self.object_type() == FsObjectType::Folder
    }
}
