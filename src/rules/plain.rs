/*!
 * Plain Rule
 * Whitespace-delimited text dump of a field, dimension by dimension
 */

use bytes::Bytes;
use tracing::error;

use super::format::plain_text;
use super::options::{FsObjectType, RuleOptions};
use crate::core::limits::RENDER_ERROR_PLACEHOLDER;
use crate::core::{NxfsError, NxfsResult};
use crate::source::{ElementType, NodeKind, Selection, SourceContainer, SourceNode};

/// Default rendering behaviour for every node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlainRule {
    options: RuleOptions,
}

impl PlainRule {
    pub fn new(options: RuleOptions) -> Self {
        Self { options }
    }

    /// Built-in rule: fields are files, groups are folders
    pub fn hardcoded(kind: NodeKind) -> Self {
        let object_type = match kind {
            NodeKind::Field => FsObjectType::File,
            NodeKind::Group => FsObjectType::Folder,
        };
        Self::new(RuleOptions::classified(object_type))
    }

    /// Rule for synthetic folders and the root
    pub fn folder() -> Self {
        Self::new(RuleOptions::classified(FsObjectType::Folder))
    }

    pub fn options(&self) -> &RuleOptions {
        &self.options
    }

    /// Declared classification, or the node kind when none is declared
    pub fn object_type(&self, kind: NodeKind) -> FsObjectType {
        match self.options.fsobject_type() {
            Some(object_type) => object_type,
            None if kind == NodeKind::Group => FsObjectType::Folder,
            None => FsObjectType::File,
        }
    }

    /// Upper bound on the rendered length: one separator plus the widest
    /// printable value per element
    pub fn estimate_size(&self, node: &SourceNode) -> u64 {
        if !node.is_field() {
            return 0;
        }
        let count = node.element_count();
        let width = node
            .element_type
            .unwrap_or(ElementType::Opaque)
            .max_chars();
        count.saturating_add(count.saturating_mul(width))
    }

    pub fn render(&self, source: &dyn SourceContainer, node: &SourceNode) -> NxfsResult<Bytes> {
        if !node.is_field() {
            return Ok(Bytes::new());
        }

        let values = match source.read(&node.path, &Selection::All) {
            Ok(values) => values,
            Err(NxfsError::UnknownElementType { path, element_type }) => {
                error!(
                    path = %path,
                    element_type = %element_type,
                    "Field has no renderer for its element type"
                );
                return Ok(Bytes::from_static(RENDER_ERROR_PLACEHOLDER.as_bytes()));
            }
            Err(e) => return Err(e),
        };

        let text = plain_text(&values.format_all(None), &node.shape);
        Ok(Bytes::from(text))
    }
}
