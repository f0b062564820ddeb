/*!
 * Rendering Rules
 * Per-node classification, content rendering and size estimation
 */

pub mod format;
pub mod image;
pub mod options;
pub mod plain;
pub mod table;

pub use image::{ImageRule, ImageSlice};
pub use options::{keys, FsObjectType, RuleOptions};
pub use plain::PlainRule;
pub use table::TabularRule;

use bytes::Bytes;

use crate::codec::ImageCodec;
use crate::core::NxfsResult;
use crate::source::{NodeKind, SourceContainer, SourceNode};

/// Mode string selecting an image rule in the rules document
pub const MODE_IMAGE: &str = "image";
/// Mode string selecting a tabular rule in the rules document
pub const MODE_TABLE: &str = "table_csv";

/// Rendering behaviour owned by one virtual node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Plain(PlainRule),
    Tabular(TabularRule),
    Image(ImageRule),
}

impl Rule {
    pub fn options(&self) -> &RuleOptions {
        match self {
            Rule::Plain(rule) => rule.options(),
            Rule::Tabular(rule) => rule.options(),
            Rule::Image(rule) => rule.options(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.options().is_complete()
    }

    /// Short variant name for logs and listings
    pub fn kind_name(&self) -> &'static str {
        match self {
            Rule::Plain(_) => "plain",
            Rule::Tabular(_) => "table",
            Rule::Image(_) => "image",
        }
    }

    /// Filesystem classification for a node of the given source kind
    pub fn object_type(&self, kind: NodeKind) -> FsObjectType {
        match self {
            Rule::Plain(rule) => rule.object_type(kind),
            Rule::Tabular(rule) => rule.object_type(),
            Rule::Image(rule) => rule.object_type(),
        }
    }

    pub fn estimate_size(&self, source: &dyn SourceContainer, node: &SourceNode) -> u64 {
        match self {
            Rule::Plain(rule) => rule.estimate_size(node),
            Rule::Tabular(rule) => rule.estimate_size(source, node),
            Rule::Image(rule) => rule.estimate_size(node),
        }
    }

    pub fn render(
        &self,
        source: &dyn SourceContainer,
        node: &SourceNode,
        codec: &dyn ImageCodec,
    ) -> NxfsResult<Bytes> {
        match self {
            Rule::Plain(rule) => rule.render(source, node),
            Rule::Tabular(rule) => rule.render(source, node),
            Rule::Image(rule) => rule.render(source, node, codec),
        }
    }
}

impl From<PlainRule> for Rule {
    fn from(rule: PlainRule) -> Self {
        Rule::Plain(rule)
    }
}

impl From<TabularRule> for Rule {
    fn from(rule: TabularRule) -> Self {
        Rule::Tabular(rule)
    }
}

impl From<ImageRule> for Rule {
    fn from(rule: ImageRule) -> Self {
        Rule::Image(rule)
    }
}
