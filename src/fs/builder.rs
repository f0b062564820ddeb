/*!
 * Tree Builder
 * Depth-first mirror of the source hierarchy into a virtual tree
 */

use tracing::{debug, info, warn};

use super::resolver::RuleResolver;
use crate::config::RuleDocument;
use crate::core::NxfsResult;
use crate::source::SourceContainer;
use crate::tree::{paths, VirtualNode, VirtualTree};

pub struct TreeBuilder<'a> {
    source: &'a dyn SourceContainer,
    resolver: RuleResolver<'a>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(source: &'a dyn SourceContainer, document: &'a RuleDocument) -> Self {
        Self {
            source,
            resolver: RuleResolver::new(document),
        }
    }

    /// Build the complete tree; only source failures abort the build
    pub fn build(&self) -> NxfsResult<VirtualTree> {
        let mut tree = VirtualTree::new();
        self.add_children(&mut tree, paths::ROOT, paths::ROOT)?;
        info!(source = %self.source.name(), nodes = tree.len(), "Virtual tree built");
        Ok(tree)
    }

    /// Mirror the children of the source group into the virtual folder
    ///
    /// Groups are only descended into when their rule keeps them folders.
    fn add_children(
        &self,
        tree: &mut VirtualTree,
        source_path: &str,
        virtual_path: &str,
    ) -> NxfsResult<()> {
        for child in self.source.children(source_path)? {
            let path = paths::join(virtual_path, &child.name);
            let node = VirtualNode::new(&child.name, &path, &child.path, child.kind);
            if let Err(e) = tree.insert(node, virtual_path) {
                warn!(source = %child.path, error = %e, "Skipping source node");
                continue;
            }

            let final_path = self.resolver.apply(tree, self.source, &child, &path);

            if child.is_group() {
                if tree.find(&final_path)?.is_folder() {
                    self.add_children(tree, &child.path, &final_path)?;
                } else {
                    debug!(path = %final_path, "Group rendered as file, children not mirrored");
                }
            }
        }
        Ok(())
    }
}
