/*!
 * Rule Resolver
 * Hardcoded, declared-default and path-specific rules merged per source node
 */

use tracing::{debug, error, warn};

use crate::config::RuleDocument;
use crate::core::NxfsError;
use crate::rules::{
    FsObjectType, ImageRule, ImageSlice, PlainRule, Rule, RuleOptions, TabularRule, MODE_IMAGE,
    MODE_TABLE,
};
use crate::source::{NodeKind, SourceContainer, SourceNode};
use crate::tree::{paths, VirtualNode, VirtualTree};

/// Outcome of classifying one source node
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub rule: Rule,
    /// Synthetic children requested by an image rule
    pub slices: Vec<ImageSlice>,
}

/// Picks the rule for each source node from a rules document
///
/// Precedence, lowest first: the built-in plain rule, default rules named
/// after the node's attributes (last complete match wins), then the specific
/// rule for the node's path. Incomplete rules are skipped.
#[derive(Debug, Clone, Copy)]
pub struct RuleResolver<'a> {
    document: &'a RuleDocument,
}

impl<'a> RuleResolver<'a> {
    pub fn new(document: &'a RuleDocument) -> Self {
        Self { document }
    }

    pub fn classify(&self, node: &SourceNode) -> Resolution {
        let mut rule: Rule = PlainRule::hardcoded(node.kind).into();
        let mut slices = Vec::new();

        for attribute in &node.attributes {
            if !self.document.find_default_rule(&attribute.name) {
                continue;
            }
            let options = RuleOptions::new()
                .with_options(self.document.fetch_default_rule(&attribute.name));
            if options.is_complete() {
                debug!(path = %node.path, rule = %attribute.name, "Applying default rule");
                rule = PlainRule::new(options).into();
            } else {
                debug!(
                    path = %node.path,
                    rule = %attribute.name,
                    missing = ?options.missing(),
                    "Default rule incomplete, skipped"
                );
            }
        }

        let Some(mode) = self.document.find_specific_rule(&node.path) else {
            return Resolution { rule, slices };
        };
        let options = RuleOptions::new().with_options(self.document.fetch_specific_rule(&node.path));

        if !options.is_complete() {
            let failure = NxfsError::InvalidConfiguration {
                path: node.path.clone(),
                reason: format!("missing options {:?}", options.missing()),
            };
            error!(
                path = %node.path,
                mode = %mode,
                rule_location = "/filters/specific_rules/object",
                error = %failure,
                "Specific rule discarded"
            );
            return Resolution { rule, slices };
        }

        rule = match mode {
            MODE_IMAGE => {
                let image = ImageRule::new(options);
                match image.expand(node) {
                    Ok(expanded) => slices = expanded,
                    Err(e) => error!(path = %node.path, error = %e, "Image expansion failed"),
                }
                PlainRule::folder().into()
            }
            MODE_TABLE => TabularRule::new(options).into(),
            _ => PlainRule::new(options).into(),
        };
        debug!(path = %node.path, mode = %mode, "Applying specific rule");

        Resolution { rule, slices }
    }

    /// Classify `node`, attach the result at `virtual_path` and apply any tree changes
    ///
    /// Inserts image slices, stores the rule and size estimate, and appends the
    /// rule's extension to the node name. Returns the node's final path.
    pub fn apply(
        &self,
        tree: &mut VirtualTree,
        source: &dyn SourceContainer,
        node: &SourceNode,
        virtual_path: &str,
    ) -> String {
        let Resolution { rule, slices } = self.classify(node);

        for slice in slices {
            let slice_path = paths::join(virtual_path, &slice.name);
            let size = slice.rule.estimate_size(node);
            let child = VirtualNode {
                estimated_size: size,
                ..VirtualNode::new(&slice.name, slice_path, &node.path, NodeKind::Field)
                    .with_rule(slice.rule)
            };
            if let Err(e) = tree.insert(child, virtual_path) {
                warn!(path = %virtual_path, slice = %slice.name, error = %e, "Cannot add image slice");
            }
        }

        let extension = rule.options().extension().map(str::to_string);
        let size = rule.estimate_size(source, node);
        if let Ok(entry) = tree.find_mut(virtual_path) {
            entry.estimated_size = size;
            entry.rule = Some(rule);
            if entry.object_type() == FsObjectType::None {
                warn!(path = %virtual_path, "Unrecognized fsobject_type, node will be hidden");
            }
        }

        let Some(extension) = extension else {
            return virtual_path.to_string();
        };
        let renamed = format!("{}{}", paths::file_name(virtual_path), extension);
        match tree.rename(virtual_path, &renamed) {
            Ok(new_path) => new_path,
            Err(e) => {
                warn!(path = %virtual_path, name = %renamed, error = %e, "Cannot apply extension");
                virtual_path.to_string()
            }
        }
    }
}
