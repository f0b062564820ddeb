/*!
 * Virtual Tree
 * Path-indexed node map with parent/child linkage by name
 */

mod node;
pub mod paths;

pub use node::VirtualNode;

use ahash::RandomState;
use std::collections::HashMap;

use crate::core::{NxfsError, NxfsResult};
use crate::rules::PlainRule;
use crate::source::NodeKind;

/// Mapping from full path to node
///
/// Every non-root node's parent exists before it is inserted, and no two
/// nodes share a full path.
#[derive(Debug, Clone)]
pub struct VirtualTree {
    nodes: HashMap<String, VirtualNode, RandomState>,
}

impl Default for VirtualTree {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualTree {
    /// Tree holding only the root folder
    pub fn new() -> Self {
        let mut nodes = HashMap::with_hasher(RandomState::new());
        nodes.insert(
            paths::ROOT.to_string(),
            VirtualNode::new("", paths::ROOT, paths::ROOT, NodeKind::Group)
                .with_rule(PlainRule::folder()),
        );
        Self { nodes }
    }

    /// Store `node` under its full path and append its name to the parent
    pub fn insert(&mut self, node: VirtualNode, parent_path: &str) -> NxfsResult<()> {
        if !paths::is_valid_segment(&node.name) {
            return Err(NxfsError::InvalidPath(format!(
                "invalid node name {:?}",
                node.name
            )));
        }
        let expected = paths::join(parent_path, &node.name);
        if node.full_path != expected {
            return Err(NxfsError::InvalidPath(format!(
                "{} is not a child of {}",
                node.full_path, parent_path
            )));
        }
        if self.nodes.contains_key(&node.full_path) {
            return Err(NxfsError::AlreadyExists(node.full_path));
        }

        let parent = self
            .nodes
            .get_mut(parent_path)
            .ok_or_else(|| NxfsError::not_found(parent_path))?;
        parent.children.push(node.name.clone());
        self.nodes.insert(node.full_path.clone(), node);
        Ok(())
    }

    pub fn find(&self, path: &str) -> NxfsResult<&VirtualNode> {
        self.nodes
            .get(path)
            .ok_or_else(|| NxfsError::not_found(path))
    }

    pub fn find_mut(&mut self, path: &str) -> NxfsResult<&mut VirtualNode> {
        self.nodes
            .get_mut(path)
            .ok_or_else(|| NxfsError::not_found(path))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.nodes.contains_key(path)
    }

    /// Replace the last segment of `path`, moving the node and its descendants
    ///
    /// Returns the new full path.
    pub fn rename(&mut self, path: &str, new_name: &str) -> NxfsResult<String> {
        if !paths::is_valid_segment(new_name) {
            return Err(NxfsError::InvalidPath(format!(
                "invalid node name {:?}",
                new_name
            )));
        }
        let parent_path = paths::parent(path)
            .ok_or_else(|| NxfsError::InvalidPath(format!("cannot rename {}", path)))?
            .to_string();
        let new_path = paths::join(&parent_path, new_name);

        if !self.nodes.contains_key(path) {
            return Err(NxfsError::not_found(path));
        }
        if new_path == path {
            return Ok(new_path);
        }
        if self.nodes.contains_key(&new_path) {
            return Err(NxfsError::AlreadyExists(new_path));
        }

        let mut node = self
            .nodes
            .remove(path)
            .ok_or_else(|| NxfsError::not_found(path))?;
        let old_name = std::mem::replace(&mut node.name, new_name.to_string());
        node.full_path = new_path.clone();
        self.nodes.insert(new_path.clone(), node);

        let prefix = format!("{}/", path);
        let descendants: Vec<String> = self
            .nodes
            .keys()
            .filter(|key| key.starts_with(&prefix))
            .cloned()
            .collect();
        for old_key in descendants {
            if let Some(mut moved) = self.nodes.remove(&old_key) {
                moved.full_path = format!("{}/{}", new_path, &old_key[prefix.len()..]);
                self.nodes.insert(moved.full_path.clone(), moved);
            }
        }

        if let Some(parent) = self.nodes.get_mut(&parent_path) {
            if let Some(entry) = parent.children.iter_mut().find(|child| **child == old_name) {
                *entry = new_name.to_string();
            }
        }
        Ok(new_path)
    }

    /// Child names of `path` in insertion order
    pub fn list_children(&self, path: &str) -> NxfsResult<&[String]> {
        Ok(&self.find(path)?.children)
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Depth-first walk from the root, children in insertion order
    pub fn walk(&self) -> Vec<&VirtualNode> {
        let mut out = Vec::with_capacity(self.nodes.len());
        let mut stack = vec![paths::ROOT.to_string()];
        while let Some(path) = stack.pop() {
            if let Some(node) = self.nodes.get(&path) {
                for child in node.children.iter().rev() {
                    stack.push(paths::join(&node.full_path, child));
                }
                out.push(node);
            }
        }
        out
    }
}
