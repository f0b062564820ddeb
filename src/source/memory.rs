/*!
 * In-Memory Source Container
 * Path-indexed container built in code or loaded from a JSON description
 */

use ahash::RandomState;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::element::TypedArray;
use super::traits::SourceContainer;
use super::types::{ElementType, NodeKind, Selection, SourceAttribute, SourceNode};
use crate::core::{NxfsError, NxfsResult};
use crate::tree::paths;

#[derive(Debug, Clone)]
struct StoredNode {
    node: SourceNode,
    /// Child paths in insertion order
    children: Vec<String>,
    /// `None` for groups and opaque fields
    values: Option<TypedArray>,
}

type NodeMap = HashMap<String, StoredNode, RandomState>;

/// Container held entirely in memory
///
/// A source loaded with [`MemorySource::from_file`] re-reads its description
/// on every `open`, so closing and reopening picks up external edits.
#[derive(Debug)]
pub struct MemorySource {
    name: String,
    origin: Option<PathBuf>,
    nodes: NodeMap,
    open: bool,
}

impl MemorySource {
    /// Start building a container in code
    pub fn builder(name: impl Into<String>) -> MemorySourceBuilder {
        MemorySourceBuilder::new(name)
    }

    /// Open a JSON container description
    pub fn from_file(path: impl AsRef<Path>) -> NxfsResult<Self> {
        let path = path.as_ref();
        let nodes = load_description(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("source")
            .to_string();

        info!(source = %path.display(), nodes = nodes.len(), "Opened container description");
        Ok(Self {
            name,
            origin: Some(path.to_path_buf()),
            nodes,
            open: true,
        })
    }

    /// Parse a JSON container description from a string
    pub fn from_json(name: impl Into<String>, json: &str) -> NxfsResult<Self> {
        let description: RootDescription = serde_json::from_str(json)?;
        Ok(Self {
            name: name.into(),
            origin: None,
            nodes: description.into_nodes()?,
            open: true,
        })
    }

    fn stored(&self, path: &str) -> NxfsResult<&StoredNode> {
        if !self.open {
            return Err(NxfsError::SourceUnavailable(format!(
                "container {} is closed",
                self.name
            )));
        }
        self.nodes
            .get(path)
            .ok_or_else(|| NxfsError::not_found(path))
    }
}

impl SourceContainer for MemorySource {
    fn open(&mut self) -> NxfsResult<()> {
        if let Some(origin) = &self.origin {
            self.nodes = load_description(origin)?;
            debug!(source = %origin.display(), "Reloaded container description");
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
        if self.origin.is_some() {
            self.nodes.clear();
        }
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn node(&self, path: &str) -> NxfsResult<SourceNode> {
        Ok(self.stored(path)?.node.clone())
    }

    fn children(&self, path: &str) -> NxfsResult<Vec<SourceNode>> {
        let stored = self.stored(path)?;
        stored
            .children
            .iter()
            .map(|child| self.node(child))
            .collect()
    }

    fn read(&self, path: &str, selection: &Selection) -> NxfsResult<TypedArray> {
        let stored = self.stored(path)?;
        let node = &stored.node;

        if node.is_group() {
            return Err(NxfsError::NotAFile(path.to_string()));
        }

        let values = stored.values.as_ref().ok_or_else(|| NxfsError::UnknownElementType {
            path: path.to_string(),
            element_type: node
                .element_type
                .unwrap_or(ElementType::Opaque)
                .to_string(),
        })?;

        match *selection {
            Selection::All => Ok(values.clone()),
            Selection::Leading(index) => {
                let (leading, rest) = node.shape.split_first().ok_or_else(|| {
                    NxfsError::UnsupportedShape {
                        path: path.to_string(),
                        reason: "cannot select a slab of a scalar".to_string(),
                    }
                })?;
                if index >= *leading {
                    return Err(NxfsError::UnsupportedShape {
                        path: path.to_string(),
                        reason: format!("index {} outside leading extent {}", index, leading),
                    });
                }
                let slab: usize = rest.iter().product();
                values
                    .slice(index * slab..(index + 1) * slab)
                    .ok_or_else(|| NxfsError::SourceUnavailable(format!(
                        "{}: stored values do not match shape",
                        path
                    )))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Programmatic construction of a [`MemorySource`]
///
/// The first error is kept and returned by [`MemorySourceBuilder::build`].
#[derive(Debug)]
pub struct MemorySourceBuilder {
    name: String,
    nodes: NodeMap,
    error: Option<NxfsError>,
}

impl MemorySourceBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        let mut nodes = NodeMap::default();
        nodes.insert(
            paths::ROOT.to_string(),
            StoredNode {
                node: SourceNode {
                    name: String::new(),
                    path: paths::ROOT.to_string(),
                    kind: NodeKind::Group,
                    element_type: None,
                    shape: Vec::new(),
                    attributes: Vec::new(),
                },
                children: Vec::new(),
                values: None,
            },
        );
        Self {
            name: name.into(),
            nodes,
            error: None,
        }
    }

    /// Add a group
    pub fn group(mut self, path: &str) -> Self {
        let result = self.insert(path, NodeKind::Group, None, Vec::new(), None);
        self.record(result)
    }

    /// Add a field; `shape` empty means scalar
    pub fn field(mut self, path: &str, shape: &[usize], values: TypedArray) -> Self {
        let element_type = values.element_type();
        let result = self.insert(
            path,
            NodeKind::Field,
            Some(element_type),
            shape.to_vec(),
            Some(values),
        );
        self.record(result)
    }

    /// Add a field whose values have no renderer
    pub fn opaque(mut self, path: &str, shape: &[usize]) -> Self {
        let result = self.insert(
            path,
            NodeKind::Field,
            Some(ElementType::Opaque),
            shape.to_vec(),
            None,
        );
        self.record(result)
    }

    /// Attach an attribute to an existing node
    pub fn attribute(mut self, path: &str, name: &str, value: &str) -> Self {
        let result = match self.nodes.get_mut(path) {
            Some(stored) => {
                stored
                    .node
                    .attributes
                    .push(SourceAttribute::new(name, value));
                Ok(())
            }
            None => Err(NxfsError::not_found(path)),
        };
        self.record(result)
    }

    pub fn build(self) -> NxfsResult<MemorySource> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(MemorySource {
            name: self.name,
            origin: None,
            nodes: self.nodes,
            open: true,
        })
    }

    fn record(mut self, result: NxfsResult<()>) -> Self {
        if let Err(e) = result {
            self.error.get_or_insert(e);
        }
        self
    }

    fn insert(
        &mut self,
        path: &str,
        kind: NodeKind,
        element_type: Option<ElementType>,
        shape: Vec<usize>,
        values: Option<TypedArray>,
    ) -> NxfsResult<()> {
        let path = paths::normalize(path)?;
        insert_node(&mut self.nodes, &path, kind, element_type, shape, values, Vec::new())
    }
}

fn insert_node(
    nodes: &mut NodeMap,
    path: &str,
    kind: NodeKind,
    element_type: Option<ElementType>,
    shape: Vec<usize>,
    values: Option<TypedArray>,
    attributes: Vec<SourceAttribute>,
) -> NxfsResult<()> {
    let parent = paths::parent(path)
        .ok_or_else(|| NxfsError::InvalidPath(path.to_string()))?
        .to_string();

    match nodes.get(&parent) {
        Some(stored) if stored.node.is_group() => {}
        Some(_) => {
            return Err(NxfsError::InvalidPath(format!(
                "parent of {} is a field",
                path
            )))
        }
        None => return Err(NxfsError::not_found(parent)),
    }
    if nodes.contains_key(path) {
        return Err(NxfsError::AlreadyExists(path.to_string()));
    }

    let expected = shape
        .iter()
        .try_fold(1usize, |count, &d| count.checked_mul(d))
        .ok_or_else(|| {
            NxfsError::SourceUnavailable(format!("{}: shape {:?} is too large", path, shape))
        })?;
    if let Some(values) = &values {
        if values.len() != expected {
            return Err(NxfsError::SourceUnavailable(format!(
                "{}: {} values for shape {:?}",
                path,
                values.len(),
                shape
            )));
        }
    }

    let node = SourceNode {
        name: paths::file_name(path).to_string(),
        path: path.to_string(),
        kind,
        element_type,
        shape,
        attributes,
    };
    nodes.insert(
        path.to_string(),
        StoredNode {
            node,
            children: Vec::new(),
            values,
        },
    );
    if let Some(parent) = nodes.get_mut(&parent) {
        parent.children.push(path.to_string());
    }
    Ok(())
}

// JSON description
//
// {
//   "attributes": [{"name": "NX_class", "value": "NXroot"}],
//   "children": [
//     {"kind": "group", "name": "entry", "children": [
//       {"kind": "field", "name": "data", "type": "uint16", "shape": [2, 3, 4], "values": [...]}
//     ]}
//   ]
// }

#[derive(Debug, Deserialize)]
struct RootDescription {
    #[serde(default)]
    attributes: Vec<SourceAttribute>,
    #[serde(default)]
    children: Vec<EntryDescription>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum EntryDescription {
    Group {
        name: String,
        #[serde(default)]
        attributes: Vec<SourceAttribute>,
        #[serde(default)]
        children: Vec<EntryDescription>,
    },
    Field {
        name: String,
        #[serde(rename = "type")]
        element_type: ElementType,
        #[serde(default)]
        shape: Vec<usize>,
        #[serde(default)]
        values: Vec<Value>,
        #[serde(default)]
        attributes: Vec<SourceAttribute>,
    },
}

impl RootDescription {
    fn into_nodes(self) -> NxfsResult<NodeMap> {
        let mut builder = MemorySourceBuilder::new("");
        if let Some(root) = builder.nodes.get_mut(paths::ROOT) {
            root.node.attributes = self.attributes;
        }
        for entry in self.children {
            entry.insert_into(&mut builder.nodes, paths::ROOT)?;
        }
        Ok(builder.nodes)
    }
}

impl EntryDescription {
    fn insert_into(self, nodes: &mut NodeMap, parent: &str) -> NxfsResult<()> {
        match self {
            EntryDescription::Group {
                name,
                attributes,
                children,
            } => {
                check_segment(parent, &name)?;
                let path = paths::join(parent, &name);
                insert_node(nodes, &path, NodeKind::Group, None, Vec::new(), None, attributes)?;
                for child in children {
                    child.insert_into(nodes, &path)?;
                }
                Ok(())
            }
            EntryDescription::Field {
                name,
                element_type,
                shape,
                values,
                attributes,
            } => {
                check_segment(parent, &name)?;
                let path = paths::join(parent, &name);
                let values = match element_type {
                    ElementType::Opaque => None,
                    _ => Some(TypedArray::from_json(&path, element_type, &values)?),
                };
                insert_node(
                    nodes,
                    &path,
                    NodeKind::Field,
                    Some(element_type),
                    shape,
                    values,
                    attributes,
                )
            }
        }
    }
}

fn check_segment(parent: &str, name: &str) -> NxfsResult<()> {
    if paths::is_valid_segment(name) {
        Ok(())
    } else {
        Err(NxfsError::InvalidPath(format!(
            "invalid entry name {:?} under {}",
            name, parent
        )))
    }
}

fn load_description(path: &Path) -> NxfsResult<NodeMap> {
    let text = std::fs::read_to_string(path).map_err(|e| {
        NxfsError::SourceUnavailable(format!("{}: {}", path.display(), e))
    })?;
    let description: RootDescription = serde_json::from_str(&text)?;
    description.into_nodes()
}
