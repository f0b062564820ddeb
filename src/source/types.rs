/*!
 * Source Types
 * Node descriptions, element types and read selections
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Element type stored in a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementType {
    #[serde(rename = "uint8")]
    UInt8,
    #[serde(rename = "uint16")]
    UInt16,
    #[serde(rename = "uint32")]
    UInt32,
    #[serde(rename = "uint64")]
    UInt64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    Bool,
    String,
    /// Binary, compound or complex data without a renderer
    Opaque,
}

impl ElementType {
    /// Upper bound of printable characters for one value of this type
    ///
    /// Used for size estimation before content is rendered.
    pub const fn max_chars(self) -> u64 {
        match self {
            ElementType::UInt8 => 7,
            ElementType::Int8 => 4,
            ElementType::UInt16 => 18,
            ElementType::Int16 => 13,
            ElementType::UInt32 => 41,
            ElementType::Int32 => 30,
            ElementType::UInt64 | ElementType::Int64 => 64,
            ElementType::Float32 => 52,
            ElementType::Float64 => 64,
            ElementType::Bool => 1,
            ElementType::String => 2048,
            ElementType::Opaque => 8,
        }
    }

    /// Check whether values are floating point
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, ElementType::Float32 | ElementType::Float64)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            ElementType::UInt8 => "uint8",
            ElementType::UInt16 => "uint16",
            ElementType::UInt32 => "uint32",
            ElementType::UInt64 => "uint64",
            ElementType::Int8 => "int8",
            ElementType::Int16 => "int16",
            ElementType::Int32 => "int32",
            ElementType::Int64 => "int64",
            ElementType::Float32 => "float32",
            ElementType::Float64 => "float64",
            ElementType::Bool => "bool",
            ElementType::String => "string",
            ElementType::Opaque => "opaque",
        };
        write!(f, "{}", name)
    }
}

/// Kind of container node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Group,
    Field,
}

/// Named metadata value attached to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAttribute {
    pub name: String,
    #[serde(default)]
    pub value: String,
}

impl SourceAttribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Description of one container node
#[derive(Debug, Clone, PartialEq)]
pub struct SourceNode {
    pub name: String,
    pub path: String,
    pub kind: NodeKind,
    /// `None` for groups
    pub element_type: Option<ElementType>,
    /// Empty for groups and scalars
    pub shape: Vec<usize>,
    /// In container order
    pub attributes: Vec<SourceAttribute>,
}

impl SourceNode {
    #[inline]
    pub fn is_field(&self) -> bool {
        self.kind == NodeKind::Field
    }

    #[inline]
    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// Number of stored values; scalars hold one, groups none
    pub fn element_count(&self) -> u64 {
        if self.is_group() {
            return 0;
        }
        self.shape
            .iter()
            .fold(1u64, |count, &d| count.saturating_mul(d as u64))
    }
}

/// Which part of a field to read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    /// Every value, row-major
    #[default]
    All,
    /// Fix the leading index and take the full extent of the other dimensions
    Leading(usize),
}
