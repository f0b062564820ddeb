/*!
 * Tabular Rule
 * Separated-value tables from one 2D field or from sibling fields of a group
 */

use bytes::Bytes;
use tracing::warn;

use super::format::{column_order, table_text};
use super::options::{keys, FsObjectType, RuleOptions};
use crate::core::limits::{
    DEFAULT_PRECISION, DEFAULT_SEPARATOR, MAX_PRECISION, MAX_TABLE_COLUMNS, RENDER_ERROR_PLACEHOLDER,
    UNTITLED_COLUMN,
};
use crate::core::{NxfsError, NxfsResult};
use crate::source::{ElementType, Selection, SourceContainer, SourceNode};
use crate::tree::paths;

/// Renders a node as a table with a title row
///
/// For a field, the leading dimension gives the columns and the rest is
/// flattened into rows. For a group, each `column<N>_content_path` names a
/// field relative to the group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularRule {
    options: RuleOptions,
}

impl TabularRule {
    pub fn new(options: RuleOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RuleOptions {
        &self.options
    }

    /// Tables are always leaf files
    pub fn object_type(&self) -> FsObjectType {
        FsObjectType::File
    }

    pub fn estimate_size(&self, source: &dyn SourceContainer, node: &SourceNode) -> u64 {
        if node.is_field() {
            return node.element_count().saturating_mul(2);
        }

        (1..=self.column_count(&node.path))
            .filter_map(|column| self.column_path(&node.path, column))
            .filter_map(|path| source.node(&path).ok())
            .filter(SourceNode::is_field)
            .map(|field| {
                let width = field.element_type.unwrap_or(ElementType::Opaque).max_chars();
                field.element_count().saturating_mul(width)
            })
            .fold(0u64, u64::saturating_add)
    }

    pub fn render(&self, source: &dyn SourceContainer, node: &SourceNode) -> NxfsResult<Bytes> {
        let separator = self.separator(&node.path);
        let precision = self.precision();

        let columns = if node.is_field() {
            match self.field_columns(source, node, precision) {
                Ok(columns) => columns,
                Err(NxfsError::UnknownElementType { path, element_type }) => {
                    warn!(path = %path, element_type = %element_type, "Table field has no renderer");
                    return Ok(Bytes::from_static(RENDER_ERROR_PLACEHOLDER.as_bytes()));
                }
                Err(e) => return Err(e),
            }
        } else {
            self.group_columns(source, node, precision)
        };

        let titles = self.titles(columns.len());
        let requested: Vec<Option<usize>> = (1..=columns.len())
            .map(|c| self.options.parse_number(&format!("column_order_column{}", c)))
            .collect();
        let order = column_order(&requested);

        Ok(Bytes::from(table_text(&titles, &columns, &order, separator)))
    }

    fn field_columns(
        &self,
        source: &dyn SourceContainer,
        node: &SourceNode,
        precision: usize,
    ) -> NxfsResult<Vec<Vec<String>>> {
        let values = source.read(&node.path, &Selection::All)?;
        let cells = values.format_all(Some(precision));

        if node.rank() > 2 {
            warn!(
                path = %node.path,
                rank = node.rank(),
                "Field has more than two dimensions, flattening into rows"
            );
        }

        let column_count = if node.rank() >= 2 { node.shape[0] } else { 1 };
        if column_count == 0 {
            return Ok(Vec::new());
        }
        let rows = cells.len() / column_count;

        Ok((0..column_count)
            .map(|c| cells[c * rows..(c + 1) * rows].to_vec())
            .collect())
    }

    fn group_columns(
        &self,
        source: &dyn SourceContainer,
        node: &SourceNode,
        precision: usize,
    ) -> Vec<Vec<String>> {
        (1..=self.column_count(&node.path))
            .map(|column| {
                let Some(path) = self.column_path(&node.path, column) else {
                    warn!(
                        path = %node.path,
                        column,
                        "Column has no content path, it will be empty"
                    );
                    return Vec::new();
                };
                match source.read(&path, &Selection::All) {
                    Ok(values) => values.format_all(Some(precision)),
                    Err(e) => {
                        warn!(path = %node.path, column_path = %path, error = %e, "Cannot read table column");
                        Vec::new()
                    }
                }
            })
            .collect()
    }

    fn column_count(&self, path: &str) -> usize {
        match self.options.get(keys::COLUMN_COUNT).map(|v| v.trim().parse::<i64>()) {
            Some(Ok(count)) if count > MAX_TABLE_COLUMNS as i64 => {
                warn!(path = %path, count, max = MAX_TABLE_COLUMNS, "column_count too large, clamped");
                MAX_TABLE_COLUMNS
            }
            Some(Ok(count)) if count >= 0 => count as usize,
            Some(_) => {
                warn!(path = %path, "column_count must be a non-negative integer, table aborted");
                0
            }
            None => {
                warn!(path = %path, "column_count missing, table aborted");
                0
            }
        }
    }

    /// Absolute source path of a configured column, if any
    fn column_path(&self, group: &str, column: usize) -> Option<String> {
        let relative = self.options.get(&format!("column{}_content_path", column))?;
        let relative = relative.strip_prefix("./").unwrap_or(relative);
        if relative.is_empty() {
            return None;
        }
        paths::normalize(&paths::join(group, relative)).ok()
    }

    fn titles(&self, count: usize) -> Vec<String> {
        (1..=count)
            .map(|c| {
                self.options
                    .get(&format!("column{}_title", c))
                    .unwrap_or(UNTITLED_COLUMN)
                    .to_string()
            })
            .collect()
    }

    fn separator(&self, path: &str) -> &str {
        match self.options.get(keys::SEPARATOR) {
            Some(separator) => separator,
            None => {
                warn!(path = %path, default = DEFAULT_SEPARATOR, "Separator not configured, using default");
                DEFAULT_SEPARATOR
            }
        }
    }

    fn precision(&self) -> usize {
        match self.options.parse_number::<i64>(keys::PRECISION) {
            Some(p) if p > MAX_PRECISION as i64 => {
                warn!(precision = p, max = MAX_PRECISION, "Precision too large, clamped");
                MAX_PRECISION
            }
            Some(p) => p.max(0) as usize,
            None => DEFAULT_PRECISION,
        }
    }
}
