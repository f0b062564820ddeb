/*!
 * Image Rule
 * Expands a rank-3 field into one encoded image per leading index
 */

use bytes::Bytes;
use tracing::error;

use super::options::{keys, FsObjectType, RuleOptions};
use crate::codec::{ColorMode, ImageCodec, ImageFrame};
use crate::core::limits::{DEFAULT_BIT_DEPTH, IMAGE_HEADER_OVERHEAD, MIN_BIT_DEPTH, RENDER_ERROR_PLACEHOLDER};
use crate::core::{NxfsError, NxfsResult};
use crate::source::{Selection, SourceContainer, SourceNode};

/// One synthetic child produced by expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlice {
    pub name: String,
    pub rule: ImageRule,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRule {
    options: RuleOptions,
}

impl ImageRule {
    pub fn new(options: RuleOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RuleOptions {
        &self.options
    }

    pub fn object_type(&self) -> FsObjectType {
        FsObjectType::File
    }

    /// Configured `bit`, falling back to the default when missing or too small
    pub fn bit_depth(&self) -> u16 {
        match self.options.parse_number::<u16>(keys::BIT) {
            Some(bits) if bits >= MIN_BIT_DEPTH => bits,
            _ => DEFAULT_BIT_DEPTH,
        }
    }

    pub fn color_mode(&self) -> ColorMode {
        ColorMode::from_option(self.options.get(keys::COLORMETRIC))
    }

    pub fn part_number(&self) -> Option<usize> {
        self.options.parse_number(keys::PART_NUMBER)
    }

    /// One rule per leading index of `node`, each classified as a file
    ///
    /// Children are named `"<index><extension>"`.
    pub fn expand(&self, node: &SourceNode) -> NxfsResult<Vec<ImageSlice>> {
        if node.rank() != 3 {
            return Err(NxfsError::UnsupportedShape {
                path: node.path.clone(),
                reason: format!("expected rank 3, found rank {}", node.rank()),
            });
        }

        let extension = self.options.extension().unwrap_or("").to_string();
        Ok((0..node.shape[0])
            .map(|index| {
                let mut rule = self.clone();
                rule.options.classify_as(FsObjectType::File);
                rule.options.set(keys::PART_NUMBER, index.to_string());
                ImageSlice {
                    name: format!("{}{}", index, extension),
                    rule,
                }
            })
            .collect())
    }

    /// `rows * columns * bytes_per_sample` plus a fixed header allowance
    pub fn estimate_size(&self, node: &SourceNode) -> u64 {
        let pixels: u64 = match node.shape.as_slice() {
            [_, rows, columns] => (*rows as u64).saturating_mul(*columns as u64),
            _ => 0,
        };
        pixels
            .saturating_mul(u64::from(self.bit_depth() / 8))
            .saturating_add(IMAGE_HEADER_OVERHEAD)
    }

    pub fn render(
        &self,
        source: &dyn SourceContainer,
        node: &SourceNode,
        codec: &dyn ImageCodec,
    ) -> NxfsResult<Bytes> {
        let part = self.part_number().ok_or_else(|| NxfsError::InvalidConfiguration {
            path: node.path.clone(),
            reason: "image slice has no part_number".to_string(),
        })?;

        let (rows, columns) = match node.shape.as_slice() {
            [_, rows, columns] => (*rows, *columns),
            _ => {
                return Err(NxfsError::UnsupportedShape {
                    path: node.path.clone(),
                    reason: format!("expected rank 3, found rank {}", node.rank()),
                })
            }
        };

        let values = match source.read(&node.path, &Selection::Leading(part)) {
            Ok(values) => values,
            Err(NxfsError::UnknownElementType { path, element_type }) => {
                error!(path = %path, element_type = %element_type, "Image field has no renderer");
                return Ok(Bytes::from_static(RENDER_ERROR_PLACEHOLDER.as_bytes()));
            }
            Err(e) => return Err(e),
        };

        let dimension = |n: usize| {
            u32::try_from(n).map_err(|_| NxfsError::Codec(format!("{}: dimension {} too large", node.path, n)))
        };
        let frame = ImageFrame {
            width: dimension(columns)?,
            height: dimension(rows)?,
            bit_depth: self.bit_depth(),
            color_mode: self.color_mode(),
            float_samples: values.element_type().is_float(),
            samples: values.to_samples(),
        };
        codec.encode(&frame)
    }
}
