/*!
 * Image Codec
 * Encoding of 2D sample frames into image file bytes
 */

mod tiff;

pub use self::tiff::TiffCodec;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::core::NxfsResult;

/// Colour interpretation of frame samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorMode {
    MinIsWhite,
    #[default]
    MinIsBlack,
    Rgb,
    Palette,
    Mask,
}

impl ColorMode {
    /// Parse a `colormetric` option; unknown or missing values fall back to `MinIsBlack`
    pub fn from_option(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some("PHOTOMETRIC_MINISWHITE") | Some("MINISWHITE") | Some("0") => ColorMode::MinIsWhite,
            Some("PHOTOMETRIC_MINISBLACK") | Some("MINISBLACK") | Some("1") => ColorMode::MinIsBlack,
            Some("PHOTOMETRIC_RGB") | Some("RGB") | Some("2") => ColorMode::Rgb,
            Some("PHOTOMETRIC_PALETTE") | Some("PALETTE") | Some("3") => ColorMode::Palette,
            Some("PHOTOMETRIC_MASK") | Some("MASK") | Some("4") => ColorMode::Mask,
            _ => ColorMode::MinIsBlack,
        }
    }
}

/// One 2D slice ready for encoding
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame {
    pub width: u32,
    pub height: u32,
    /// Bits per sample requested by the rule
    pub bit_depth: u16,
    pub color_mode: ColorMode,
    /// Samples came from a floating-point field
    pub float_samples: bool,
    /// `width * height` samples, row-major
    pub samples: Vec<f64>,
}

impl ImageFrame {
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Encoder from frames to image file bytes
pub trait ImageCodec: Send + Sync {
    fn encode(&self, frame: &ImageFrame) -> NxfsResult<Bytes>;

    /// File format name, for logs
    fn format_name(&self) -> &'static str;
}
