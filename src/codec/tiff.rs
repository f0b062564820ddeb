/*!
 * TIFF Writer
 * Uncompressed single-strip images through the tiff encoder
 *
 * The encoder's built-in colour types cover min-is-black grey and RGB. The
 * remaining photometric interpretations get their own colour types below.
 */

use bytes::Bytes;
use std::io::Cursor;
use tiff::encoder::colortype::{self, ColorType};
use tiff::encoder::{Rational, TiffEncoder, TiffValue};
use tiff::tags::{PhotometricInterpretation, ResolutionUnit, SampleFormat, Tag};

use super::{ColorMode, ImageCodec, ImageFrame};
use crate::core::limits::IMAGE_RESOLUTION_DPI;
use crate::core::{NxfsError, NxfsResult};

const ORIENTATION_TOP_LEFT: u16 = 1;
const PLANAR_CONTIGUOUS: u16 = 1;

macro_rules! photometric_color_types {
    ($($name:ident: $inner:ty, $interpretation:ident, $bits:expr, $format:ident;)*) => {
        $(
            struct $name;

            impl ColorType for $name {
                type Inner = $inner;
                const TIFF_VALUE: PhotometricInterpretation = PhotometricInterpretation::$interpretation;
                const BITS_PER_SAMPLE: &'static [u16] = &[$bits];
                const SAMPLE_FORMAT: &'static [SampleFormat] = &[SampleFormat::$format];
            }
        )*
    };
}

photometric_color_types! {
    WhiteIsZero8: u8, WhiteIsZero, 8, Uint;
    WhiteIsZero16: u16, WhiteIsZero, 16, Uint;
    WhiteIsZero32: u32, WhiteIsZero, 32, Uint;
    WhiteIsZero64: u64, WhiteIsZero, 64, Uint;
    WhiteIsZero32Float: f32, WhiteIsZero, 32, IEEEFP;
    WhiteIsZero64Float: f64, WhiteIsZero, 64, IEEEFP;
    Mask8: u8, TransparencyMask, 8, Uint;
    Mask16: u16, TransparencyMask, 16, Uint;
    Mask32: u32, TransparencyMask, 32, Uint;
    Mask64: u64, TransparencyMask, 64, Uint;
    Mask32Float: f32, TransparencyMask, 32, IEEEFP;
    Mask64Float: f64, TransparencyMask, 64, IEEEFP;
    Palette8: u8, RGBPalette, 8, Uint;
    Palette16: u16, RGBPalette, 16, Uint;
}

/// Encodes frames as TIFF
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffCodec;

impl TiffCodec {
    pub fn new() -> Self {
        Self
    }
}

impl ImageCodec for TiffCodec {
    fn encode(&self, frame: &ImageFrame) -> NxfsResult<Bytes> {
        if frame.width == 0 || frame.height == 0 {
            return Err(NxfsError::Codec(format!(
                "empty frame {}x{}",
                frame.width, frame.height
            )));
        }
        if frame.samples.len() != frame.pixel_count() {
            return Err(NxfsError::Codec(format!(
                "{} samples for a {}x{} frame",
                frame.samples.len(),
                frame.width,
                frame.height
            )));
        }

        let encoded = match frame.color_mode {
            ColorMode::MinIsBlack => encode_gray::<
                colortype::Gray8,
                colortype::Gray16,
                colortype::Gray32,
                colortype::Gray64,
                colortype::Gray32Float,
                colortype::Gray64Float,
            >(frame)?,
            ColorMode::MinIsWhite => encode_gray::<
                WhiteIsZero8,
                WhiteIsZero16,
                WhiteIsZero32,
                WhiteIsZero64,
                WhiteIsZero32Float,
                WhiteIsZero64Float,
            >(frame)?,
            ColorMode::Mask => {
                encode_gray::<Mask8, Mask16, Mask32, Mask64, Mask32Float, Mask64Float>(frame)?
            }
            ColorMode::Rgb => {
                let data: Vec<u8> = frame
                    .samples
                    .iter()
                    .flat_map(|&sample| [sample as u8; 3])
                    .collect();
                write_frame::<colortype::RGB8>(frame, &data, None)?
            }
            ColorMode::Palette if frame.bit_depth <= 8 => {
                let data = convert(frame, |s| s as u8);
                write_frame::<Palette8>(frame, &data, Some(&linear_color_map(8)))?
            }
            ColorMode::Palette => {
                let data = convert(frame, |s| s as u16);
                write_frame::<Palette16>(frame, &data, Some(&linear_color_map(16)))?
            }
        };
        Ok(Bytes::from(encoded))
    }

    fn format_name(&self) -> &'static str {
        "tiff"
    }
}

/// One sample per pixel at the frame's bit depth; float fields keep IEEE samples at 32 and 64 bits
fn encode_gray<G8, G16, G32, G64, F32, F64>(frame: &ImageFrame) -> NxfsResult<Vec<u8>>
where
    G8: ColorType<Inner = u8>,
    G16: ColorType<Inner = u16>,
    G32: ColorType<Inner = u32>,
    G64: ColorType<Inner = u64>,
    F32: ColorType<Inner = f32>,
    F64: ColorType<Inner = f64>,
{
    match (frame.bit_depth, frame.float_samples) {
        (32, true) => write_frame::<F32>(frame, &convert(frame, |s| s as f32), None),
        (64, true) => write_frame::<F64>(frame, &frame.samples, None),
        (8, _) => write_frame::<G8>(frame, &convert(frame, |s| s as u8), None),
        (16, _) => write_frame::<G16>(frame, &convert(frame, |s| s as u16), None),
        (32, _) => write_frame::<G32>(frame, &convert(frame, |s| s as u32), None),
        (64, _) => write_frame::<G64>(frame, &convert(frame, |s| s as u64), None),
        (bits, _) => Err(NxfsError::Codec(format!("unsupported bit depth {}", bits))),
    }
}

fn convert<T>(frame: &ImageFrame, cast: impl Fn(f64) -> T) -> Vec<T> {
    frame.samples.iter().map(|&sample| cast(sample)).collect()
}

/// Single strip, top-left origin, fixed resolution
fn write_frame<C>(frame: &ImageFrame, data: &[C::Inner], color_map: Option<&[u16]>) -> NxfsResult<Vec<u8>>
where
    C: ColorType,
    [C::Inner]: TiffValue,
{
    let mut out = Cursor::new(Vec::new());
    let mut encoder = TiffEncoder::new(&mut out).map_err(codec_error)?;
    let mut image = encoder
        .new_image::<C>(frame.width, frame.height)
        .map_err(codec_error)?;

    image.rows_per_strip(frame.height).map_err(codec_error)?;
    image.resolution(
        ResolutionUnit::Inch,
        Rational {
            n: IMAGE_RESOLUTION_DPI,
            d: 1,
        },
    );
    image
        .encoder()
        .write_tag(Tag::Orientation, ORIENTATION_TOP_LEFT)
        .map_err(codec_error)?;
    image
        .encoder()
        .write_tag(Tag::PlanarConfiguration, PLANAR_CONTIGUOUS)
        .map_err(codec_error)?;
    if let Some(map) = color_map {
        image
            .encoder()
            .write_tag(Tag::ColorMap, map)
            .map_err(codec_error)?;
    }
    image.write_data(data).map_err(codec_error)?;

    drop(encoder);
    Ok(out.into_inner())
}

fn codec_error(error: tiff::TiffError) -> NxfsError {
    NxfsError::Codec(error.to_string())
}

/// Grey ramp: red, green and blue tables each map index `i` to the same intensity
fn linear_color_map(bits: u16) -> Vec<u16> {
    let entries = 1usize << bits;
    let ramp: Vec<u16> = (0..entries)
        .map(|i| ((i * u16::MAX as usize) / (entries - 1)) as u16)
        .collect();
    ramp.repeat(3)
}
