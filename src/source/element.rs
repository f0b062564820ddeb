/*!
 * Typed Element Storage
 * Closed set of element vectors with one generic formatting path
 */

use serde_json::Value;
use std::ops::Range;

use super::types::ElementType;
use crate::core::{NxfsError, NxfsResult};

/// A value that can be rendered as text or as an image sample
pub trait Element {
    /// Text form; `precision` applies to floating-point values only
    fn format(&self, precision: Option<usize>) -> String;

    /// Numeric form used when building image frames
    fn to_sample(&self) -> f64;
}

macro_rules! impl_integer_element {
    ($($t:ty),* $(,)?) => {
        $(
            impl Element for $t {
                #[inline]
                fn format(&self, _precision: Option<usize>) -> String {
                    self.to_string()
                }

                #[inline]
                fn to_sample(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

impl_integer_element!(u8, u16, u32, u64, i8, i16, i32, i64);

macro_rules! impl_float_element {
    ($($t:ty),* $(,)?) => {
        $(
            impl Element for $t {
                fn format(&self, precision: Option<usize>) -> String {
                    match precision {
                        Some(p) => format!("{:.*}", p, self),
                        None => self.to_string(),
                    }
                }

                #[inline]
                fn to_sample(&self) -> f64 {
                    *self as f64
                }
            }
        )*
    };
}

impl_float_element!(f32, f64);

impl Element for bool {
    fn format(&self, _precision: Option<usize>) -> String {
        self.to_string()
    }

    fn to_sample(&self) -> f64 {
        if *self {
            1.0
        } else {
            0.0
        }
    }
}

impl Element for String {
    fn format(&self, _precision: Option<usize>) -> String {
        self.clone()
    }

    fn to_sample(&self) -> f64 {
        self.trim().parse().unwrap_or(0.0)
    }
}

/// Values read from a field, row-major
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    UInt64(Vec<u64>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Bool(Vec<bool>),
    String(Vec<String>),
}

/// Run `$body` with `$v` bound to the inner vector, whatever its element type
macro_rules! with_values {
    ($array:expr, $v:ident => $body:expr) => {
        match $array {
            TypedArray::UInt8($v) => $body,
            TypedArray::UInt16($v) => $body,
            TypedArray::UInt32($v) => $body,
            TypedArray::UInt64($v) => $body,
            TypedArray::Int8($v) => $body,
            TypedArray::Int16($v) => $body,
            TypedArray::Int32($v) => $body,
            TypedArray::Int64($v) => $body,
            TypedArray::Float32($v) => $body,
            TypedArray::Float64($v) => $body,
            TypedArray::Bool($v) => $body,
            TypedArray::String($v) => $body,
        }
    };
}

/// Like `with_values!`, but wraps the result back into the same variant
macro_rules! map_values {
    ($array:expr, $v:ident => $body:expr) => {
        match $array {
            TypedArray::UInt8($v) => TypedArray::UInt8($body),
            TypedArray::UInt16($v) => TypedArray::UInt16($body),
            TypedArray::UInt32($v) => TypedArray::UInt32($body),
            TypedArray::UInt64($v) => TypedArray::UInt64($body),
            TypedArray::Int8($v) => TypedArray::Int8($body),
            TypedArray::Int16($v) => TypedArray::Int16($body),
            TypedArray::Int32($v) => TypedArray::Int32($body),
            TypedArray::Int64($v) => TypedArray::Int64($body),
            TypedArray::Float32($v) => TypedArray::Float32($body),
            TypedArray::Float64($v) => TypedArray::Float64($body),
            TypedArray::Bool($v) => TypedArray::Bool($body),
            TypedArray::String($v) => TypedArray::String($body),
        }
    };
}

fn format_values<T: Element>(values: &[T], precision: Option<usize>) -> Vec<String> {
    values.iter().map(|v| v.format(precision)).collect()
}

fn sample_values<T: Element>(values: &[T]) -> Vec<f64> {
    values.iter().map(Element::to_sample).collect()
}

impl TypedArray {
    pub fn element_type(&self) -> ElementType {
        match self {
            TypedArray::UInt8(_) => ElementType::UInt8,
            TypedArray::UInt16(_) => ElementType::UInt16,
            TypedArray::UInt32(_) => ElementType::UInt32,
            TypedArray::UInt64(_) => ElementType::UInt64,
            TypedArray::Int8(_) => ElementType::Int8,
            TypedArray::Int16(_) => ElementType::Int16,
            TypedArray::Int32(_) => ElementType::Int32,
            TypedArray::Int64(_) => ElementType::Int64,
            TypedArray::Float32(_) => ElementType::Float32,
            TypedArray::Float64(_) => ElementType::Float64,
            TypedArray::Bool(_) => ElementType::Bool,
            TypedArray::String(_) => ElementType::String,
        }
    }

    pub fn len(&self) -> usize {
        with_values!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every value as text, in storage order
    pub fn format_all(&self, precision: Option<usize>) -> Vec<String> {
        with_values!(self, v => format_values(v, precision))
    }

    /// Every value as an image sample, in storage order
    pub fn to_samples(&self) -> Vec<f64> {
        with_values!(self, v => sample_values(v))
    }

    /// Copy of a contiguous range of values
    pub fn slice(&self, range: Range<usize>) -> Option<TypedArray> {
        if range.start > range.end || range.end > self.len() {
            return None;
        }
        Some(map_values!(self, v => v[range.clone()].to_vec()))
    }

    /// Decode a flat JSON value list into the given element type
    pub fn from_json(path: &str, element_type: ElementType, values: &[Value]) -> NxfsResult<Self> {
        let bad = |index: usize| {
            NxfsError::SourceUnavailable(format!(
                "{}: value {} is not a valid {}",
                path, index, element_type
            ))
        };

        macro_rules! collect {
            ($variant:ident, $conv:expr) => {{
                let mut out = Vec::with_capacity(values.len());
                for (index, value) in values.iter().enumerate() {
                    out.push($conv(value).ok_or_else(|| bad(index))?);
                }
                TypedArray::$variant(out)
            }};
        }

        let unsigned = |v: &Value| v.as_u64();
        let signed = |v: &Value| v.as_i64();

        let array = match element_type {
            ElementType::UInt8 => collect!(UInt8, |v| unsigned(v).and_then(|n| u8::try_from(n).ok())),
            ElementType::UInt16 => collect!(UInt16, |v| unsigned(v).and_then(|n| u16::try_from(n).ok())),
            ElementType::UInt32 => collect!(UInt32, |v| unsigned(v).and_then(|n| u32::try_from(n).ok())),
            ElementType::UInt64 => collect!(UInt64, unsigned),
            ElementType::Int8 => collect!(Int8, |v| signed(v).and_then(|n| i8::try_from(n).ok())),
            ElementType::Int16 => collect!(Int16, |v| signed(v).and_then(|n| i16::try_from(n).ok())),
            ElementType::Int32 => collect!(Int32, |v| signed(v).and_then(|n| i32::try_from(n).ok())),
            ElementType::Int64 => collect!(Int64, signed),
            ElementType::Float32 => collect!(Float32, |v: &Value| v.as_f64().map(|f| f as f32)),
            ElementType::Float64 => collect!(Float64, |v: &Value| v.as_f64()),
            ElementType::Bool => collect!(Bool, |v: &Value| v.as_bool()),
            ElementType::String => collect!(String, |v: &Value| v.as_str().map(str::to_string)),
            ElementType::Opaque => {
                return Err(NxfsError::UnknownElementType {
                    path: path.to_string(),
                    element_type: element_type.to_string(),
                })
            }
        };
        Ok(array)
    }
}
