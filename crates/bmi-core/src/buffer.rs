//! Flat, homogeneously-typed exchange buffers.
//!
//! The transport only understands flat sequences of a single element type.
//! [`Values`] and [`ValuesMut`] are borrowed, type-tagged views that cross the
//! [`Session`](crate::session::Session) boundary, while [`ValueBuffer`] is the owned form used
//! when the driver allocates buffers itself.
//!
//! None of these types carry shape information.
//! The caller tracks the shape (see [`crate::grid`]) and reshapes if needed
//! (see [`crate::array`]).

use serde::{Deserialize, Serialize};

use crate::variable::ElementType;

/// Borrowed view of a flat buffer being sent to a model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Values<'a> {
    F64(&'a [f64]),
    F32(&'a [f32]),
    I32(&'a [i32]),
    I64(&'a [i64]),
}

/// Borrowed view of a flat buffer to be filled by a model.
#[derive(Debug, PartialEq)]
pub enum ValuesMut<'a> {
    F64(&'a mut [f64]),
    F32(&'a mut [f32]),
    I32(&'a mut [i32]),
    I64(&'a mut [i64]),
}

/// Owned flat buffer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum ValueBuffer {
    Float64(Vec<f64>),
    Float32(Vec<f32>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
}

macro_rules! dispatch {
    ($value:expr, $inner:ident => $body:expr) => {
        match $value {
            Self::F64($inner) => $body,
            Self::F32($inner) => $body,
            Self::I32($inner) => $body,
            Self::I64($inner) => $body,
        }
    };
}

impl Values<'_> {
    pub fn len(&self) -> usize {
        dispatch!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            Values::F64(_) => ElementType::Float64,
            Values::F32(_) => ElementType::Float32,
            Values::I32(_) => ElementType::Int32,
            Values::I64(_) => ElementType::Int64,
        }
    }

    /// Copies the values into an owned buffer.
    pub fn to_buffer(&self) -> ValueBuffer {
        match self {
            Values::F64(v) => ValueBuffer::Float64(v.to_vec()),
            Values::F32(v) => ValueBuffer::Float32(v.to_vec()),
            Values::I32(v) => ValueBuffer::Int32(v.to_vec()),
            Values::I64(v) => ValueBuffer::Int64(v.to_vec()),
        }
    }
}

impl ValuesMut<'_> {
    pub fn len(&self) -> usize {
        dispatch!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> ElementType {
        match self {
            ValuesMut::F64(_) => ElementType::Float64,
            ValuesMut::F32(_) => ElementType::Float32,
            ValuesMut::I32(_) => ElementType::Int32,
            ValuesMut::I64(_) => ElementType::Int64,
        }
    }

    /// Copies `source` into this view.
    ///
    /// Returns `false`, leaving the view untouched, if the element types or lengths differ.
    pub fn copy_from(&mut self, source: &ValueBuffer) -> bool {
        match (self, source) {
            (ValuesMut::F64(dst), ValueBuffer::Float64(src)) if dst.len() == src.len() => {
                dst.copy_from_slice(src)
            }
            (ValuesMut::F32(dst), ValueBuffer::Float32(src)) if dst.len() == src.len() => {
                dst.copy_from_slice(src)
            }
            (ValuesMut::I32(dst), ValueBuffer::Int32(src)) if dst.len() == src.len() => {
                dst.copy_from_slice(src)
            }
            (ValuesMut::I64(dst), ValueBuffer::Int64(src)) if dst.len() == src.len() => {
                dst.copy_from_slice(src)
            }
            _ => return false,
        }
        true
    }
}

impl ValueBuffer {
    /// A zero-filled buffer of `len` elements.
    pub fn zeros(element_type: ElementType, len: usize) -> Self {
        match element_type {
            ElementType::Float64 => ValueBuffer::Float64(vec![0.0; len]),
            ElementType::Float32 => ValueBuffer::Float32(vec![0.0; len]),
            ElementType::Int32 => ValueBuffer::Int32(vec![0; len]),
            ElementType::Int64 => ValueBuffer::Int64(vec![0; len]),
        }
    }

    /// A buffer of `len` elements all set to `value`, converted to `element_type`.
    pub fn filled(element_type: ElementType, len: usize, value: f64) -> Self {
        match element_type {
            ElementType::Float64 => ValueBuffer::Float64(vec![value; len]),
            ElementType::Float32 => ValueBuffer::Float32(vec![value as f32; len]),
            ElementType::Int32 => ValueBuffer::Int32(vec![value as i32; len]),
            ElementType::Int64 => ValueBuffer::Int64(vec![value as i64; len]),
        }
    }

    /// Converts `values` to `element_type`, truncating towards zero for integer types.
    pub fn from_f64(element_type: ElementType, values: Vec<f64>) -> Self {
        match element_type {
            ElementType::Float64 => ValueBuffer::Float64(values),
            ElementType::Float32 => {
                ValueBuffer::Float32(values.iter().map(|x| *x as f32).collect())
            }
            ElementType::Int32 => ValueBuffer::Int32(values.iter().map(|x| *x as i32).collect()),
            ElementType::Int64 => ValueBuffer::Int64(values.iter().map(|x| *x as i64).collect()),
        }
    }

    pub fn len(&self) -> usize {
        self.as_values().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn element_type(&self) -> ElementType {
        self.as_values().element_type()
    }

    pub fn as_values(&self) -> Values<'_> {
        match self {
            ValueBuffer::Float64(v) => Values::F64(v),
            ValueBuffer::Float32(v) => Values::F32(v),
            ValueBuffer::Int32(v) => Values::I32(v),
            ValueBuffer::Int64(v) => Values::I64(v),
        }
    }

    pub fn as_values_mut(&mut self) -> ValuesMut<'_> {
        match self {
            ValueBuffer::Float64(v) => ValuesMut::F64(v),
            ValueBuffer::Float32(v) => ValuesMut::F32(v),
            ValueBuffer::Int32(v) => ValuesMut::I32(v),
            ValueBuffer::Int64(v) => ValuesMut::I64(v),
        }
    }

    /// The values widened to `f64`, for summaries and reshaping.
    pub fn to_f64(&self) -> Vec<f64> {
        match self {
            ValueBuffer::Float64(v) => v.clone(),
            ValueBuffer::Float32(v) => v.iter().map(|x| *x as f64).collect(),
            ValueBuffer::Int32(v) => v.iter().map(|x| *x as f64).collect(),
            ValueBuffer::Int64(v) => v.iter().map(|x| *x as f64).collect(),
        }
    }

    pub fn as_f64(&self) -> Option<&[f64]> {
        match self {
            ValueBuffer::Float64(v) => Some(v.as_slice()),
            _ => None,
        }
    }
}

impl From<Vec<f64>> for ValueBuffer {
    fn from(values: Vec<f64>) -> Self {
        ValueBuffer::Float64(values)
    }
}

impl From<Vec<f32>> for ValueBuffer {
    fn from(values: Vec<f32>) -> Self {
        ValueBuffer::Float32(values)
    }
}

impl From<Vec<i32>> for ValueBuffer {
    fn from(values: Vec<i32>) -> Self {
        ValueBuffer::Int32(values)
    }
}

impl From<Vec<i64>> for ValueBuffer {
    fn from(values: Vec<i64>) -> Self {
        ValueBuffer::Int64(values)
    }
}

/// A Rust type which can be exchanged with a model.
pub trait Element: Copy + Default + Send + Sync + 'static {
    const ELEMENT_TYPE: ElementType;

    fn values(slice: &[Self]) -> Values<'_>;
    fn values_mut(slice: &mut [Self]) -> ValuesMut<'_>;
}

macro_rules! impl_element {
    ($t:ty, $element_type:ident, $variant:ident) => {
        impl Element for $t {
            const ELEMENT_TYPE: ElementType = ElementType::$element_type;

            fn values(slice: &[Self]) -> Values<'_> {
                Values::$variant(slice)
            }

            fn values_mut(slice: &mut [Self]) -> ValuesMut<'_> {
                ValuesMut::$variant(slice)
            }
        }
    };
}

impl_element!(f64, Float64, F64);
impl_element!(f32, Float32, F32);
impl_element!(i32, Int32, I32);
impl_element!(i64, Int64, I64);
