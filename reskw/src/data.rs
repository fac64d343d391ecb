//! Typed element arrays and their wire codec
//!
//! `TypedArray` is the closed sum of array payloads a keyword can carry.
//! Decoding appends one record payload at a time so multi-record keywords
//! reassemble without copying; encoding produces one record payload per
//! element range.

use crate::error::{Error, Result};
use crate::record::{self, Endianness};
use crate::types::ElementType;

/// Logical `true` on disk: an i32 with every bit set
const LOGICAL_TRUE: i32 = -1;

/// One typed, owned element array.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedArray {
    /// 8-character space-padded text blocks
    Char(Vec<String>),
    /// 32-bit signed integers
    Int(Vec<i32>),
    /// 32-bit floats
    Real(Vec<f32>),
    /// 64-bit floats
    Double(Vec<f64>),
    /// Booleans stored as 32-bit integers
    Logical(Vec<bool>),
    /// Message keywords carry an element count but no payload
    Message(usize),
    /// Fixed-width text elements
    String { width: u8, values: Vec<String> },
}

/// A single element value used for scalar arithmetic and fills.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i32),
    Real(f32),
    Double(f64),
    Bool(bool),
    Text(String),
}

impl Scalar {
    fn element_type(&self) -> ElementType {
        match self {
            Self::Int(_) => ElementType::Int,
            Self::Real(_) => ElementType::Real,
            Self::Double(_) => ElementType::Double,
            Self::Bool(_) => ElementType::Logical,
            Self::Text(_) => ElementType::Char,
        }
    }
}

impl TypedArray {
    /// An empty array of `element_type` with room for `count` elements.
    ///
    /// Message arrays have no storage, so they materialize at full count.
    pub(crate) fn with_capacity(element_type: ElementType, count: usize) -> Self {
        match element_type {
            ElementType::Char => Self::Char(Vec::with_capacity(count)),
            ElementType::Int => Self::Int(Vec::with_capacity(count)),
            ElementType::Real => Self::Real(Vec::with_capacity(count)),
            ElementType::Double => Self::Double(Vec::with_capacity(count)),
            ElementType::Logical => Self::Logical(Vec::with_capacity(count)),
            ElementType::Message => Self::Message(count),
            ElementType::String(width) => Self::String {
                width,
                values: Vec::with_capacity(count),
            },
        }
    }

    /// The element type of this array.
    pub fn element_type(&self) -> ElementType {
        match self {
            Self::Char(_) => ElementType::Char,
            Self::Int(_) => ElementType::Int,
            Self::Real(_) => ElementType::Real,
            Self::Double(_) => ElementType::Double,
            Self::Logical(_) => ElementType::Logical,
            Self::Message(_) => ElementType::Message,
            Self::String { width, .. } => ElementType::String(*width),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Self::Char(values) => values.len(),
            Self::Int(values) => values.len(),
            Self::Real(values) => values.len(),
            Self::Double(values) => values.len(),
            Self::Logical(values) => values.len(),
            Self::Message(count) => *count,
            Self::String { values, .. } => values.len(),
        }
    }

    /// Whether the array has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Decode one record payload, appending its elements.
    ///
    /// Returns the number of elements appended.
    pub(crate) fn decode_block(&mut self, bytes: &[u8], endian: Endianness) -> Result<usize> {
        let width = self.element_type().width();
        if width == 0 {
            return Err(Error::CorruptRecord(
                "message keywords carry no data records".into(),
            ));
        }
        if bytes.len() % width != 0 {
            return Err(Error::CorruptRecord(format!(
                "data record of {} bytes is not a whole number of {width}-byte elements",
                bytes.len()
            )));
        }
        let count = bytes.len() / width;
        let mut cur = bytes;
        match self {
            Self::Int(values) => {
                for _ in 0..count {
                    values.push(record::read_i32(&mut cur, endian)?);
                }
            }
            Self::Real(values) => {
                for _ in 0..count {
                    values.push(record::read_f32(&mut cur, endian)?);
                }
            }
            Self::Double(values) => {
                for _ in 0..count {
                    values.push(record::read_f64(&mut cur, endian)?);
                }
            }
            Self::Logical(values) => {
                for _ in 0..count {
                    values.push(record::read_i32(&mut cur, endian)? != 0);
                }
            }
            Self::Char(values) => {
                for chunk in bytes.chunks_exact(width) {
                    values.push(trim_block(chunk));
                }
            }
            Self::String { values, .. } => {
                for chunk in bytes.chunks_exact(width) {
                    values.push(trim_block(chunk));
                }
            }
            Self::Message(_) => unreachable!("zero-width arrays rejected above"),
        }
        Ok(count)
    }

    /// Encode the element range `start..end` as one record payload.
    pub(crate) fn encode_range(
        &self,
        start: usize,
        end: usize,
        endian: Endianness,
    ) -> Result<Vec<u8>> {
        let width = self.element_type().width();
        let mut buf = Vec::with_capacity((end - start) * width);
        match self {
            Self::Int(values) => {
                for v in &values[start..end] {
                    record::write_i32(&mut buf, endian, *v)?;
                }
            }
            Self::Real(values) => {
                for v in &values[start..end] {
                    record::write_f32(&mut buf, endian, *v)?;
                }
            }
            Self::Double(values) => {
                for v in &values[start..end] {
                    record::write_f64(&mut buf, endian, *v)?;
                }
            }
            Self::Logical(values) => {
                for v in &values[start..end] {
                    record::write_i32(&mut buf, endian, if *v { LOGICAL_TRUE } else { 0 })?;
                }
            }
            Self::Char(values) => {
                for v in &values[start..end] {
                    push_text(&mut buf, v, width)?;
                }
            }
            Self::String { values, .. } => {
                for v in &values[start..end] {
                    push_text(&mut buf, v, width)?;
                }
            }
            Self::Message(_) => {}
        }
        Ok(buf)
    }

    fn check_shape(&self, other: &Self) -> Result<()> {
        if self.element_type() != other.element_type() || self.len() != other.len() {
            return Err(Error::ShapeMismatch {
                left_type: self.element_type(),
                left_len: self.len(),
                right_type: other.element_type(),
                right_len: other.len(),
            });
        }
        Ok(())
    }

    fn scalar_mismatch(&self, scalar: &Scalar) -> Error {
        Error::ShapeMismatch {
            left_type: self.element_type(),
            left_len: self.len(),
            right_type: scalar.element_type(),
            right_len: self.len(),
        }
    }

    /// Elementwise addition of two arrays of identical type and count.
    pub fn add(&mut self, other: &Self) -> Result<()> {
        self.check_shape(other)?;
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => {
                for (x, y) in a.iter_mut().zip(b) {
                    *x = x.wrapping_add(*y);
                }
            }
            (Self::Real(a), Self::Real(b)) => {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += *y;
                }
            }
            (Self::Double(a), Self::Double(b)) => {
                for (x, y) in a.iter_mut().zip(b) {
                    *x += *y;
                }
            }
            (array, _) => return Err(Error::NotNumeric(array.element_type())),
        }
        Ok(())
    }

    /// Elementwise subtraction.
    pub fn sub(&mut self, other: &Self) -> Result<()> {
        self.check_shape(other)?;
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => {
                for (x, y) in a.iter_mut().zip(b) {
                    *x = x.wrapping_sub(*y);
                }
            }
            (Self::Real(a), Self::Real(b)) => {
                for (x, y) in a.iter_mut().zip(b) {
                    *x -= *y;
                }
            }
            (Self::Double(a), Self::Double(b)) => {
                for (x, y) in a.iter_mut().zip(b) {
                    *x -= *y;
                }
            }
            (array, _) => return Err(Error::NotNumeric(array.element_type())),
        }
        Ok(())
    }

    /// Elementwise multiplication.
    pub fn mul(&mut self, other: &Self) -> Result<()> {
        self.check_shape(other)?;
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => {
                for (x, y) in a.iter_mut().zip(b) {
                    *x = x.wrapping_mul(*y);
                }
            }
            (Self::Real(a), Self::Real(b)) => {
                for (x, y) in a.iter_mut().zip(b) {
                    *x *= *y;
                }
            }
            (Self::Double(a), Self::Double(b)) => {
                for (x, y) in a.iter_mut().zip(b) {
                    *x *= *y;
                }
            }
            (array, _) => return Err(Error::NotNumeric(array.element_type())),
        }
        Ok(())
    }

    /// Elementwise division.
    ///
    /// A zero divisor is an error and leaves the array unchanged.
    pub fn div(&mut self, other: &Self) -> Result<()> {
        self.check_shape(other)?;
        match (self, other) {
            (Self::Int(a), Self::Int(b)) => {
                if let Some(i) = b.iter().position(|v| *v == 0) {
                    return Err(Error::DivideByZero(i));
                }
                for (x, y) in a.iter_mut().zip(b) {
                    *x = x.wrapping_div(*y);
                }
            }
            (Self::Real(a), Self::Real(b)) => {
                if let Some(i) = b.iter().position(|v| *v == 0.0) {
                    return Err(Error::DivideByZero(i));
                }
                for (x, y) in a.iter_mut().zip(b) {
                    *x /= *y;
                }
            }
            (Self::Double(a), Self::Double(b)) => {
                if let Some(i) = b.iter().position(|v| *v == 0.0) {
                    return Err(Error::DivideByZero(i));
                }
                for (x, y) in a.iter_mut().zip(b) {
                    *x /= *y;
                }
            }
            (array, _) => return Err(Error::NotNumeric(array.element_type())),
        }
        Ok(())
    }

    /// Replace every element with its reciprocal.
    ///
    /// Defined for Real and Double arrays; a zero element is an error and
    /// leaves the array unchanged.
    pub fn invert(&mut self) -> Result<()> {
        match self {
            Self::Real(values) => {
                if let Some(i) = values.iter().position(|v| *v == 0.0) {
                    return Err(Error::DivideByZero(i));
                }
                for v in values {
                    *v = 1.0 / *v;
                }
            }
            Self::Double(values) => {
                if let Some(i) = values.iter().position(|v| *v == 0.0) {
                    return Err(Error::DivideByZero(i));
                }
                for v in values {
                    *v = 1.0 / *v;
                }
            }
            other => return Err(Error::NotNumeric(other.element_type())),
        }
        Ok(())
    }

    /// Multiply every element by a scalar of the matching type.
    pub fn scale(&mut self, factor: &Scalar) -> Result<()> {
        match (self, factor) {
            (Self::Int(values), Scalar::Int(f)) => {
                for v in values {
                    *v = v.wrapping_mul(*f);
                }
            }
            (Self::Real(values), Scalar::Real(f)) => {
                for v in values {
                    *v *= *f;
                }
            }
            (Self::Double(values), Scalar::Double(f)) => {
                for v in values {
                    *v *= *f;
                }
            }
            (array, scalar) => {
                if array.element_type().is_numeric() {
                    return Err(array.scalar_mismatch(scalar));
                }
                return Err(Error::NotNumeric(array.element_type()));
            }
        }
        Ok(())
    }

    /// Add a scalar of the matching type to every element.
    pub fn shift(&mut self, delta: &Scalar) -> Result<()> {
        match (self, delta) {
            (Self::Int(values), Scalar::Int(d)) => {
                for v in values {
                    *v = v.wrapping_add(*d);
                }
            }
            (Self::Real(values), Scalar::Real(d)) => {
                for v in values {
                    *v += *d;
                }
            }
            (Self::Double(values), Scalar::Double(d)) => {
                for v in values {
                    *v += *d;
                }
            }
            (array, scalar) => {
                if array.element_type().is_numeric() {
                    return Err(array.scalar_mismatch(scalar));
                }
                return Err(Error::NotNumeric(array.element_type()));
            }
        }
        Ok(())
    }

    /// Set every element to a scalar of the matching type.
    pub fn fill(&mut self, value: Scalar) -> Result<()> {
        match (self, value) {
            (Self::Int(values), Scalar::Int(v)) => values.fill(v),
            (Self::Real(values), Scalar::Real(v)) => values.fill(v),
            (Self::Double(values), Scalar::Double(v)) => values.fill(v),
            (Self::Logical(values), Scalar::Bool(v)) => values.fill(v),
            (Self::Char(values), Scalar::Text(v)) => {
                if v.len() > ElementType::Char.width() {
                    return Err(Error::TextTooLong {
                        len: v.len(),
                        max: ElementType::Char.width(),
                    });
                }
                values.fill(v);
            }
            (Self::String { width, values }, Scalar::Text(v)) => {
                if v.len() > *width as usize {
                    return Err(Error::TextTooLong {
                        len: v.len(),
                        max: *width as usize,
                    });
                }
                values.fill(v);
            }
            (array, scalar) => return Err(array.scalar_mismatch(&scalar)),
        }
        Ok(())
    }

    /// Borrow the elements of an Int array.
    pub fn ints(&self) -> Option<&[i32]> {
        match self {
            Self::Int(values) => Some(values),
            _ => None,
        }
    }

    /// Mutably borrow the elements of an Int array.
    pub fn ints_mut(&mut self) -> Option<&mut [i32]> {
        match self {
            Self::Int(values) => Some(values),
            _ => None,
        }
    }

    /// Borrow the elements of a Real array.
    pub fn reals(&self) -> Option<&[f32]> {
        match self {
            Self::Real(values) => Some(values),
            _ => None,
        }
    }

    /// Mutably borrow the elements of a Real array.
    pub fn reals_mut(&mut self) -> Option<&mut [f32]> {
        match self {
            Self::Real(values) => Some(values),
            _ => None,
        }
    }

    /// Borrow the elements of a Double array.
    pub fn doubles(&self) -> Option<&[f64]> {
        match self {
            Self::Double(values) => Some(values),
            _ => None,
        }
    }

    /// Mutably borrow the elements of a Double array.
    pub fn doubles_mut(&mut self) -> Option<&mut [f64]> {
        match self {
            Self::Double(values) => Some(values),
            _ => None,
        }
    }

    /// Borrow the elements of a Logical array.
    pub fn bools(&self) -> Option<&[bool]> {
        match self {
            Self::Logical(values) => Some(values),
            _ => None,
        }
    }

    /// Mutably borrow the elements of a Logical array.
    pub fn bools_mut(&mut self) -> Option<&mut [bool]> {
        match self {
            Self::Logical(values) => Some(values),
            _ => None,
        }
    }

    /// Borrow the elements of a Char or fixed-string array.
    pub fn text(&self) -> Option<&[String]> {
        match self {
            Self::Char(values) | Self::String { values, .. } => Some(values),
            _ => None,
        }
    }

    /// Mutably borrow the elements of a Char or fixed-string array.
    ///
    /// Elements longer than the on-disk width are rejected at encode time.
    pub fn text_mut(&mut self) -> Option<&mut [String]> {
        match self {
            Self::Char(values) | Self::String { values, .. } => Some(values),
            _ => None,
        }
    }
}

fn trim_block(chunk: &[u8]) -> String {
    let end = chunk.iter().rposition(|b| *b != b' ').map_or(0, |i| i + 1);
    String::from_utf8_lossy(&chunk[..end]).into_owned()
}

fn push_text(buf: &mut Vec<u8>, value: &str, width: usize) -> Result<()> {
    if value.len() > width {
        return Err(Error::TextTooLong {
            len: value.len(),
            max: width,
        });
    }
    buf.extend_from_slice(value.as_bytes());
    buf.resize(buf.len() + (width - value.len()), b' ');
    Ok(())
}
