//! Keyword encoding and decoding
//!
//! A keyword on disk is one fixed-size header record followed by zero or
//! more data records of the declared element type. The header carries the
//! 8-byte space-padded name, a 4-byte element count and a 4-byte type tag;
//! the data records together carry exactly `count` elements.

use std::io::{Read, Write};

use tracing::trace;

use crate::data::{Scalar, TypedArray};
use crate::error::{Error, Result};
use crate::record::{self, Endianness};
use crate::types::{ElementType, KeywordName, MAX_STRING_WIDTH, NAME_LEN, TYPE_TAG_LEN};

/// Byte length of a keyword header payload: name, count and type tag
pub const HEADER_PAYLOAD_LEN: u32 = (NAME_LEN + 4 + TYPE_TAG_LEN) as u32;

/// Everything known about a keyword before touching its data records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordHeader {
    pub name: KeywordName,
    pub element_type: ElementType,
    pub count: usize,
}

impl KeywordHeader {
    /// Read the next header record.
    ///
    /// Returns `None` at a clean end of the container.
    pub fn read<R: Read>(r: &mut R, endian: Endianness) -> Result<Option<Self>> {
        let Some(len) = record::read_record_marker(r, endian)? else {
            return Ok(None);
        };
        if len != HEADER_PAYLOAD_LEN {
            return Err(Error::CorruptRecord(format!(
                "keyword header record of {len} bytes, expected {HEADER_PAYLOAD_LEN}"
            )));
        }
        let payload = record::read_record_body(r, endian, len)?;

        let mut name_field = [0u8; NAME_LEN];
        name_field.copy_from_slice(&payload[..NAME_LEN]);
        let name = KeywordName::from_bytes(name_field)
            .map_err(|e| Error::CorruptRecord(e.to_string()))?;

        let mut count_field = [0u8; 4];
        count_field.copy_from_slice(&payload[NAME_LEN..NAME_LEN + 4]);
        let raw_count = match endian {
            Endianness::Big => i32::from_be_bytes(count_field),
            Endianness::Little => i32::from_le_bytes(count_field),
        };
        if raw_count < 0 {
            return Err(Error::CorruptRecord(format!(
                "negative element count {raw_count} for keyword {name}"
            )));
        }

        let mut tag = [0u8; TYPE_TAG_LEN];
        tag.copy_from_slice(&payload[NAME_LEN + 4..]);
        let element_type = ElementType::from_tag(tag)?;

        Ok(Some(Self {
            name,
            element_type,
            count: raw_count as usize,
        }))
    }

    /// Encode this header as one framed record.
    pub fn write<W: Write>(&self, w: &mut W, endian: Endianness) -> Result<()> {
        if let ElementType::String(width) = self.element_type {
            if width == 0 || width > MAX_STRING_WIDTH {
                return Err(Error::CorruptRecord(format!(
                    "fixed-string width {width} is outside 1..={MAX_STRING_WIDTH}"
                )));
            }
        }
        let count = i32::try_from(self.count).map_err(|_| {
            Error::CorruptRecord(format!(
                "element count {} exceeds the 32-bit header field",
                self.count
            ))
        })?;

        let mut payload = Vec::with_capacity(HEADER_PAYLOAD_LEN as usize);
        payload.extend_from_slice(self.name.as_bytes());
        match endian {
            Endianness::Big => payload.extend_from_slice(&count.to_be_bytes()),
            Endianness::Little => payload.extend_from_slice(&count.to_le_bytes()),
        }
        payload.extend_from_slice(&self.element_type.tag());
        record::write_record(w, endian, &payload)
    }

    /// On-disk byte length of the data region that follows this header.
    pub fn data_len(&self) -> u64 {
        record::framed_data_len(self.element_type, self.count)
    }
}

/// A named, typed array value.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyword {
    name: KeywordName,
    data: TypedArray,
}

impl Keyword {
    /// Build a keyword from a name string and an array.
    pub fn new(name: &str, data: TypedArray) -> Result<Self> {
        Ok(Self {
            name: KeywordName::new(name)?,
            data,
        })
    }

    /// Build a keyword from already-validated parts.
    pub fn from_parts(name: KeywordName, data: TypedArray) -> Self {
        Self { name, data }
    }

    pub fn name(&self) -> &KeywordName {
        &self.name
    }

    pub fn element_type(&self) -> ElementType {
        self.data.element_type()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &TypedArray {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut TypedArray {
        &mut self.data
    }

    /// Replace the array wholesale, e.g. to restage a keyword for writing.
    pub fn set_data(&mut self, data: TypedArray) {
        self.data = data;
    }

    /// The header this keyword would carry on disk.
    pub fn header(&self) -> KeywordHeader {
        KeywordHeader {
            name: self.name,
            element_type: self.data.element_type(),
            count: self.data.len(),
        }
    }

    /// Read one complete keyword.
    ///
    /// Returns `None` at a clean end of the container.
    pub fn read<R: Read>(r: &mut R, endian: Endianness) -> Result<Option<Self>> {
        let Some(header) = KeywordHeader::read(r, endian)? else {
            return Ok(None);
        };
        let data = Self::read_data(r, endian, &header)?;
        Ok(Some(Self {
            name: header.name,
            data,
        }))
    }

    /// Read only the data records for a known header.
    ///
    /// Consecutive record bodies are concatenated until the declared element
    /// count is satisfied; the reader makes no assumption about how the
    /// writer split them.
    pub fn read_data<R: Read>(
        r: &mut R,
        endian: Endianness,
        header: &KeywordHeader,
    ) -> Result<TypedArray> {
        let element_type = header.element_type;
        let mut data = TypedArray::with_capacity(element_type, header.count);
        let width = element_type.width();
        if header.count == 0 || width == 0 {
            return Ok(data);
        }

        let mut remaining = header.count;
        while remaining > 0 {
            let Some(len) = record::read_record_marker(r, endian)? else {
                return Err(Error::TruncatedRecord {
                    expected: (remaining * width) as u64,
                    actual: 0,
                });
            };
            let payload = record::read_record_body(r, endian, len)?;
            let appended = data.decode_block(&payload, endian)?;
            if appended > remaining {
                return Err(Error::CorruptRecord(format!(
                    "keyword {} carries more elements than its declared count {}",
                    header.name, header.count
                )));
            }
            remaining -= appended;
            trace!(
                "read data record for {}: {} elements, {} remaining",
                header.name, appended, remaining
            );
        }
        Ok(data)
    }

    /// Write the header record followed by the data records.
    pub fn write<W: Write>(&self, w: &mut W, endian: Endianness) -> Result<()> {
        self.header().write(w, endian)?;
        self.write_data(w, endian)
    }

    /// Write only the data records, using the deterministic split policy:
    /// every record holds `block_len` elements except the final partial one.
    pub fn write_data<W: Write>(&self, w: &mut W, endian: Endianness) -> Result<()> {
        let element_type = self.data.element_type();
        if self.data.is_empty() || element_type.width() == 0 {
            return Ok(());
        }
        let block = element_type.block_len();
        let mut start = 0;
        while start < self.data.len() {
            let end = (start + block).min(self.data.len());
            let payload = self.data.encode_range(start, end, endian)?;
            record::write_record(w, endian, &payload)?;
            start = end;
        }
        Ok(())
    }

    /// Elementwise addition with another keyword of identical shape.
    pub fn add(&mut self, other: &Self) -> Result<()> {
        self.data.add(&other.data)
    }

    /// Elementwise subtraction.
    pub fn sub(&mut self, other: &Self) -> Result<()> {
        self.data.sub(&other.data)
    }

    /// Elementwise multiplication.
    pub fn mul(&mut self, other: &Self) -> Result<()> {
        self.data.mul(&other.data)
    }

    /// Elementwise division; zero divisors are rejected.
    pub fn div(&mut self, other: &Self) -> Result<()> {
        self.data.div(&other.data)
    }

    /// Replace every element with its reciprocal.
    pub fn invert(&mut self) -> Result<()> {
        self.data.invert()
    }

    /// Multiply every element by a matching-type scalar.
    pub fn scale(&mut self, factor: &Scalar) -> Result<()> {
        self.data.scale(factor)
    }

    /// Add a matching-type scalar to every element.
    pub fn shift(&mut self, delta: &Scalar) -> Result<()> {
        self.data.shift(delta)
    }

    /// Set every element to a matching-type scalar.
    pub fn fill(&mut self, value: Scalar) -> Result<()> {
        self.data.fill(value)
    }
}
