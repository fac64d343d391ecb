//! Physical record framing and endian-aware primitives
//!
//! Every physical unit in a container is a length-framed record: a 4-byte
//! payload length, the payload bytes, and the same length repeated. Both
//! markers describe the payload length in bytes, and a disagreement between
//! them means the container is corrupt.

use std::io::{Read, Write};

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};
use crate::types::ElementType;

/// Byte order for every multi-byte value in a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endianness {
    /// Network byte order, the common on-disk layout
    #[default]
    Big,
    /// Containers produced by non-converting little-endian writers
    Little,
}

/// Maximum elements per physical record for numeric and logical data
pub const NUMERIC_BLOCK_LEN: usize = 1000;

/// Maximum elements per physical record for character data
pub const CHAR_BLOCK_LEN: usize = 105;

/// Framing overhead per record: leading plus trailing marker
pub const RECORD_OVERHEAD: u64 = 8;

pub(crate) fn write_u32<W: Write>(w: &mut W, endian: Endianness, value: u32) -> std::io::Result<()> {
    match endian {
        Endianness::Big => w.write_u32::<BigEndian>(value),
        Endianness::Little => w.write_u32::<LittleEndian>(value),
    }
}

pub(crate) fn read_i32<R: Read>(r: &mut R, endian: Endianness) -> std::io::Result<i32> {
    match endian {
        Endianness::Big => r.read_i32::<BigEndian>(),
        Endianness::Little => r.read_i32::<LittleEndian>(),
    }
}

pub(crate) fn write_i32<W: Write>(w: &mut W, endian: Endianness, value: i32) -> std::io::Result<()> {
    match endian {
        Endianness::Big => w.write_i32::<BigEndian>(value),
        Endianness::Little => w.write_i32::<LittleEndian>(value),
    }
}

pub(crate) fn read_f32<R: Read>(r: &mut R, endian: Endianness) -> std::io::Result<f32> {
    match endian {
        Endianness::Big => r.read_f32::<BigEndian>(),
        Endianness::Little => r.read_f32::<LittleEndian>(),
    }
}

pub(crate) fn write_f32<W: Write>(w: &mut W, endian: Endianness, value: f32) -> std::io::Result<()> {
    match endian {
        Endianness::Big => w.write_f32::<BigEndian>(value),
        Endianness::Little => w.write_f32::<LittleEndian>(value),
    }
}

pub(crate) fn read_f64<R: Read>(r: &mut R, endian: Endianness) -> std::io::Result<f64> {
    match endian {
        Endianness::Big => r.read_f64::<BigEndian>(),
        Endianness::Little => r.read_f64::<LittleEndian>(),
    }
}

pub(crate) fn write_f64<W: Write>(w: &mut W, endian: Endianness, value: f64) -> std::io::Result<()> {
    match endian {
        Endianness::Big => w.write_f64::<BigEndian>(value),
        Endianness::Little => w.write_f64::<LittleEndian>(value),
    }
}

/// Read into `buf`, reporting exactly how far the stream got on a short read.
fn read_exact_counted<R: Read>(r: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = r.read(&mut buf[filled..])?;
        if n == 0 {
            return Err(Error::TruncatedRecord {
                expected: buf.len() as u64,
                actual: filled as u64,
            });
        }
        filled += n;
    }
    Ok(())
}

/// Write one framed record.
pub fn write_record<W: Write>(w: &mut W, endian: Endianness, payload: &[u8]) -> Result<()> {
    let len = u32::try_from(payload.len()).map_err(|_| {
        Error::CorruptRecord(format!(
            "record payload of {} bytes exceeds the 32-bit length marker",
            payload.len()
        ))
    })?;
    write_u32(w, endian, len)?;
    w.write_all(payload)?;
    write_u32(w, endian, len)?;
    Ok(())
}

/// Read the leading length marker of the next record.
///
/// Returns `None` at a clean end of stream; callers treat that as the
/// end-of-container signal. A partial marker is a truncation error.
pub fn read_record_marker<R: Read>(r: &mut R, endian: Endianness) -> Result<Option<u32>> {
    let mut buf = [0u8; 4];
    let mut filled = 0;
    while filled < buf.len() {
        let n = r.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    match filled {
        0 => Ok(None),
        4 => Ok(Some(match endian {
            Endianness::Big => u32::from_be_bytes(buf),
            Endianness::Little => u32::from_le_bytes(buf),
        })),
        partial => Err(Error::TruncatedRecord {
            expected: 4,
            actual: partial as u64,
        }),
    }
}

/// Read a record body of `len` bytes and validate the trailing marker.
pub fn read_record_body<R: Read>(r: &mut R, endian: Endianness, len: u32) -> Result<Vec<u8>> {
    let mut payload = vec![0u8; len as usize];
    read_exact_counted(r, &mut payload)?;
    let mut tail_buf = [0u8; 4];
    read_exact_counted(r, &mut tail_buf)?;
    let tail = match endian {
        Endianness::Big => u32::from_be_bytes(tail_buf),
        Endianness::Little => u32::from_le_bytes(tail_buf),
    };
    if tail != len {
        return Err(Error::CorruptRecord(format!(
            "length markers disagree: {len} leading, {tail} trailing"
        )));
    }
    Ok(payload)
}

/// Total on-disk byte length of a keyword's data region.
///
/// Payload bytes plus the framing overhead of every record the deterministic
/// split policy produces for `(element_type, count)`.
pub fn framed_data_len(element_type: ElementType, count: usize) -> u64 {
    let width = element_type.width();
    if count == 0 || width == 0 {
        return 0;
    }
    let records = count.div_ceil(element_type.block_len()) as u64;
    count as u64 * width as u64 + records * RECORD_OVERHEAD
}
