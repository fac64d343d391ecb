//! Single-pass container indexing
//!
//! One forward scan records, for every keyword occurrence, its name, type,
//! element count and byte offsets without decoding any array payload. The
//! index is immutable after the scan and can be shared across read-only
//! views of the same container.

pub(crate) mod sidecar;

use std::collections::HashMap;
use std::io::{Read, Seek, SeekFrom};

use tracing::debug;

use reskw::{Endianness, ElementType, KeywordHeader, KeywordName};

use crate::error::{Error, Result};

/// One keyword occurrence located during the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    /// The 8-byte keyword name
    pub name: KeywordName,
    /// Declared element type
    pub element_type: ElementType,
    /// Declared element count
    pub count: usize,
    /// Byte offset of the header record's leading marker
    pub header_offset: u64,
    /// Byte offset of the first data record (or of the next header for
    /// keywords without data)
    pub data_offset: u64,
    /// 0-based rank among same-named keywords, in file order
    pub occurrence: usize,
}

impl IndexEntry {
    /// The keyword header this entry was built from.
    pub fn header(&self) -> KeywordHeader {
        KeywordHeader {
            name: self.name,
            element_type: self.element_type,
            count: self.count,
        }
    }
}

/// The scanned index of one container.
#[derive(Debug)]
pub struct ContainerIndex {
    entries: Vec<IndexEntry>,
    by_name: HashMap<String, Vec<usize>>,
    endian: Endianness,
}

impl ContainerIndex {
    /// Scan a container stream from the start.
    ///
    /// Reads every header record and seeks over the data records using the
    /// byte length implied by `(type, count)`; no payload is decoded. A
    /// data region that runs past the end of the stream fails the scan.
    pub fn scan<R: Read + Seek>(r: &mut R, endian: Endianness) -> Result<Self> {
        let stream_len = r.seek(SeekFrom::End(0))?;
        r.seek(SeekFrom::Start(0))?;

        let mut entries: Vec<IndexEntry> = Vec::new();
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        let mut offset = 0u64;

        loop {
            let header_offset = offset;
            let Some(header) = KeywordHeader::read(r, endian)? else {
                break;
            };
            let data_offset = header_offset + reskw::record::RECORD_OVERHEAD
                + u64::from(reskw::keyword::HEADER_PAYLOAD_LEN);
            let data_len = header.data_len();

            let end = data_offset + data_len;
            if end > stream_len {
                return Err(Error::Codec(reskw::Error::TruncatedRecord {
                    expected: data_len,
                    actual: stream_len.saturating_sub(data_offset),
                }));
            }
            r.seek(SeekFrom::Start(end))?;
            offset = end;

            let positions = by_name.entry(header.name.as_str().to_string()).or_default();
            let occurrence = positions.len();
            positions.push(entries.len());
            entries.push(IndexEntry {
                name: header.name,
                element_type: header.element_type,
                count: header.count,
                header_offset,
                data_offset,
                occurrence,
            });
        }

        debug!("indexed {} keywords", entries.len());
        Ok(Self {
            entries,
            by_name,
            endian,
        })
    }

    /// Rebuild an index from persisted entries; used by the side-car loader.
    pub(crate) fn from_entries(entries: Vec<IndexEntry>, endian: Endianness) -> Self {
        let mut by_name: HashMap<String, Vec<usize>> = HashMap::new();
        for (position, entry) in entries.iter().enumerate() {
            by_name
                .entry(entry.name.as_str().to_string())
                .or_default()
                .push(position);
        }
        Self {
            entries,
            by_name,
            endian,
        }
    }

    /// Byte order the container was scanned with.
    pub fn endian(&self) -> Endianness {
        self.endian
    }

    /// All entries in file order.
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// The entry at a linear position.
    pub fn entry(&self, position: usize) -> Option<&IndexEntry> {
        self.entries.get(position)
    }

    /// Linear position of `(name, occurrence)`.
    pub fn lookup(&self, name: &str, occurrence: usize) -> Option<usize> {
        self.by_name
            .get(name)
            .and_then(|positions| positions.get(occurrence))
            .copied()
    }

    /// Whether any keyword with this name exists.
    pub fn has(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// How many keywords carry this name.
    pub fn count_named(&self, name: &str) -> usize {
        self.by_name.get(name).map_or(0, Vec::len)
    }

    /// Total number of keywords in the container.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the container holds no keywords.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
