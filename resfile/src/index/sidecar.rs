//! Side-car persistence of a scanned container index
//!
//! The index of a large container is worth keeping: a side-car JSON file is
//! written next to the container and reused on the next open, but only when
//! the container's path, byte size and modification time all still match.
//! Any mismatch, missing file or parse problem falls back to a fresh scan;
//! a failed side-car write is logged and ignored.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use reskw::types::TYPE_TAG_LEN;
use reskw::{ElementType, Endianness, KeywordName};

use super::{ContainerIndex, IndexEntry};

/// Extension appended to the container path
const SIDECAR_SUFFIX: &str = ".kwidx";

#[derive(Debug, Serialize, Deserialize)]
struct SidecarDoc {
    path: String,
    size: u64,
    mtime_secs: u64,
    mtime_nanos: u32,
    endian: String,
    entries: Vec<SidecarEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SidecarEntry {
    name: String,
    tag: String,
    count: usize,
    header_offset: u64,
    data_offset: u64,
    occurrence: usize,
}

/// Where the side-car for a container lives.
pub(crate) fn sidecar_path(container: &Path) -> PathBuf {
    let mut os = container.as_os_str().to_os_string();
    os.push(SIDECAR_SUFFIX);
    PathBuf::from(os)
}

fn container_identity(container: &Path) -> Option<(u64, u64, u32)> {
    let meta = fs::metadata(container).ok()?;
    let mtime = meta.modified().ok()?.duration_since(UNIX_EPOCH).ok()?;
    Some((meta.len(), mtime.as_secs(), mtime.subsec_nanos()))
}

fn endian_label(endian: Endianness) -> &'static str {
    match endian {
        Endianness::Big => "big",
        Endianness::Little => "little",
    }
}

fn parse_endian(label: &str) -> Option<Endianness> {
    match label {
        "big" => Some(Endianness::Big),
        "little" => Some(Endianness::Little),
        _ => None,
    }
}

fn parse_entry(raw: &SidecarEntry) -> Option<IndexEntry> {
    let tag_bytes = raw.tag.as_bytes();
    if tag_bytes.len() != TYPE_TAG_LEN {
        return None;
    }
    let mut tag = [0u8; TYPE_TAG_LEN];
    tag.copy_from_slice(tag_bytes);
    Some(IndexEntry {
        name: KeywordName::new(&raw.name).ok()?,
        element_type: ElementType::from_tag(tag).ok()?,
        count: raw.count,
        header_offset: raw.header_offset,
        data_offset: raw.data_offset,
        occurrence: raw.occurrence,
    })
}

/// Load a persisted index if it exactly matches the live container.
pub(crate) fn load(container: &Path, endian: Endianness) -> Option<ContainerIndex> {
    let path = sidecar_path(container);
    let raw = fs::read_to_string(&path).ok()?;
    let doc: SidecarDoc = match serde_json::from_str(&raw) {
        Ok(doc) => doc,
        Err(e) => {
            debug!("ignoring unreadable side-car index {:?}: {}", path, e);
            return None;
        }
    };

    let (size, mtime_secs, mtime_nanos) = container_identity(container)?;
    if doc.path != container.display().to_string()
        || doc.size != size
        || doc.mtime_secs != mtime_secs
        || doc.mtime_nanos != mtime_nanos
        || parse_endian(&doc.endian) != Some(endian)
    {
        debug!("side-car index for {:?} is stale, rescanning", container);
        return None;
    }

    let mut entries = Vec::with_capacity(doc.entries.len());
    for raw_entry in &doc.entries {
        entries.push(parse_entry(raw_entry)?);
    }
    debug!(
        "reusing side-car index for {:?}: {} keywords",
        container,
        entries.len()
    );
    Some(ContainerIndex::from_entries(entries, endian))
}

/// Persist a freshly scanned index next to its container.
pub(crate) fn store(container: &Path, index: &ContainerIndex) {
    let Some((size, mtime_secs, mtime_nanos)) = container_identity(container) else {
        return;
    };
    let doc = SidecarDoc {
        path: container.display().to_string(),
        size,
        mtime_secs,
        mtime_nanos,
        endian: endian_label(index.endian()).to_string(),
        entries: index
            .entries()
            .iter()
            .map(|entry| SidecarEntry {
                name: entry.name.as_str().to_string(),
                tag: String::from_utf8_lossy(&entry.element_type.tag()).into_owned(),
                count: entry.count,
                header_offset: entry.header_offset,
                data_offset: entry.data_offset,
                occurrence: entry.occurrence,
            })
            .collect(),
    };

    let path = sidecar_path(container);
    let result = serde_json::to_string(&doc)
        .map_err(std::io::Error::other)
        .and_then(|json| fs::write(&path, json));
    match result {
        Ok(()) => debug!("wrote side-car index {:?}", path),
        Err(e) => warn!("failed to write side-car index {:?}: {}", path, e),
    }
}
