//! Lazy keyword views over a container file
//!
//! A view owns the scanned index and materializes keywords on first access.
//! Resident keywords live in an LRU map keyed by linear position; pinned
//! slots (see [`crate::transaction`]) are never eviction candidates, so a
//! bounded view can temporarily exceed its budget while transactions hold
//! pins.

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, ErrorKind, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, trace};

use reskw::{Endianness, Keyword};

use crate::error::{Error, Result};
use crate::index::{sidecar, ContainerIndex, IndexEntry};
use crate::transaction::Transaction;

/// Shared handle to a materialized keyword.
pub type KeywordRef = Arc<RwLock<Keyword>>;

/// Options controlling how a container is opened.
#[derive(Debug, Clone)]
pub struct ViewOptions {
    /// Permit in-place keyword saves
    pub writable: bool,
    /// Drop the stream handle after the index scan and reopen per load,
    /// trading load latency for descriptor usage when many views are open
    pub close_stream: bool,
    /// Maximum resident keywords; `None` is unbounded
    pub cache_limit: Option<usize>,
    /// Persist and reuse a side-car index next to the container
    pub sidecar_index: bool,
    /// Byte order of the container
    pub endian: Endianness,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            writable: false,
            close_stream: false,
            cache_limit: None,
            sidecar_index: false,
            endian: Endianness::Big,
        }
    }
}

struct Slot {
    keyword: KeywordRef,
    pins: usize,
}

/// A lazy view over one container file.
pub struct FileView {
    path: PathBuf,
    options: ViewOptions,
    index: Arc<ContainerIndex>,
    /// `None` in close-stream mode; the file is reopened per load
    stream: Mutex<Option<File>>,
    slots: Mutex<LruCache<usize, Slot>>,
}

impl FileView {
    /// Open a container, building or reusing its index.
    ///
    /// No keyword data is read here; payloads load lazily on first access.
    pub fn open<P: AsRef<Path>>(path: P, options: ViewOptions) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if options.writable && options.close_stream {
            return Err(Error::InvalidOptions(
                "a writable view must keep its stream open",
            ));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(options.writable)
            .open(&path)?;

        let index = match options
            .sidecar_index
            .then(|| sidecar::load(&path, options.endian))
            .flatten()
        {
            Some(index) => index,
            None => {
                let mut reader = BufReader::new(&file);
                let index = ContainerIndex::scan(&mut reader, options.endian)?;
                if options.sidecar_index {
                    sidecar::store(&path, &index);
                }
                index
            }
        };
        info!("opened container {:?}: {} keywords", path, index.len());

        let stream = if options.close_stream { None } else { Some(file) };
        Ok(Self {
            path,
            options,
            index: Arc::new(index),
            stream: Mutex::new(stream),
            slots: Mutex::new(LruCache::unbounded()),
        })
    }

    /// Open a read-only view that shares an already-built index.
    ///
    /// The caller vouches that the index still describes the container; a
    /// writable view must build its own so staleness is re-checked.
    pub fn open_shared<P: AsRef<Path>>(
        path: P,
        options: ViewOptions,
        index: Arc<ContainerIndex>,
    ) -> Result<Self> {
        if options.writable {
            return Err(Error::InvalidOptions(
                "a writable view must build its own index",
            ));
        }
        let path = path.as_ref().to_path_buf();
        let stream = if options.close_stream {
            None
        } else {
            Some(File::open(&path)?)
        };
        info!("opened shared-index view of {:?}", path);
        Ok(Self {
            path,
            options,
            index,
            stream: Mutex::new(stream),
            slots: Mutex::new(LruCache::unbounded()),
        })
    }

    /// The container path this view reads.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The scanned index, shareable with other read-only views.
    pub fn index(&self) -> Arc<ContainerIndex> {
        Arc::clone(&self.index)
    }

    /// All index entries in file order.
    pub fn entries(&self) -> &[IndexEntry] {
        self.index.entries()
    }

    /// The index entry at a linear position.
    pub fn entry(&self, position: usize) -> Option<&IndexEntry> {
        self.index.entry(position)
    }

    /// Whether any keyword with this name exists.
    pub fn has(&self, name: &str) -> bool {
        self.index.has(name)
    }

    /// How many keywords carry this name.
    pub fn count_named(&self, name: &str) -> usize {
        self.index.count_named(name)
    }

    /// Total number of keywords in the container.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the container holds no keywords.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of keywords currently materialized.
    pub fn resident(&self) -> usize {
        self.slots.lock().len()
    }

    /// Begin a pin/unpin transaction over this view.
    pub fn begin(&self) -> Transaction<'_> {
        Transaction::new(self)
    }

    pub(crate) fn position_of(&self, name: &str, occurrence: usize) -> Result<usize> {
        self.index
            .lookup(name, occurrence)
            .ok_or_else(|| Error::KeywordNotFound {
                name: name.to_string(),
                occurrence,
            })
    }

    /// Fetch a keyword by name and occurrence, loading it on first access.
    pub fn get(&self, name: &str, occurrence: usize) -> Result<KeywordRef> {
        let position = self.position_of(name, occurrence)?;
        self.get_at(position)
    }

    /// Fetch a keyword by linear position, loading it on first access.
    pub fn get_at(&self, position: usize) -> Result<KeywordRef> {
        self.materialize(position, false)
    }

    /// Fetch and pin in one step; the pin survives until [`Self::unpin`].
    pub(crate) fn pin_at(&self, position: usize) -> Result<KeywordRef> {
        self.materialize(position, true)
    }

    /// Drop one pin from a slot and re-apply the residency budget.
    pub(crate) fn unpin(&self, position: usize) {
        let mut slots = self.slots.lock();
        if let Some(slot) = slots.peek_mut(&position) {
            slot.pins = slot.pins.saturating_sub(1);
        }
        self.enforce_budget(&mut slots);
    }

    fn materialize(&self, position: usize, pin: bool) -> Result<KeywordRef> {
        let entry = *self
            .index
            .entry(position)
            .ok_or(Error::PositionOutOfRange {
                position,
                len: self.index.len(),
            })?;

        let mut slots = self.slots.lock();
        if let Some(slot) = slots.get_mut(&position) {
            trace!("cache hit for {} at position {}", entry.name, position);
            if pin {
                slot.pins += 1;
            }
            return Ok(Arc::clone(&slot.keyword));
        }

        let keyword = Arc::new(RwLock::new(self.load(&entry)?));
        debug!(
            "materialized {} ({} x {}) at position {}",
            entry.name, entry.element_type, entry.count, position
        );
        slots.put(
            position,
            Slot {
                keyword: Arc::clone(&keyword),
                pins: usize::from(pin),
            },
        );
        self.enforce_budget(&mut slots);
        Ok(keyword)
    }

    fn load(&self, entry: &IndexEntry) -> Result<Keyword> {
        let header = entry.header();
        self.with_stream(|file| {
            let mut reader = BufReader::new(&*file);
            reader.seek(SeekFrom::Start(entry.data_offset))?;
            let data =
                Keyword::read_data(&mut reader, self.options.endian, &header).map_err(|e| {
                    match e {
                        reskw::Error::TruncatedRecord { .. } => {
                            Error::BackingStoreGone(self.path.clone())
                        }
                        other => Error::Codec(other),
                    }
                })?;
            Ok(Keyword::from_parts(entry.name, data))
        })
    }

    fn with_stream<T>(&self, f: impl FnOnce(&mut File) -> Result<T>) -> Result<T> {
        let mut guard = self.stream.lock();
        match guard.as_mut() {
            Some(file) => f(file),
            None => {
                let mut file = File::open(&self.path).map_err(|e| {
                    if e.kind() == ErrorKind::NotFound {
                        Error::BackingStoreGone(self.path.clone())
                    } else {
                        Error::Io(e)
                    }
                })?;
                trace!("transient reopen of {:?}", self.path);
                f(&mut file)
            }
        }
    }

    /// Evict least-recently-used unpinned slots until the budget holds.
    fn enforce_budget(&self, slots: &mut LruCache<usize, Slot>) {
        let Some(limit) = self.options.cache_limit else {
            return;
        };
        while slots.len() > limit {
            // Iteration runs most- to least-recently-used, so the last
            // unpinned slot is the LRU candidate.
            let victim = slots
                .iter()
                .filter(|(_, slot)| slot.pins == 0)
                .map(|(position, _)| *position)
                .last();
            match victim {
                Some(position) => {
                    slots.pop(&position);
                    trace!("evicted keyword at position {}", position);
                }
                None => break,
            }
        }
    }

    /// Write a resident keyword's data records back over its on-disk region.
    ///
    /// The keyword must still match its index entry in type and count; the
    /// deterministic split policy then reproduces the original byte span
    /// exactly, so neighboring records are untouched. The cached copy stays
    /// authoritative and nothing is re-read.
    pub fn save(&self, name: &str, occurrence: usize) -> Result<()> {
        let position = self.position_of(name, occurrence)?;
        self.save_at(position)
    }

    /// [`Self::save`] by linear position.
    pub fn save_at(&self, position: usize) -> Result<()> {
        if !self.options.writable {
            return Err(Error::ReadOnly);
        }
        let entry = *self
            .index
            .entry(position)
            .ok_or(Error::PositionOutOfRange {
                position,
                len: self.index.len(),
            })?;

        let keyword = {
            let slots = self.slots.lock();
            match slots.peek(&position) {
                Some(slot) => Arc::clone(&slot.keyword),
                None => {
                    return Err(Error::NotResident {
                        name: entry.name.as_str().to_string(),
                        occurrence: entry.occurrence,
                    });
                }
            }
        };

        let kw = keyword.read();
        if kw.element_type() != entry.element_type || kw.len() != entry.count {
            return Err(Error::SizeChanged {
                name: entry.name.as_str().to_string(),
                on_disk: format!("{}[{}]", entry.element_type, entry.count),
                in_memory: format!("{}[{}]", kw.element_type(), kw.len()),
            });
        }

        self.with_stream(|file| {
            file.seek(SeekFrom::Start(entry.data_offset))?;
            let mut writer = BufWriter::new(&*file);
            kw.write_data(&mut writer, self.options.endian)?;
            writer.flush()?;
            Ok(())
        })?;
        debug!(
            "saved {} ({} elements) at offset {}",
            entry.name, entry.count, entry.data_offset
        );
        Ok(())
    }
}

impl std::fmt::Debug for FileView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileView")
            .field("path", &self.path)
            .field("keywords", &self.index.len())
            .field("resident", &self.resident())
            .finish()
    }
}
