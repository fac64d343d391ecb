//! Error types for container views and indexing

use std::path::PathBuf;

use thiserror::Error;

/// Result type for container view operations
pub type Result<T> = std::result::Result<T, Error>;

/// Container view error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record or keyword codec error
    #[error("codec error: {0}")]
    Codec(#[from] reskw::Error),

    /// No keyword with this name and occurrence exists in the container
    #[error("keyword {name} occurrence {occurrence} not found")]
    KeywordNotFound { name: String, occurrence: usize },

    /// Linear position is past the end of the index
    #[error("position {position} is out of range for a container of {len} keywords")]
    PositionOutOfRange { position: usize, len: usize },

    /// The container shrank or disappeared after the index was built
    #[error("backing container {0} shrank or disappeared after the index was built")]
    BackingStoreGone(PathBuf),

    /// A keyword's shape no longer matches its index entry, so an in-place
    /// save would corrupt the following record
    #[error("keyword {name} changed shape since the index was built: {on_disk} on disk, {in_memory} in memory")]
    SizeChanged {
        name: String,
        on_disk: String,
        in_memory: String,
    },

    /// Save on a view that was not opened writable
    #[error("view is not writable")]
    ReadOnly,

    /// Save on a keyword that was never materialized
    #[error("keyword {name} occurrence {occurrence} is not resident, nothing to save")]
    NotResident { name: String, occurrence: usize },

    /// The requested open options contradict each other
    #[error("invalid view options: {0}")]
    InvalidOptions(&'static str),
}
