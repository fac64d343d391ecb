//! Lazy, transactional file views over keyword containers
//!
//! Opening a container builds (or reuses) a lightweight index of every
//! keyword occurrence without reading any array payloads. Keywords are
//! materialized lazily on first access, held in a bounded LRU cache, and
//! protected from eviction by pin/unpin transactions while callers hold
//! them. Writable views can rewrite a keyword's data region in place.

pub mod error;
pub mod index;
pub mod transaction;
pub mod view;

pub use error::{Error, Result};
pub use index::{ContainerIndex, IndexEntry};
pub use transaction::Transaction;
pub use view::{FileView, KeywordRef, ViewOptions};
