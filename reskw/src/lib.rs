//! Record framing and keyword codec for reservoir-simulation binary containers
//!
//! A container is a flat sequence of **keywords**: named, typed arrays
//! persisted as one fixed-size header record followed by zero or more data
//! records. Every record is framed by a pair of equal byte-length markers,
//! and every multi-byte value is stored in the container's configured byte
//! order.
//!
//! This crate is the codec only. Indexing, lazy loading and in-place editing
//! of whole containers live in the `resfile` crate built on top of it.

pub mod data;
pub mod error;
pub mod keyword;
pub mod record;
pub mod types;

pub use data::{Scalar, TypedArray};
pub use error::{Error, Result};
pub use keyword::{Keyword, KeywordHeader};
pub use record::Endianness;
pub use types::{ElementType, KeywordName};
