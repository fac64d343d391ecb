//! Error types for record and keyword codec operations

use thiserror::Error;

use crate::types::ElementType;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Codec error types
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record framing or header content is inconsistent
    #[error("corrupt record: {0}")]
    CorruptRecord(String),

    /// The stream ended in the middle of a record
    #[error("truncated record: expected {expected} bytes, got {actual}")]
    TruncatedRecord { expected: u64, actual: u64 },

    /// Keyword name is empty, too long, or not printable ASCII
    #[error("invalid keyword name {0:?}")]
    InvalidName(String),

    /// Elementwise operands disagree in type or element count
    #[error("shape mismatch: {left_type}[{left_len}] vs {right_type}[{right_len}]")]
    ShapeMismatch {
        left_type: ElementType,
        left_len: usize,
        right_type: ElementType,
        right_len: usize,
    },

    /// A zero divisor in `div` or `invert`
    #[error("divide by zero at element {0}")]
    DivideByZero(usize),

    /// Numeric operation applied to a non-numeric array
    #[error("operation requires a numeric array, got {0}")]
    NotNumeric(ElementType),

    /// A text element does not fit its fixed on-disk width
    #[error("text element of {len} bytes exceeds the {max}-byte element width")]
    TextTooLong { len: usize, max: usize },
}
