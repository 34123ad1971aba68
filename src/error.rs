/// Errors returned by column operations.
///
/// Every error leaves the column it was raised on unmodified.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColumnError {
    /// A requested range reaches past the end of the addressed buffer.
    #[error("parameters start = {start}, length = {length} are out of bound (size = {size})")]
    OutOfBounds {
        start: usize,
        length: usize,
        size: usize,
    },

    /// An auxiliary array does not have the length the column requires.
    #[error("size of {what} doesn't match: expected {expected}, got {actual}")]
    SizeMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A type-erased argument holds a different element type.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// The requested row count cannot be allocated on this target.
    #[error("cannot allocate {rows} rows")]
    CapacityOverflow { rows: u64 },
}

pub type Result<T> = std::result::Result<T, ColumnError>;
