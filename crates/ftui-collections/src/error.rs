#![forbid(unsafe_code)]

//! Error type shared by every container in the collections and observable
//! crates.

/// Result alias for container operations.
pub type Result<T> = std::result::Result<T, CollectionError>;

/// Errors from container operations.
///
/// All variants describe a contract violation or a rejected mutation. The
/// container that produced the error is left in the state documented by the
/// failing operation (unchanged, unless stated otherwise).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionError {
    /// An argument could not be interpreted (e.g. range arithmetic overflow).
    InvalidArgument(&'static str),
    /// An index was outside the valid bounds.
    OutOfRange { index: usize, len: usize },
    /// A range starting inside the container ran past its end.
    RangeExceedsSize {
        index: usize,
        count: usize,
        len: usize,
    },
    /// The key is already present.
    DuplicateKey,
    /// The key is not present.
    KeyNotFound,
    /// The item is not present.
    ItemNotFound,
    /// The source refused to remove the item.
    ItemNotRemovable,
    /// The source refused to accept the item.
    ItemNotAddable,
    /// A listener tried to mutate while a change was still being delivered
    /// to several listeners.
    ReentrancyNotAllowed,
    /// A reset section is already open on this notifier.
    ConcurrentResetNotAllowed,
    /// The container does not support this mutation (read-only view).
    UnsupportedOperation(&'static str),
    /// Keyed index and positional order disagree.
    Inconsistent(&'static str),
}

impl std::fmt::Display for CollectionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(what) => write!(f, "invalid argument: {what}"),
            Self::OutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::RangeExceedsSize { index, count, len } => write!(
                f,
                "range of {count} items at index {index} exceeds length {len}"
            ),
            Self::DuplicateKey => f.write_str("an item with the same key is already present"),
            Self::KeyNotFound => f.write_str("key not found"),
            Self::ItemNotFound => f.write_str("item not found"),
            Self::ItemNotRemovable => f.write_str("item could not be removed from the source"),
            Self::ItemNotAddable => f.write_str("item could not be added to the source"),
            Self::ReentrancyNotAllowed => {
                f.write_str("reentrant mutation during change notification")
            }
            Self::ConcurrentResetNotAllowed => f.write_str("a reset section is already open"),
            Self::UnsupportedOperation(op) => write!(f, "unsupported operation: {op}"),
            Self::Inconsistent(detail) => write!(f, "internal inconsistency: {detail}"),
        }
    }
}

impl std::error::Error for CollectionError {}

/// Fail with [`CollectionError::OutOfRange`] unless `index < len`.
#[inline]
pub(crate) fn check_index(index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(CollectionError::OutOfRange { index, len })
    }
}

/// Fail with [`CollectionError::OutOfRange`] unless `index <= len`.
#[inline]
pub(crate) fn check_insert_index(index: usize, len: usize) -> Result<()> {
    if index <= len {
        Ok(())
    } else {
        Err(CollectionError::OutOfRange { index, len })
    }
}
