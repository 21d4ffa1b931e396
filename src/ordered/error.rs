//! Error types for [`AvlMap`](super::AvlMap).
//!
//! Two kinds of failure exist: looking up a key that is not present through
//! [`AvlMap::at`](super::AvlMap::at), and using a [`Cursor`](super::Cursor)
//! that does not denote a usable position.

use std::fmt;

/// The reason a cursor was rejected.
///
/// # Examples
///
/// ```rust
/// use avlmap::ordered::{AvlMap, IteratorFault, MapError};
///
/// let map: AvlMap<i32, &str> = AvlMap::new();
/// assert_eq!(
///     map.entry_at(map.end()),
///     Err(MapError::InvalidIterator(IteratorFault::End))
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IteratorFault {
    /// The cursor is the end position, which holds no entry.
    End,
    /// The cursor was obtained from a different map instance.
    Foreign,
    /// The node the cursor denoted has since been removed.
    Stale,
    /// Advancing would move past the end position.
    PastEnd,
    /// Retreating would move before the first entry.
    BeforeBegin,
}

impl fmt::Display for IteratorFault {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let description = match self {
            Self::End => "cursor is at the end position",
            Self::Foreign => "cursor belongs to a different map",
            Self::Stale => "cursor refers to an erased entry",
            Self::PastEnd => "cannot advance past the end position",
            Self::BeforeBegin => "cannot retreat before the first entry",
        };
        formatter.write_str(description)
    }
}

/// Errors returned by [`AvlMap`](super::AvlMap) operations.
///
/// # Examples
///
/// ```rust
/// use avlmap::ordered::{AvlMap, MapError};
///
/// let map: AvlMap<&str, i32> = AvlMap::new();
/// assert_eq!(map.at(&"missing"), Err(MapError::OutOfBound));
/// assert_eq!(format!("{}", MapError::OutOfBound), "key not found");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapError {
    /// The requested key is not present.
    OutOfBound,
    /// A cursor could not be dereferenced, moved or erased.
    InvalidIterator(IteratorFault),
}

impl fmt::Display for MapError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfBound => write!(formatter, "key not found"),
            Self::InvalidIterator(fault) => write!(formatter, "invalid iterator: {fault}"),
        }
    }
}

impl std::error::Error for MapError {}

impl From<IteratorFault> for MapError {
    fn from(fault: IteratorFault) -> Self {
        Self::InvalidIterator(fault)
    }
}
