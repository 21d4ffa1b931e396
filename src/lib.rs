//! # avlmap
//!
//! An ordered map for Rust built on a parent-linked AVL tree, with cursors
//! that stay valid across unrelated insertions and erasures.
//!
//! ## Overview
//!
//! - **`AvlMap`**: a mutable ordered map with O(log N) insert, lookup and
//!   erase, keyed by a pluggable [`Comparator`](ordered::Comparator)
//! - **Cursors**: copyable positions that move in both directions and report
//!   misuse (end position, foreign map, erased entry) as errors
//! - **Iterators**: double-ended, exact-size iteration in key order
//!
//! ## Feature Flags
//!
//! - `tracing`: emit `trace`-level events for rotations, successor relinks
//!   and clears under the `avlmap` target
//!
//! ## Example
//!
//! ```rust
//! use avlmap::prelude::*;
//!
//! let mut map = AvlMap::new();
//! map.insert(2, "two");
//! map.insert(1, "one");
//!
//! let first = map.begin();
//! assert_eq!(map.entry_at(first), Ok((&1, &"one")));
//! assert_eq!(map.at(&3), Err(MapError::OutOfBound));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports the map, its cursor, comparators, errors and iterators.
///
/// # Usage
///
/// ```rust
/// use avlmap::prelude::*;
/// ```
pub mod prelude {
    pub use crate::ordered::*;
}

pub mod ordered;

mod trace;
