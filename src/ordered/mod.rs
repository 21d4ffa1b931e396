//! An ordered map with stable, checked cursors.
//!
//! This module provides [`AvlMap`], a mutable ordered map built on a
//! height-balanced binary search tree with parent links, together with the
//! pieces its API is made of:
//!
//! - [`Cursor`]: a copyable position inside one map, valid until its entry
//!   is erased
//! - [`Comparator`]: the key ordering, with [`NaturalOrder`],
//!   [`ReverseOrder`] and [`OrderBy`]
//! - [`MapError`] and [`IteratorFault`]: the failures lookups and cursor
//!   operations report
//! - [`Iter`], [`IterMut`], [`Keys`], [`Values`], [`ValuesMut`],
//!   [`IntoIter`]: in-order iterators
//!
//! # Examples
//!
//! ## Lookups
//!
//! ```rust
//! use avlmap::ordered::{AvlMap, MapError};
//!
//! let mut map = AvlMap::new();
//! map.insert("apple", 3);
//! map.insert("pear", 5);
//!
//! assert_eq!(map.at(&"apple"), Ok(&3));
//! assert_eq!(map.at(&"plum"), Err(MapError::OutOfBound));
//! assert_eq!(map.count(&"pear"), 1);
//! ```
//!
//! ## Cursors
//!
//! ```rust
//! use avlmap::ordered::AvlMap;
//!
//! let mut map: AvlMap<i32, &str> = (1..=5).map(|key| (key, "x")).collect();
//!
//! // Walk from the first entry to the end position.
//! let mut cursor = map.begin();
//! let mut keys = Vec::new();
//! while !cursor.is_end() {
//!     keys.push(*map.key_at(cursor).unwrap());
//!     cursor = map.next_cursor(cursor).unwrap();
//! }
//! assert_eq!(keys, vec![1, 2, 3, 4, 5]);
//!
//! // Erasing one entry leaves other cursors usable.
//! let four = map.find(&4);
//! map.erase(map.find(&3)).unwrap();
//! assert_eq!(map.key_at(four), Ok(&4));
//! ```
//!
//! ## Custom ordering
//!
//! ```rust
//! use avlmap::ordered::{AvlMap, OrderBy};
//!
//! let by_length = OrderBy::new(|left: &&str, right: &&str| left.len() < right.len());
//! let mut map = AvlMap::with_comparator(by_length);
//! map.insert("ccc", 3);
//! map.insert("a", 1);
//! map.insert("bb", 2);
//!
//! // "zz" is equivalent to "bb" under this ordering.
//! let (_, inserted) = map.insert("zz", 20);
//! assert!(!inserted);
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec!["a", "bb", "ccc"]);
//! ```

mod comparator;
mod cursor;
mod error;
mod iter;
mod map;
mod node;
mod rotation;

pub use comparator::Comparator;
pub use comparator::NaturalOrder;
pub use comparator::OrderBy;
pub use comparator::ReverseOrder;
pub use cursor::Cursor;
pub use error::IteratorFault;
pub use error::MapError;
pub use iter::IntoIter;
pub use iter::Iter;
pub use iter::IterMut;
pub use iter::Keys;
pub use iter::Values;
pub use iter::ValuesMut;
pub use map::AvlMap;
