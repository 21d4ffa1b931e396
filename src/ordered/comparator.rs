//! Key orderings.
//!
//! An [`AvlMap`](super::AvlMap) orders its keys with a single strict weak
//! ordering: a [`Comparator`] answers whether one key sorts strictly before
//! another. Two keys are equivalent when neither sorts before the other, and
//! the map never holds two equivalent keys.

use std::cmp::Ordering;
use std::fmt;

/// A strict weak ordering over keys of type `K`.
///
/// # Examples
///
/// ```rust
/// use avlmap::ordered::{Comparator, NaturalOrder, ReverseOrder};
///
/// assert!(NaturalOrder.less(&1, &2));
/// assert!(ReverseOrder.less(&2, &1));
/// assert!(NaturalOrder.equivalent(&3, &3));
/// ```
pub trait Comparator<K: ?Sized> {
    /// Returns `true` if `left` sorts strictly before `right`.
    fn less(&self, left: &K, right: &K) -> bool;

    /// Returns `true` if neither key sorts before the other.
    fn equivalent(&self, left: &K, right: &K) -> bool {
        !self.less(left, right) && !self.less(right, left)
    }

    /// Three-way comparison derived from [`less`](Comparator::less).
    fn compare(&self, left: &K, right: &K) -> Ordering {
        if self.less(left, right) {
            Ordering::Less
        } else if self.less(right, left) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// Ascending order by [`Ord`]. This is the default comparator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<K: Ord + ?Sized> Comparator<K> for NaturalOrder {
    #[inline]
    fn less(&self, left: &K, right: &K) -> bool {
        left < right
    }
}

/// Descending order by [`Ord`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReverseOrder;

impl<K: Ord + ?Sized> Comparator<K> for ReverseOrder {
    #[inline]
    fn less(&self, left: &K, right: &K) -> bool {
        right < left
    }
}

/// An ordering given by a closure returning `true` when its first argument
/// sorts strictly before its second.
///
/// # Examples
///
/// ```rust
/// use avlmap::ordered::{AvlMap, OrderBy};
///
/// let by_length = OrderBy::new(|left: &String, right: &String| left.len() < right.len());
/// let mut map = AvlMap::with_comparator(by_length);
/// map.insert("ccc".to_string(), 3);
/// map.insert("a".to_string(), 1);
///
/// // "b" has the same length as "a", so it is equivalent and rejected.
/// let (_, inserted) = map.insert("b".to_string(), 2);
/// assert!(!inserted);
/// assert_eq!(map.len(), 2);
/// ```
#[derive(Clone, Copy)]
pub struct OrderBy<F> {
    less: F,
}

impl<F> OrderBy<F> {
    /// Wraps a strict "sorts before" predicate.
    #[inline]
    pub const fn new(less: F) -> Self {
        Self { less }
    }
}

impl<K: ?Sized, F> Comparator<K> for OrderBy<F>
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn less(&self, left: &K, right: &K) -> bool {
        (self.less)(left, right)
    }
}

impl<F> fmt::Debug for OrderBy<F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_struct("OrderBy").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 2, Ordering::Less)]
    #[case(2, 1, Ordering::Greater)]
    #[case(7, 7, Ordering::Equal)]
    fn test_natural_order_compare(#[case] left: i32, #[case] right: i32, #[case] expected: Ordering) {
        assert_eq!(NaturalOrder.compare(&left, &right), expected);
    }

    #[rstest]
    #[case(1, 2, Ordering::Greater)]
    #[case(2, 1, Ordering::Less)]
    #[case(7, 7, Ordering::Equal)]
    fn test_reverse_order_compare(#[case] left: i32, #[case] right: i32, #[case] expected: Ordering) {
        assert_eq!(ReverseOrder.compare(&left, &right), expected);
    }

    #[rstest]
    fn test_natural_order_on_unsized_keys() {
        assert!(NaturalOrder.less("apple", "banana"));
        assert!(!NaturalOrder.less("banana", "apple"));
    }

    #[rstest]
    fn test_order_by_equivalence_is_not_equality() {
        let modulo = OrderBy::new(|left: &i32, right: &i32| left % 10 < right % 10);
        assert!(modulo.equivalent(&3, &13));
        assert!(modulo.less(&21, &3));
    }

    #[rstest]
    fn test_order_by_debug() {
        let order = OrderBy::new(|left: &i32, right: &i32| left < right);
        assert_eq!(format!("{order:?}"), "OrderBy { .. }");
    }
}
