//! # Path-count arithmetic
//!
//! Entries of the adjacency and reachability matrices are exact integer
//! counts: `A[i][j]` counts parallel edges, `R[i][j]` counts distinct paths.
//! Path counts grow combinatorially with the depth of the DAG, so every
//! operation here is checked and an overflow is reported instead of wrapped.
//!
//! The counter types are signed: building `I − A` for the closure needs
//! negative entries, and an incremental removal that would drive a count
//! below zero has to be observable before it is committed.

use duplicate::duplicate;
use std::fmt::{Debug, Display};
use std::hash::Hash;

pub trait PathCount:
    Copy + Debug + Display + Default + Eq + Ord + Hash + Send + Sync + 'static
{
    const ZERO: Self;
    const ONE: Self;

    fn checked_add(self, rhs: Self) -> Option<Self>;
    fn checked_sub(self, rhs: Self) -> Option<Self>;
    fn checked_mul(self, rhs: Self) -> Option<Self>;

    fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }

    /// At least one path (or edge) is recorded.
    fn is_positive(&self) -> bool {
        *self > Self::ZERO
    }

    fn is_negative(&self) -> bool {
        *self < Self::ZERO
    }

    /// Saturating view used for dependent counts and log fields; negatives map to zero.
    fn as_usize(self) -> usize;
}

duplicate! {
    [types;
        [i32];
        [i64];
        [i128];
        ]

    impl PathCount for types {
        const ZERO: Self = 0;
        const ONE: Self = 1;

        #[inline]
        fn checked_add(self, rhs: Self) -> Option<Self> {
            types::checked_add(self, rhs)
        }

        #[inline]
        fn checked_sub(self, rhs: Self) -> Option<Self> {
            types::checked_sub(self, rhs)
        }

        #[inline]
        fn checked_mul(self, rhs: Self) -> Option<Self> {
            types::checked_mul(self, rhs)
        }

        #[inline]
        fn as_usize(self) -> usize {
            if self < 0 {
                0
            } else {
                usize::try_from(self).unwrap_or(usize::MAX)
            }
        }
    }
}
