//! Dual iteration cursors
//!
//! The fast cursor visits only not-null positions, in increasing order; it
//! is the basis of every merge-based binary operation. The merge walk zips
//! two fast cursors with a classic sorted two-pointer traversal,
//! substituting zero on the exhausted or skipped side.

use std::collections::btree_map;
use std::iter::Peekable;

use crate::vector::{Backing, NumericVector};

enum Inner<'a> {
    Dense {
        values: &'a [f64],
        position: usize,
    },
    Sparse(btree_map::Iter<'a, usize, f64>),
}

/// Fast cursor: yields `(position, value)` for every not-null position
pub struct NonNullIter<'a> {
    inner: Inner<'a>,
}

impl<'a> NonNullIter<'a> {
    pub(crate) fn new(vector: &'a NumericVector) -> Self {
        let inner = match vector.backing() {
            Backing::Dense { values, .. } => Inner::Dense {
                values,
                position: 0,
            },
            Backing::Sparse(entries) => Inner::Sparse(entries.iter()),
        };
        Self { inner }
    }
}

impl<'a> Iterator for NonNullIter<'a> {
    type Item = (usize, f64);

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            Inner::Dense { values, position } => {
                while *position < values.len() {
                    let current = *position;
                    *position += 1;
                    if values[current] != 0.0 {
                        return Some((current, values[current]));
                    }
                }
                None
            }
            Inner::Sparse(entries) => entries.next().map(|(&position, &value)| (position, value)),
        }
    }
}

/// Merge walk over two fast cursors: yields `(position, left, right)` for
/// the union of both not-null sets, zero-substituting the absent side.
pub struct MergeWalk<'a> {
    left: Peekable<NonNullIter<'a>>,
    right: Peekable<NonNullIter<'a>>,
}

impl<'a> MergeWalk<'a> {
    pub fn new(left: &'a NumericVector, right: &'a NumericVector) -> Self {
        Self {
            left: left.iter_non_null().peekable(),
            right: right.iter_non_null().peekable(),
        }
    }
}

impl<'a> Iterator for MergeWalk<'a> {
    type Item = (usize, f64, f64);

    fn next(&mut self) -> Option<Self::Item> {
        match (self.left.peek().copied(), self.right.peek().copied()) {
            (None, None) => None,
            (Some((position, value)), None) => {
                self.left.next();
                Some((position, value, 0.0))
            }
            (None, Some((position, value))) => {
                self.right.next();
                Some((position, 0.0, value))
            }
            (Some((left_pos, left_val)), Some((right_pos, right_val))) => {
                if left_pos == right_pos {
                    self.left.next();
                    self.right.next();
                    Some((left_pos, left_val, right_val))
                } else if left_pos < right_pos {
                    self.left.next();
                    Some((left_pos, left_val, 0.0))
                } else {
                    self.right.next();
                    Some((right_pos, 0.0, right_val))
                }
            }
        }
    }
}
