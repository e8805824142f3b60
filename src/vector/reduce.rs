//! Reusable single and paired reductions over the fast cursor
//!
//! Every norm, distance and similarity in this crate is a fold over either
//! one fast cursor or the merge walk of two; these helpers keep that
//! skeleton in one place.

use crate::vector::cursor::MergeWalk;
use crate::vector::NumericVector;

/// Fold an accumulator over the not-null values of one vector
pub fn reduce_values<R>(
    vector: &NumericVector,
    initial: R,
    mut op: impl FnMut(&mut R, f64),
) -> R {
    let mut accumulator = initial;
    for (_, value) in vector.iter_non_null() {
        op(&mut accumulator, value);
    }
    accumulator
}

/// Fold an accumulator over the merge walk of two vectors, substituting
/// zero on the side that is absent or exhausted at each step.
pub fn merge_reduce<R>(
    left: &NumericVector,
    right: &NumericVector,
    initial: R,
    mut op: impl FnMut(&mut R, f64, f64),
) -> R {
    let mut accumulator = initial;
    for (_, left_value, right_value) in MergeWalk::new(left, right) {
        op(&mut accumulator, left_value, right_value);
    }
    accumulator
}

/// Sum of the not-null values
pub fn values_sum(vector: &NumericVector) -> f64 {
    reduce_values(vector, 0.0, |acc, value| *acc += value)
}
