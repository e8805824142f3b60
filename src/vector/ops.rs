//! Algebraic operators over [`NumericVector`]
//!
//! Binary vector-vector operators never materialize dense intermediates:
//! they walk both not-null sets in increasing-position order with the
//! merge walk from [`crate::vector::cursor`]. Checked methods return
//! `Result`; the `std::ops` sugar delegates to them and panics on a
//! dimension mismatch or zero divisor, the way numeric crates treat
//! shape errors.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};

use crate::core::error::{MlError, Result};
use crate::vector::cursor::MergeWalk;
use crate::vector::{Backing, NumericVector};

/// When one operand has at most this fraction of the other's entries,
/// `dot` iterates the sparser side and probes the denser side instead of
/// zipper-merging both cursors.
const PROBE_RATIO: usize = 8;

impl NumericVector {
    fn check_len(&self, other: &NumericVector) -> Result<()> {
        if self.len() != other.len() {
            return Err(MlError::DimensionMismatch {
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(())
    }

    /// Stored value at a position, zero when absent; no bounds check.
    fn stored(&self, position: usize) -> f64 {
        match self.backing() {
            Backing::Dense { values, .. } => values.get(position).copied().unwrap_or(0.0),
            Backing::Sparse(entries) => entries.get(&position).copied().unwrap_or(0.0),
        }
    }

    /// Dot product of two vectors of equal logical length.
    ///
    /// Walks the intersection of both not-null sets; when one side is far
    /// sparser than the other, it iterates the sparse side and probes the
    /// dense one directly.
    pub fn dot(&self, other: &NumericVector) -> Result<f64> {
        self.check_len(other)?;

        let (small, large) = if self.non_null_count() <= other.non_null_count() {
            (self, other)
        } else {
            (other, self)
        };

        if small.non_null_count() * PROBE_RATIO <= large.non_null_count() {
            let mut result = 0.0;
            for (position, value) in small.iter_non_null() {
                result += value * large.stored(position);
            }
            return Ok(result);
        }

        let mut left = self.iter_non_null().peekable();
        let mut right = other.iter_non_null().peekable();
        let mut result = 0.0;
        while let (Some(&(left_pos, left_val)), Some(&(right_pos, right_val))) =
            (left.peek(), right.peek())
        {
            if left_pos == right_pos {
                result += left_val * right_val;
                left.next();
                right.next();
            } else if left_pos < right_pos {
                left.next();
            } else {
                right.next();
            }
        }
        Ok(result)
    }

    /// Element-wise sum; the result's not-null set is the union of both
    /// inputs', with entries that cancel to zero dropped.
    pub fn add_vector(&self, other: &NumericVector) -> Result<NumericVector> {
        self.check_len(other)?;
        let entries: BTreeMap<usize, f64> = MergeWalk::new(self, other)
            .map(|(position, left, right)| (position, left + right))
            .filter(|&(_, value)| value != 0.0)
            .collect();
        Ok(NumericVector::from_map(entries, self.len()))
    }

    /// Element-wise difference, with the same union/cancellation rules
    /// as [`NumericVector::add_vector`]
    pub fn sub_vector(&self, other: &NumericVector) -> Result<NumericVector> {
        self.check_len(other)?;
        let entries: BTreeMap<usize, f64> = MergeWalk::new(self, other)
            .map(|(position, left, right)| (position, left - right))
            .filter(|&(_, value)| value != 0.0)
            .collect();
        Ok(NumericVector::from_map(entries, self.len()))
    }

    /// Multiply every stored entry by a scalar; a zero factor clears the
    /// not-null set entirely.
    pub fn scale(&self, factor: f64) -> NumericVector {
        if factor == 0.0 {
            return NumericVector::new(self.len());
        }
        let mut result = self.clone();
        match &mut result.backing {
            Backing::Dense { values, .. } => {
                for value in values.iter_mut() {
                    *value *= factor;
                }
            }
            Backing::Sparse(entries) => {
                for value in entries.values_mut() {
                    *value *= factor;
                }
            }
        }
        result
    }

    /// Divide every stored entry by a scalar; a zero divisor is a domain
    /// error, never a silent infinity.
    pub fn scale_div(&self, divisor: f64) -> Result<NumericVector> {
        if divisor == 0.0 {
            return Err(MlError::DivisionByZero);
        }
        Ok(self.scale(1.0 / divisor))
    }

    /// Add a scalar to the stored entries only. Implicit zeros stay zero,
    /// so this is not an affine shift over the whole vector; entries that
    /// cancel to zero leave the not-null set.
    pub fn add_scalar(&self, value: f64) -> NumericVector {
        if value == 0.0 {
            return self.clone();
        }
        let entries: BTreeMap<usize, f64> = self
            .iter_non_null()
            .map(|(position, stored)| (position, stored + value))
            .filter(|&(_, shifted)| shifted != 0.0)
            .collect();
        NumericVector::from_map(entries, self.len())
    }

    /// Subtract a scalar from the stored entries only; see
    /// [`NumericVector::add_scalar`] for the non-affine semantics.
    pub fn sub_scalar(&self, value: f64) -> NumericVector {
        self.add_scalar(-value)
    }

    /// In-place regularized gradient step.
    ///
    /// For every not-null position `p` of `gradient`, replaces the current
    /// value with `decay * current + step * gradient[p]`. Positions absent
    /// from the gradient are untouched. Returns the sum of squared deltas
    /// across touched positions, the convergence diagnostic used by the
    /// gradient-descent learners.
    pub fn update(&mut self, decay: f64, step: f64, gradient: &NumericVector) -> Result<f64> {
        self.check_len(gradient)?;
        let mut difference = 0.0;
        for (position, gradient_value) in gradient.iter_non_null() {
            let value = self.stored(position);
            let new_value = decay * value + step * gradient_value;
            difference += (new_value - value) * (new_value - value);
            self.insert(new_value, position);
        }
        Ok(difference)
    }
}

impl PartialEq for NumericVector {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        MergeWalk::new(self, other).all(|(_, left, right)| left == right)
    }
}

impl Add for &NumericVector {
    type Output = NumericVector;

    fn add(self, other: &NumericVector) -> NumericVector {
        self.add_vector(other).expect("vector addition length mismatch")
    }
}

impl Sub for &NumericVector {
    type Output = NumericVector;

    fn sub(self, other: &NumericVector) -> NumericVector {
        self.sub_vector(other)
            .expect("vector subtraction length mismatch")
    }
}

impl AddAssign<&NumericVector> for NumericVector {
    fn add_assign(&mut self, other: &NumericVector) {
        *self = (&*self) + other;
    }
}

impl SubAssign<&NumericVector> for NumericVector {
    fn sub_assign(&mut self, other: &NumericVector) {
        *self = (&*self) - other;
    }
}

impl Mul for &NumericVector {
    type Output = f64;

    fn mul(self, other: &NumericVector) -> f64 {
        self.dot(other).expect("dot product length mismatch")
    }
}

impl Mul<f64> for &NumericVector {
    type Output = NumericVector;

    fn mul(self, factor: f64) -> NumericVector {
        self.scale(factor)
    }
}

impl Div<f64> for &NumericVector {
    type Output = NumericVector;

    fn div(self, divisor: f64) -> NumericVector {
        self.scale_div(divisor).expect("vector division by zero")
    }
}
