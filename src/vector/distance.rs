//! Pairwise distances and set similarities
//!
//! Every measure here is a paired reduction over the merge walk of the two
//! operands: no difference vector is ever materialized. Vectors of unequal
//! logical length are treated as embedded in the longer space, with the
//! missing tail implicitly zero.

use crate::vector::reduce::{merge_reduce, values_sum};
use crate::vector::NumericVector;

/// Distance functor: `(Vector, Vector) -> f64`
pub trait Distance: Send + Sync {
    fn compute(&self, left: &NumericVector, right: &NumericVector) -> f64;
}

/// Euclidean distance: `sqrt(sum (l - r)^2)` via the merge walk
#[derive(Debug, Clone, Copy, Default)]
pub struct EuclideanDistance;

impl Distance for EuclideanDistance {
    fn compute(&self, left: &NumericVector, right: &NumericVector) -> f64 {
        merge_reduce(left, right, 0.0, |acc, l, r| {
            let diff = l - r;
            *acc += diff * diff;
        })
        .sqrt()
    }
}

/// Manhattan distance: `sum |l - r|`
#[derive(Debug, Clone, Copy, Default)]
pub struct ManhattanDistance;

impl Distance for ManhattanDistance {
    fn compute(&self, left: &NumericVector, right: &NumericVector) -> f64 {
        merge_reduce(left, right, 0.0, |acc, l, r| *acc += (l - r).abs())
    }
}

/// Hölder (Minkowski-p) distance: `(sum |l - r|^p)^(1/p)`
#[derive(Debug, Clone, Copy)]
pub struct HolderDistance {
    degree: f64,
    inverse_degree: f64,
}

impl HolderDistance {
    pub fn new(degree: f64) -> Self {
        Self {
            degree,
            inverse_degree: 1.0 / degree,
        }
    }
}

impl Default for HolderDistance {
    fn default() -> Self {
        Self::new(2.0)
    }
}

impl Distance for HolderDistance {
    fn compute(&self, left: &NumericVector, right: &NumericVector) -> f64 {
        let sum = merge_reduce(left, right, 0.0, |acc, l, r| {
            *acc += (l - r).abs().powf(self.degree)
        });
        sum.powf(self.inverse_degree)
    }
}

/// Soft intersection: `sum min(l, r)` over the merge walk
fn soft_intersection(left: &NumericVector, right: &NumericVector) -> f64 {
    merge_reduce(left, right, 0.0, |acc: &mut f64, l, r| *acc += l.min(r))
}

/// Ratio-of-sums similarity skeleton shared by the set measures.
///
/// Two all-zero vectors are maximally similar (1.0). A degenerate zero
/// union yields `f64::NEG_INFINITY`, a well-ordered sentinel instead of
/// the NaN a plain division would produce.
fn similarity_ratio(
    left: &NumericVector,
    right: &NumericVector,
    intersection: f64,
    union: f64,
) -> f64 {
    if left.non_null_count() == 0 && right.non_null_count() == 0 {
        return 1.0;
    }
    if union == 0.0 {
        return f64::NEG_INFINITY;
    }
    intersection / union
}

/// Jaccard similarity: `sum min / sum max`
#[derive(Debug, Clone, Copy, Default)]
pub struct JaccardSimilarity;

impl Distance for JaccardSimilarity {
    fn compute(&self, left: &NumericVector, right: &NumericVector) -> f64 {
        let intersection = soft_intersection(left, right);
        let union = merge_reduce(left, right, 0.0, |acc: &mut f64, l, r| *acc += l.max(r));
        similarity_ratio(left, right, intersection, union)
    }
}

/// Sorensen similarity: `2 sum min / (sum l + sum r)`
#[derive(Debug, Clone, Copy, Default)]
pub struct SorensenSimilarity;

impl Distance for SorensenSimilarity {
    fn compute(&self, left: &NumericVector, right: &NumericVector) -> f64 {
        let intersection = 2.0 * soft_intersection(left, right);
        let union = values_sum(left) + values_sum(right);
        similarity_ratio(left, right, intersection, union)
    }
}

/// Simpson similarity: `sum min / min(sum l, sum r)`
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpsonSimilarity;

impl Distance for SimpsonSimilarity {
    fn compute(&self, left: &NumericVector, right: &NumericVector) -> f64 {
        let intersection = soft_intersection(left, right);
        let union = values_sum(left).min(values_sum(right));
        similarity_ratio(left, right, intersection, union)
    }
}

/// Otiai (cosine-style) similarity: `sum min / sqrt(|sum l * sum r|)`
#[derive(Debug, Clone, Copy, Default)]
pub struct OtiaiSimilarity;

impl Distance for OtiaiSimilarity {
    fn compute(&self, left: &NumericVector, right: &NumericVector) -> f64 {
        let intersection = soft_intersection(left, right);
        let union = (values_sum(left) * values_sum(right)).abs().sqrt();
        similarity_ratio(left, right, intersection, union)
    }
}

/// Braun-Blanquet similarity: `sum min / max(sum l, sum r)`
#[derive(Debug, Clone, Copy, Default)]
pub struct BraunBlanquetSimilarity;

impl Distance for BraunBlanquetSimilarity {
    fn compute(&self, left: &NumericVector, right: &NumericVector) -> f64 {
        let intersection = soft_intersection(left, right);
        let union = values_sum(left).max(values_sum(right));
        similarity_ratio(left, right, intersection, union)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_euclidean_worked_example() {
        let a = NumericVector::from_dense(&[1.0, 0.0, 0.0, 3.0]);
        let b = NumericVector::from_dense(&[0.0, 2.0, 0.0, 3.0]);
        assert_relative_eq!(EuclideanDistance.compute(&a, &b), 5.0_f64.sqrt());
    }

    #[test]
    fn test_distance_symmetry_and_identity() {
        let a = NumericVector::from_dense(&[1.0, -2.0, 0.0, 3.0]);
        let b = NumericVector::from_dense(&[0.5, 0.0, 2.0, -1.0]);
        for distance in [&EuclideanDistance as &dyn Distance, &ManhattanDistance] {
            assert_relative_eq!(distance.compute(&a, &b), distance.compute(&b, &a));
            assert_relative_eq!(distance.compute(&a, &a), 0.0);
        }
    }

    #[test]
    fn test_manhattan() {
        let a = NumericVector::from_dense(&[1.0, 0.0, 3.0]);
        let b = NumericVector::from_dense(&[0.0, 2.0, 3.0]);
        assert_relative_eq!(ManhattanDistance.compute(&a, &b), 3.0);
    }

    #[test]
    fn test_holder_degree_two_matches_euclidean() {
        let a = NumericVector::from_dense(&[1.0, 2.0, 0.0]);
        let b = NumericVector::from_dense(&[0.0, -1.0, 4.0]);
        assert_relative_eq!(
            HolderDistance::new(2.0).compute(&a, &b),
            EuclideanDistance.compute(&a, &b),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_jaccard() {
        let a = NumericVector::from_dense(&[1.0, 1.0, 0.0]);
        let b = NumericVector::from_dense(&[1.0, 0.0, 1.0]);
        // min-sum 1, max-sum 3
        assert_relative_eq!(JaccardSimilarity.compute(&a, &b), 1.0 / 3.0);
    }

    #[test]
    fn test_sorensen() {
        let a = NumericVector::from_dense(&[1.0, 1.0, 0.0]);
        let b = NumericVector::from_dense(&[1.0, 0.0, 1.0]);
        // 2 * 1 / (2 + 2)
        assert_relative_eq!(SorensenSimilarity.compute(&a, &b), 0.5);
    }

    #[test]
    fn test_similarity_degenerate_union_is_negative_infinity() {
        // opposite-signed entries sum to a zero union while the vectors
        // themselves are non-empty
        let a = NumericVector::from_dense(&[1.0, 0.0]);
        let b = NumericVector::from_dense(&[-1.0, 0.0]);
        let similarity = SorensenSimilarity.compute(&a, &b);
        assert!(similarity.is_infinite() && similarity < 0.0);
    }

    #[test]
    fn test_similarity_of_two_empty_vectors() {
        let a = NumericVector::new(3);
        let b = NumericVector::new(3);
        assert_relative_eq!(JaccardSimilarity.compute(&a, &b), 1.0);
    }
}
