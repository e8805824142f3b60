//! Light-weight matrix over numeric vector rows
//!
//! Just enough linear algebra for Fisher LDA: construction, transpose,
//! matrix-vector product, outer-product accumulation, and a small linear
//! solver. Rows are [`NumericVector`]s, so sparse feature spaces stay
//! sparse until a solve forces densification.

use crate::core::error::{MlError, Result};
use crate::vector::NumericVector;

/// Pivot magnitudes below this are treated as singular
const PIVOT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: Vec<NumericVector>,
    cols: usize,
}

impl Matrix {
    /// All-zero matrix of the given shape
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows: (0..rows).map(|_| NumericVector::new(cols)).collect(),
            cols,
        }
    }

    /// Build from rows of equal logical length
    pub fn from_rows(rows: Vec<NumericVector>) -> Result<Self> {
        let cols = rows.first().map(|row| row.len()).unwrap_or(0);
        for row in &rows {
            if row.len() != cols {
                return Err(MlError::DimensionMismatch {
                    expected: cols,
                    actual: row.len(),
                });
            }
        }
        Ok(Self { rows, cols })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn col_count(&self) -> usize {
        self.cols
    }

    pub fn row(&self, index: usize) -> &NumericVector {
        &self.rows[index]
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.rows[row].get(col)
    }

    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        self.rows[row].insert(value, col);
    }

    /// Matrix-vector product
    pub fn mul_vector(&self, vector: &NumericVector) -> Result<NumericVector> {
        let mut result = NumericVector::new(self.rows.len());
        for (index, row) in self.rows.iter().enumerate() {
            result.insert(row.dot(vector)?, index);
        }
        Ok(result)
    }

    /// Transposed copy
    pub fn transpose(&self) -> Matrix {
        let mut transposed = Matrix::zeros(self.cols, self.rows.len());
        for (row_index, row) in self.rows.iter().enumerate() {
            for (col_index, value) in row.iter_non_null() {
                transposed.set(col_index, row_index, value);
            }
        }
        transposed
    }

    /// Accumulate the weighted outer product `weight * v vᵀ` in place;
    /// the scatter-matrix building block.
    pub fn add_outer(&mut self, vector: &NumericVector, weight: f64) -> Result<()> {
        if vector.len() != self.cols || self.rows.len() != self.cols {
            return Err(MlError::DimensionMismatch {
                expected: self.cols,
                actual: vector.len(),
            });
        }
        for (row_index, row_value) in vector.iter_non_null() {
            for (col_index, col_value) in vector.iter_non_null() {
                let current = self.rows[row_index].get(col_index);
                self.rows[row_index].insert(current + weight * row_value * col_value, col_index);
            }
        }
        Ok(())
    }

    /// Solve `A x = b` by Gaussian elimination with partial pivoting.
    /// The matrix must be square; near-zero pivots surface as
    /// [`MlError::SingularMatrix`].
    pub fn solve(&self, rhs: &NumericVector) -> Result<NumericVector> {
        let n = self.rows.len();
        if n != self.cols {
            return Err(MlError::DimensionMismatch {
                expected: n,
                actual: self.cols,
            });
        }
        if rhs.len() != n {
            return Err(MlError::DimensionMismatch {
                expected: n,
                actual: rhs.len(),
            });
        }

        let mut a: Vec<Vec<f64>> = self.rows.iter().map(|row| row.to_dense()).collect();
        let mut b = rhs.to_dense();

        for col in 0..n {
            let pivot_row = (col..n)
                .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
                .expect("non-empty pivot range");
            if a[pivot_row][col].abs() < PIVOT_EPSILON {
                return Err(MlError::SingularMatrix);
            }
            a.swap(col, pivot_row);
            b.swap(col, pivot_row);

            for row in (col + 1)..n {
                let factor = a[row][col] / a[col][col];
                if factor == 0.0 {
                    continue;
                }
                for k in col..n {
                    a[row][k] -= factor * a[col][k];
                }
                b[row] -= factor * b[col];
            }
        }

        let mut x = vec![0.0; n];
        for row in (0..n).rev() {
            let mut sum = b[row];
            for col in (row + 1)..n {
                sum -= a[row][col] * x[col];
            }
            x[row] = sum / a[row][row];
        }

        Ok(NumericVector::from_dense(&x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mul_vector() {
        let m = Matrix::from_rows(vec![
            NumericVector::from_dense(&[1.0, 2.0]),
            NumericVector::from_dense(&[3.0, 4.0]),
        ])
        .unwrap();
        let v = NumericVector::from_dense(&[1.0, -1.0]);
        let product = m.mul_vector(&v).unwrap();
        assert_eq!(product.to_dense(), vec![-1.0, -1.0]);
    }

    #[test]
    fn test_transpose() {
        let m = Matrix::from_rows(vec![
            NumericVector::from_dense(&[1.0, 2.0, 3.0]),
            NumericVector::from_dense(&[4.0, 5.0, 6.0]),
        ])
        .unwrap();
        let t = m.transpose();
        assert_eq!(t.row_count(), 3);
        assert_eq!(t.col_count(), 2);
        assert_eq!(t.get(0, 1), 4.0);
        assert_eq!(t.get(2, 0), 3.0);
    }

    #[test]
    fn test_from_rows_length_mismatch() {
        let result = Matrix::from_rows(vec![
            NumericVector::from_dense(&[1.0, 2.0]),
            NumericVector::from_dense(&[1.0]),
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_add_outer() {
        let mut scatter = Matrix::zeros(3, 3);
        let v = NumericVector::from_dense(&[1.0, 0.0, 2.0]);
        scatter.add_outer(&v, 2.0).unwrap();
        assert_eq!(scatter.get(0, 0), 2.0);
        assert_eq!(scatter.get(0, 2), 4.0);
        assert_eq!(scatter.get(2, 2), 8.0);
        assert_eq!(scatter.get(1, 1), 0.0);
    }

    #[test]
    fn test_solve() {
        // 2x + y = 5 ; x - y = 1 -> x = 2, y = 1
        let a = Matrix::from_rows(vec![
            NumericVector::from_dense(&[2.0, 1.0]),
            NumericVector::from_dense(&[1.0, -1.0]),
        ])
        .unwrap();
        let b = NumericVector::from_dense(&[5.0, 1.0]);
        let x = a.solve(&b).unwrap();
        assert_relative_eq!(x.get(0), 2.0, epsilon = 1e-10);
        assert_relative_eq!(x.get(1), 1.0, epsilon = 1e-10);
    }

    #[test]
    fn test_solve_needs_pivoting() {
        // leading zero forces a row swap
        let a = Matrix::from_rows(vec![
            NumericVector::from_dense(&[0.0, 1.0]),
            NumericVector::from_dense(&[1.0, 0.0]),
        ])
        .unwrap();
        let b = NumericVector::from_dense(&[3.0, 4.0]);
        let x = a.solve(&b).unwrap();
        assert_relative_eq!(x.get(0), 4.0, epsilon = 1e-10);
        assert_relative_eq!(x.get(1), 3.0, epsilon = 1e-10);
    }

    #[test]
    fn test_solve_singular() {
        let a = Matrix::from_rows(vec![
            NumericVector::from_dense(&[1.0, 2.0]),
            NumericVector::from_dense(&[2.0, 4.0]),
        ])
        .unwrap();
        let b = NumericVector::from_dense(&[1.0, 2.0]);
        assert!(matches!(a.solve(&b), Err(MlError::SingularMatrix)));
    }
}
