//! Dense row-major matrices with block-algebra primitives
//!
//! Concatenation and Kronecker products accept zero-row and zero-column
//! operands and produce correctly shaped (possibly empty) results.

use std::ops::{Index, IndexMut};

use num_traits::{Float, One, Zero};

use crate::error::{MatrixAnalysisError, Result};

/// Trait for scalar types stored in a [`Matrix`]
pub trait Scalar:
    Clone
    + Copy
    + PartialEq
    + std::fmt::Debug
    + Zero
    + One
    + std::ops::Add<Output = Self>
    + std::ops::Sub<Output = Self>
    + std::ops::Mul<Output = Self>
    + std::ops::Neg<Output = Self>
    + Send
    + Sync
    + 'static
{
    /// Square of absolute value
    fn abs_sq(self) -> f64;

    /// Check if value is NaN
    fn is_nan(self) -> bool;
}

impl Scalar for f64 {
    fn abs_sq(self) -> f64 {
        self * self
    }

    fn is_nan(self) -> bool {
        Float::is_nan(self)
    }
}

impl Scalar for f32 {
    fn abs_sq(self) -> f64 {
        (self * self) as f64
    }

    fn is_nan(self) -> bool {
        Float::is_nan(self)
    }
}

/// Simple 2D matrix backed by Vec (row-major)
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    nrows: usize,
    ncols: usize,
}

impl<T: Clone> Matrix<T> {
    /// Create a new matrix from dimensions and initial value
    pub fn from_elem(nrows: usize, ncols: usize, elem: T) -> Self {
        Self {
            data: vec![elem; nrows * ncols],
            nrows,
            ncols,
        }
    }

    /// Create a matrix from a row-major buffer
    pub fn from_row_major(nrows: usize, ncols: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != nrows * ncols {
            return Err(MatrixAnalysisError::InvalidLength {
                len: data.len(),
                nrows,
                ncols,
            });
        }
        Ok(Self { data, nrows, ncols })
    }

    /// Number of rows
    pub fn nrows(&self) -> usize {
        self.nrows
    }

    /// Number of columns
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    /// `(nrows, ncols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.nrows, self.ncols)
    }

    /// True if the matrix has no elements (either extent is zero)
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// True if `nrows == ncols`
    pub fn is_square(&self) -> bool {
        self.nrows == self.ncols
    }

    /// Row-major element buffer
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Borrow row `i`
    pub fn row(&self, i: usize) -> &[T] {
        &self.data[i * self.ncols..(i + 1) * self.ncols]
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[T]> {
        let ncols = self.ncols;
        (0..self.nrows).map(move |i| &self.data[i * ncols..(i + 1) * ncols])
    }

    /// Apply `f` element-wise
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Matrix<U> {
        Matrix {
            data: self.data.iter().map(f).collect(),
            nrows: self.nrows,
            ncols: self.ncols,
        }
    }
}

impl<T: Clone + Zero> Matrix<T> {
    /// Create a zeros matrix
    pub fn zeros(nrows: usize, ncols: usize) -> Self {
        Self::from_elem(nrows, ncols, T::zero())
    }
}

impl<T: Clone + One> Matrix<T> {
    /// Create a matrix filled with ones
    pub fn ones(nrows: usize, ncols: usize) -> Self {
        Self::from_elem(nrows, ncols, T::one())
    }
}

impl<T> Index<[usize; 2]> for Matrix<T> {
    type Output = T;

    fn index(&self, idx: [usize; 2]) -> &Self::Output {
        &self.data[idx[0] * self.ncols + idx[1]]
    }
}

impl<T> IndexMut<[usize; 2]> for Matrix<T> {
    fn index_mut(&mut self, idx: [usize; 2]) -> &mut Self::Output {
        &mut self.data[idx[0] * self.ncols + idx[1]]
    }
}

impl<T: Scalar> Matrix<T> {
    /// Multiply every element by `factor`
    pub fn scale(&self, factor: T) -> Self {
        self.map(|&x| x * factor)
    }

    /// Element-wise negation
    pub fn neg(&self) -> Self {
        self.map(|&x| -x)
    }
}

impl Matrix<f64> {
    /// Largest absolute value (0 for an empty matrix)
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |acc, x| acc.max(x.abs()))
    }

    /// Position and value of the maximum, first occurrence in row-major order
    pub fn argmax(&self) -> Option<((usize, usize), f64)> {
        self.arg_extreme(|candidate, best| candidate > best)
    }

    /// Position and value of the minimum, first occurrence in row-major order
    pub fn argmin(&self) -> Option<((usize, usize), f64)> {
        self.arg_extreme(|candidate, best| candidate < best)
    }

    fn arg_extreme(&self, better: impl Fn(f64, f64) -> bool) -> Option<((usize, usize), f64)> {
        let (first, rest) = self.data.split_first()?;
        let mut best_idx = 0;
        let mut best = *first;
        for (offset, &x) in rest.iter().enumerate() {
            if better(x, best) {
                best = x;
                best_idx = offset + 1;
            }
        }
        Some(((best_idx / self.ncols, best_idx % self.ncols), best))
    }

    /// Largest |a_ij - a_ji| (only meaningful for square matrices)
    pub fn max_asymmetry(&self) -> f64 {
        let n = self.nrows.min(self.ncols);
        let mut max = 0.0f64;
        for i in 0..n {
            for j in (i + 1)..n {
                max = max.max((self[[i, j]] - self[[j, i]]).abs());
            }
        }
        max
    }

    /// True if square and symmetric up to `tol`
    pub fn is_symmetric(&self, tol: f64) -> bool {
        self.is_square() && self.max_asymmetry() <= tol
    }

    /// Largest element-wise absolute difference, `None` if shapes differ
    pub fn max_abs_diff(&self, other: &Self) -> Option<f64> {
        if self.shape() != other.shape() {
            return None;
        }
        Some(
            self.data
                .iter()
                .zip(other.data.iter())
                .fold(0.0f64, |acc, (a, b)| acc.max((a - b).abs())),
        )
    }
}

/// Create a zeros matrix with given dimensions
pub fn zeros<T: Clone + Zero>(nrows: usize, ncols: usize) -> Matrix<T> {
    Matrix::zeros(nrows, ncols)
}

/// Create a matrix of ones with given dimensions
pub fn ones<T: Clone + One>(nrows: usize, ncols: usize) -> Matrix<T> {
    Matrix::ones(nrows, ncols)
}

/// Create an identity matrix
pub fn eye<T: Clone + Zero + One>(n: usize) -> Matrix<T> {
    let mut m = zeros(n, n);
    for i in 0..n {
        m[[i, i]] = T::one();
    }
    m
}

/// Create a matrix from a 2D vector (row-major)
///
/// # Panics
/// Panics if the rows have different lengths. Use
/// [`Matrix::from_row_major`] for a fallible constructor.
pub fn from_vec2d<T: Clone + Zero>(data: Vec<Vec<T>>) -> Matrix<T> {
    let nrows = data.len();
    let ncols = if nrows > 0 { data[0].len() } else { 0 };
    let mut m = zeros(nrows, ncols);
    for (i, row) in data.into_iter().enumerate() {
        assert_eq!(row.len(), ncols, "ragged rows in from_vec2d");
        for (j, x) in row.into_iter().enumerate() {
            m[[i, j]] = x;
        }
    }
    m
}

/// Transpose the matrix
pub fn transpose<T: Clone + Zero>(m: &Matrix<T>) -> Matrix<T> {
    let mut result = zeros(m.ncols, m.nrows);
    for i in 0..m.nrows {
        for j in 0..m.ncols {
            result[[j, i]] = m[[i, j]].clone();
        }
    }
    result
}

/// Matrix multiplication: A * B
pub fn mat_mul<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> Result<Matrix<T>> {
    let m = a.nrows;
    let k = a.ncols;
    let n = b.ncols;
    if b.nrows != k {
        return Err(MatrixAnalysisError::ShapeMismatch {
            expected_rows: k,
            expected_cols: n,
            actual_rows: b.nrows,
            actual_cols: b.ncols,
        });
    }

    let mut result = zeros(m, n);
    for i in 0..m {
        for l in 0..k {
            let a_il = a[[i, l]];
            if a_il == T::zero() {
                continue;
            }
            for j in 0..n {
                result[[i, j]] = result[[i, j]] + a_il * b[[l, j]];
            }
        }
    }
    Ok(result)
}

/// Kronecker product A ⊗ B
///
/// For A of shape (m, n) and B of shape (p, q) the result has shape
/// (m·p, n·q) with `(A ⊗ B)[i·p + k, j·q + l] = A[i, j] · B[k, l]`.
pub fn kron<T: Scalar>(a: &Matrix<T>, b: &Matrix<T>) -> Matrix<T> {
    let (p, q) = b.shape();
    let mut result = zeros(a.nrows * p, a.ncols * q);
    for i in 0..a.nrows {
        for j in 0..a.ncols {
            let a_ij = a[[i, j]];
            if a_ij == T::zero() {
                continue;
            }
            for k in 0..p {
                for l in 0..q {
                    result[[i * p + k, j * q + l]] = a_ij * b[[k, l]];
                }
            }
        }
    }
    result
}

/// Kronecker product of a chain of factors, left to right
pub fn kron_all<T: Scalar>(factors: &[Matrix<T>]) -> Matrix<T> {
    let Some((first, rest)) = factors.split_first() else {
        return Matrix::ones(1, 1);
    };
    rest.iter().fold(first.clone(), |acc, f| kron(&acc, f))
}

/// Horizontal concatenation of blocks sharing the same row count
pub fn hstack<T: Clone>(blocks: &[Matrix<T>]) -> Result<Matrix<T>> {
    let first = blocks.first().ok_or(MatrixAnalysisError::EmptyConcatenation)?;
    let nrows = first.nrows;
    let mut ncols = 0;
    for block in blocks {
        if block.nrows != nrows {
            return Err(MatrixAnalysisError::ShapeMismatch {
                expected_rows: nrows,
                expected_cols: block.ncols,
                actual_rows: block.nrows,
                actual_cols: block.ncols,
            });
        }
        ncols += block.ncols;
    }

    let mut data = Vec::with_capacity(nrows * ncols);
    for i in 0..nrows {
        for block in blocks {
            data.extend_from_slice(block.row(i));
        }
    }
    Ok(Matrix { data, nrows, ncols })
}

/// Vertical concatenation of blocks sharing the same column count
pub fn vstack<T: Clone>(blocks: &[Matrix<T>]) -> Result<Matrix<T>> {
    let first = blocks.first().ok_or(MatrixAnalysisError::EmptyConcatenation)?;
    let ncols = first.ncols;
    let mut nrows = 0;
    for block in blocks {
        if block.ncols != ncols {
            return Err(MatrixAnalysisError::ShapeMismatch {
                expected_rows: block.nrows,
                expected_cols: ncols,
                actual_rows: block.nrows,
                actual_cols: block.ncols,
            });
        }
        nrows += block.nrows;
    }

    let mut data = Vec::with_capacity(nrows * ncols);
    for block in blocks {
        data.extend_from_slice(&block.data);
    }
    Ok(Matrix { data, nrows, ncols })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_basic() {
        let mut m = zeros::<f64>(3, 3);
        m[[0, 0]] = 1.0;
        m[[1, 1]] = 2.0;
        m[[2, 2]] = 3.0;

        assert_eq!(m[[0, 0]], 1.0);
        assert_eq!(m[[1, 1]], 2.0);
        assert_eq!(m[[2, 2]], 3.0);
        assert_eq!(m.row(1), &[0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_matrix_transpose() {
        let m = from_vec2d(vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]);
        let mt = transpose(&m);

        assert_eq!(mt.shape(), (3, 2));
        assert_eq!(mt[[0, 0]], 1.0);
        assert_eq!(mt[[0, 1]], 4.0);
        assert_eq!(mt[[2, 0]], 3.0);
    }

    #[test]
    fn test_mat_mul() {
        let a = from_vec2d(vec![vec![1.0, 2.0], vec![3.0, 4.0]]);
        let b = from_vec2d(vec![vec![5.0, 6.0], vec![7.0, 8.0]]);
        let c = mat_mul(&a, &b).unwrap();

        assert_eq!(c[[0, 0]], 19.0);
        assert_eq!(c[[0, 1]], 22.0);
        assert_eq!(c[[1, 0]], 43.0);
        assert_eq!(c[[1, 1]], 50.0);
    }

    #[test]
    fn test_mat_mul_shape_mismatch() {
        let a = zeros::<f64>(2, 3);
        let b = zeros::<f64>(2, 3);
        assert!(matches!(
            mat_mul(&a, &b),
            Err(MatrixAnalysisError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_kron_identity_ones() {
        // ones(1x2) ⊗ I(2) = [I I]
        let k = kron(&ones::<f64>(1, 2), &eye(2));
        assert_eq!(k, from_vec2d(vec![vec![1.0, 0.0, 1.0, 0.0], vec![0.0, 1.0, 0.0, 1.0]]));

        // I(2) ⊗ ones(1x2) = block diagonal of row vectors
        let k = kron(&eye::<f64>(2), &ones(1, 2));
        assert_eq!(k, from_vec2d(vec![vec![1.0, 1.0, 0.0, 0.0], vec![0.0, 0.0, 1.0, 1.0]]));
    }

    #[test]
    fn test_kron_zero_extent() {
        let k = kron(&ones::<f64>(0, 3), &eye(4));
        assert_eq!(k.shape(), (0, 12));

        let k = kron(&eye::<f64>(0), &ones(2, 5));
        assert_eq!(k.shape(), (0, 0));

        let k = kron_all(&[eye::<f64>(2), ones(0, 3), eye(2)]);
        assert_eq!(k.shape(), (0, 12));
    }

    #[test]
    fn test_hstack_vstack() {
        let a = from_vec2d(vec![vec![1.0], vec![2.0]]);
        let b = from_vec2d(vec![vec![3.0, 4.0], vec![5.0, 6.0]]);
        let h = hstack(&[a.clone(), b]).unwrap();
        assert_eq!(h, from_vec2d(vec![vec![1.0, 3.0, 4.0], vec![2.0, 5.0, 6.0]]));

        let v = vstack(&[transpose(&a), from_vec2d(vec![vec![7.0, 8.0]])]).unwrap();
        assert_eq!(v, from_vec2d(vec![vec![1.0, 2.0], vec![7.0, 8.0]]));
    }

    #[test]
    fn test_stack_zero_extent() {
        let h = hstack(&[zeros::<f64>(0, 3), zeros(0, 0), zeros(0, 4)]).unwrap();
        assert_eq!(h.shape(), (0, 7));

        let v = vstack(&[zeros::<f64>(0, 7), h.clone(), zeros(2, 7)]).unwrap();
        assert_eq!(v.shape(), (2, 7));

        let v = vstack(&[h.clone(), h]).unwrap();
        assert_eq!(v.shape(), (0, 7));
    }

    #[test]
    fn test_stack_errors() {
        assert!(matches!(
            hstack::<f64>(&[]),
            Err(MatrixAnalysisError::EmptyConcatenation)
        ));
        assert!(matches!(
            hstack(&[zeros::<f64>(2, 1), zeros(3, 1)]),
            Err(MatrixAnalysisError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            vstack(&[zeros::<f64>(1, 2), zeros(1, 3)]),
            Err(MatrixAnalysisError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_argmax_argmin_first_occurrence() {
        let m = from_vec2d(vec![vec![1.0, 5.0, -2.0], vec![5.0, -2.0, 0.0]]);
        assert_eq!(m.argmax(), Some(((0, 1), 5.0)));
        assert_eq!(m.argmin(), Some(((0, 2), -2.0)));
        assert_eq!(m.max_abs(), 5.0);
        assert_eq!(zeros::<f64>(0, 4).argmax(), None);
    }

    #[test]
    fn test_symmetry() {
        let s = from_vec2d(vec![vec![1.0, 2.0], vec![2.0, 3.0]]);
        assert!(s.is_symmetric(0.0));
        let a = from_vec2d(vec![vec![1.0, 2.0], vec![2.5, 3.0]]);
        assert!(!a.is_symmetric(1e-9));
        assert_eq!(a.max_asymmetry(), 0.5);
    }

    #[test]
    fn test_from_row_major_length() {
        assert!(Matrix::from_row_major(2, 2, vec![1.0; 3]).is_err());
        let m = Matrix::from_row_major(0, 5, Vec::<f64>::new()).unwrap();
        assert_eq!(m.shape(), (0, 5));
        assert_eq!(m.rows().count(), 0);
    }

    #[test]
    #[should_panic(expected = "ragged rows")]
    fn test_from_vec2d_ragged_panics() {
        let _ = from_vec2d(vec![vec![1.0, 2.0], vec![3.0]]);
    }
}
