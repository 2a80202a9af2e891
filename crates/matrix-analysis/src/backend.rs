//! Backend dispatch helpers for dense linear algebra.
//!
//! Conversions between [`Matrix`] and `faer::Mat`, and the decompositions the
//! analyzers need. Callers handle empty matrices before reaching the backend.

use faer::{Mat, Side};

use crate::dense::Matrix;

fn to_faer(a: &Matrix<f64>) -> Mat<f64> {
    Mat::from_fn(a.nrows(), a.ncols(), |i, j| a[[i, j]])
}

/// Singular values in non-increasing order
pub(crate) fn singular_values(a: &Matrix<f64>) -> Vec<f64> {
    debug_assert!(!a.is_empty());
    to_faer(a).singular_values()
}

/// Eigen-decomposition of a symmetric matrix.
///
/// Returns eigenvalues in non-decreasing order and the matching eigenvectors
/// as columns of an `n × n` matrix. Only the lower triangle is read.
pub(crate) fn self_adjoint_eigen(a: &Matrix<f64>) -> (Vec<f64>, Matrix<f64>) {
    debug_assert!(a.is_square() && !a.is_empty());
    let n = a.nrows();
    let evd = to_faer(a).selfadjoint_eigendecomposition(Side::Lower);

    let s = evd.s().column_vector();
    let values: Vec<f64> = (0..n).map(|i| s.read(i)).collect();

    let u = evd.u();
    let mut vectors = Matrix::zeros(n, n);
    for i in 0..n {
        for j in 0..n {
            vectors[[i, j]] = u.read(i, j);
        }
    }
    (values, vectors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dense::from_vec2d;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_singular_values_diagonal() {
        let a = from_vec2d(vec![vec![3.0, 0.0], vec![0.0, -4.0], vec![0.0, 0.0]]);
        let s = singular_values(&a);
        assert_eq!(s.len(), 2);
        assert_abs_diff_eq!(s[0], 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s[1], 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_self_adjoint_eigen_ascending() {
        let a = from_vec2d(vec![vec![2.0, 1.0], vec![1.0, 2.0]]);
        let (values, vectors) = self_adjoint_eigen(&a);
        assert_abs_diff_eq!(values[0], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(values[1], 3.0, epsilon = 1e-12);
        // eigenvector of 3 is ±(1, 1)/√2
        assert_abs_diff_eq!(vectors[[0, 1]].abs(), 0.5f64.sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(vectors[[0, 1]], vectors[[1, 1]], epsilon = 1e-12);
    }
}
