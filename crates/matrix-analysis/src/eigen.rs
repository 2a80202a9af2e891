//! Eigenvalues, eigenvectors and characteristic polynomials of square matrices.

use tracing::debug;

use crate::backend;
use crate::dense::{eye, mat_mul, Matrix};
use crate::error::{MatrixAnalysisError, Result};
use crate::rank::matrix_rank;

/// Relative tolerance used to decide whether a matrix is symmetric
pub const SYMMETRY_RTOL: f64 = 1e-9;

/// Eigen-decomposition of a symmetric matrix, sorted by descending eigenvalue
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    /// Eigenvalues, largest first
    pub eigenvalues: Vec<f64>,
    /// Eigenvectors as columns, column `k` belongs to `eigenvalues[k]`
    pub eigenvectors: Matrix<f64>,
}

impl SymmetricEigen {
    /// Number of eigenvalues with magnitude above `tol`
    pub fn count_above(&self, tol: f64) -> usize {
        self.eigenvalues.iter().filter(|v| v.abs() > tol).count()
    }
}

fn ensure_square(a: &Matrix<f64>) -> Result<usize> {
    if !a.is_square() {
        return Err(MatrixAnalysisError::NonSquareMatrix {
            nrows: a.nrows(),
            ncols: a.ncols(),
        });
    }
    Ok(a.nrows())
}

fn symmetry_tol(a: &Matrix<f64>) -> f64 {
    SYMMETRY_RTOL * a.max_abs().max(1.0)
}

/// Eigen-decomposition of a real symmetric matrix.
///
/// # Errors
/// `NonSquareMatrix` for a rectangular input, `NotSymmetric` if
/// `max |a_ij - a_ji|` exceeds `SYMMETRY_RTOL · max(1, max |a_ij|)`.
pub fn symmetric_eigen(a: &Matrix<f64>) -> Result<SymmetricEigen> {
    let n = ensure_square(a)?;
    let asymmetry = a.max_asymmetry();
    if asymmetry > symmetry_tol(a) {
        return Err(MatrixAnalysisError::NotSymmetric {
            max_asymmetry: asymmetry,
        });
    }
    if n == 0 {
        return Ok(SymmetricEigen {
            eigenvalues: Vec::new(),
            eigenvectors: Matrix::zeros(0, 0),
        });
    }

    let (ascending, vectors) = backend::self_adjoint_eigen(a);

    // Reverse to descending order, permuting eigenvector columns alongside
    let eigenvalues: Vec<f64> = ascending.iter().rev().copied().collect();
    let mut eigenvectors = Matrix::zeros(n, n);
    for k in 0..n {
        let src = n - 1 - k;
        for i in 0..n {
            eigenvectors[[i, k]] = vectors[[i, src]];
        }
    }

    debug!(n, largest = eigenvalues[0], "symmetric eigen-decomposition");
    Ok(SymmetricEigen {
        eigenvalues,
        eigenvectors,
    })
}

/// Eigen-decomposition together with the numerical rank of the same matrix
#[derive(Debug, Clone)]
pub struct EigenAnalysis {
    pub eigen: SymmetricEigen,
    pub rank: usize,
}

impl EigenAnalysis {
    /// Decompose `a` and compute its rank with tolerance `tol` (see [`matrix_rank`])
    pub fn of(a: &Matrix<f64>, tol: Option<f64>) -> Result<Self> {
        let eigen = symmetric_eigen(a)?;
        let rank = matrix_rank(a, tol)?;
        Ok(Self { eigen, rank })
    }
}

/// Coefficients of `∏ (λ - r)` over `roots`, highest degree first
pub fn polynomial_from_roots(roots: &[f64]) -> Vec<f64> {
    let mut coeffs = Vec::with_capacity(roots.len() + 1);
    coeffs.push(1.0);
    for &r in roots {
        // multiply by (λ - r)
        coeffs.push(0.0);
        for k in (1..coeffs.len()).rev() {
            coeffs[k] -= r * coeffs[k - 1];
        }
    }
    coeffs
}

/// Characteristic polynomial `det(λI - A)`, coefficients highest degree first.
///
/// Symmetric input is expanded from its eigenvalues. Other square matrices go
/// through the Faddeev–LeVerrier recursion.
///
/// # Errors
/// `NonSquareMatrix` for a rectangular input.
pub fn characteristic_polynomial(a: &Matrix<f64>) -> Result<Vec<f64>> {
    let n = ensure_square(a)?;
    if n == 0 {
        return Ok(vec![1.0]);
    }
    if a.max_asymmetry() <= symmetry_tol(a) {
        let eig = symmetric_eigen(a)?;
        return Ok(polynomial_from_roots(&eig.eigenvalues));
    }
    faddeev_leverrier(a)
}

/// Faddeev–LeVerrier recursion for the characteristic polynomial
///
/// `M_0 = 0`, `c_n = 1`, `M_k = A·M_{k-1} + c_{n-k+1}·I`,
/// `c_{n-k} = -tr(A·M_k) / k`.
pub fn faddeev_leverrier(a: &Matrix<f64>) -> Result<Vec<f64>> {
    let n = ensure_square(a)?;
    let mut coeffs = vec![0.0; n + 1];
    coeffs[0] = 1.0;

    let identity: Matrix<f64> = eye(n);
    let mut m = Matrix::zeros(n, n);
    for k in 1..=n {
        let am = mat_mul(a, &m)?;
        let c_prev = coeffs[k - 1];
        m = Matrix::from_row_major(
            n,
            n,
            am.as_slice()
                .iter()
                .zip(identity.as_slice())
                .map(|(x, e)| x + c_prev * e)
                .collect(),
        )?;
        let am = mat_mul(a, &m)?;
        let trace: f64 = (0..n).map(|i| am[[i, i]]).sum();
        coeffs[k] = -trace / k as f64;
    }
    Ok(coeffs)
}

/// Evaluate a polynomial (highest degree first) at `x` with Horner's rule
pub fn eval_polynomial(coeffs: &[f64], x: f64) -> f64 {
    coeffs.iter().fold(0.0, |acc, &c| acc * x + c)
}
