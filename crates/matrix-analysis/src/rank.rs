//! Numerical rank from singular values.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::backend;
use crate::dense::Matrix;
use crate::error::{MatrixAnalysisError, Result};

// Global default tolerance stored as AtomicU64 (f64::to_bits())
static DEFAULT_RANK_TOL: AtomicU64 = AtomicU64::new(1e-10_f64.to_bits());

/// Get the global default tolerance for [`matrix_rank`].
///
/// The default value is 1e-10.
pub fn default_rank_tol() -> f64 {
    f64::from_bits(DEFAULT_RANK_TOL.load(Ordering::Relaxed))
}

/// Set the global default tolerance for [`matrix_rank`].
///
/// # Errors
/// Returns `InvalidTolerance` if `tol` is not finite or is negative.
pub fn set_default_rank_tol(tol: f64) -> Result<()> {
    validate_tol(tol)?;
    DEFAULT_RANK_TOL.store(tol.to_bits(), Ordering::Relaxed);
    Ok(())
}

fn validate_tol(tol: f64) -> Result<f64> {
    if !tol.is_finite() || tol < 0.0 {
        return Err(MatrixAnalysisError::InvalidTolerance(tol));
    }
    Ok(tol)
}

/// Singular values of `a` in non-increasing order (empty for an empty matrix)
pub fn singular_values(a: &Matrix<f64>) -> Vec<f64> {
    if a.is_empty() {
        return Vec::new();
    }
    backend::singular_values(a)
}

/// Count of singular values strictly greater than `tol`.
///
/// `tol` defaults to [`default_rank_tol`].
pub fn matrix_rank(a: &Matrix<f64>, tol: Option<f64>) -> Result<usize> {
    let tol = validate_tol(tol.unwrap_or_else(default_rank_tol))?;
    Ok(singular_values(a).into_iter().filter(|&s| s > tol).count())
}
