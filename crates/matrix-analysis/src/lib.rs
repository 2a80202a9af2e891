//! Structured block matrix assembly and analysis
//!
//! This crate builds the block-structured matrix `L` from five size
//! parameters and analyzes it:
//! - `build_l_matrix` / `build`: Kronecker-product assembly with block coordinates
//! - `matrix_rank`: numerical rank from singular values
//! - `symmetric_eigen`, `characteristic_polynomial`: spectrum of `L·Lᵗ`
//! - `save_heatmap`, `save_eigenvalue_stem`: PNG rendering
//! - `save_matrix`, `load_matrix`: compressed archive with text fallback
//! - `run_pipeline`: every artifact of a full analysis run
//!
//! # Example
//!
//! ```
//! use matrix_analysis::{build_l_matrix, mat_mul, matrix_rank, transpose};
//!
//! let (l, coords) = build_l_matrix(1, 2, 3, 4, 5).unwrap();
//! assert_eq!(coords.main_blocks.len(), 6);
//!
//! let llt = mat_mul(&l, &transpose(&l)).unwrap();
//! assert_eq!(matrix_rank(&llt, None).unwrap(), matrix_rank(&l, None).unwrap());
//! ```

pub mod artifacts;
mod backend;
pub mod builder;
pub mod colormap;
pub mod config;
pub mod coords;
pub mod dense;
pub mod eigen;
pub mod error;
pub mod persist;
pub mod pipeline;
pub mod plot;
pub mod rank;
pub mod report;

// Re-export main types
pub use artifacts::{run_artifacts, Artifact, ArtifactOutcome};
pub use builder::{build, build_l_matrix, BlockMatrix, SizeParameters};
pub use colormap::{custom_colormap, Colormap, Normalize};
pub use config::PipelineConfig;
pub use coords::{BlockCoordinateMap, BlockSpan, MainBlock, SubBlock};
pub use dense::{eye, from_vec2d, hstack, kron, mat_mul, transpose, vstack, Matrix, Scalar};
pub use eigen::{characteristic_polynomial, polynomial_from_roots, symmetric_eigen, EigenAnalysis, SymmetricEigen};
pub use error::{MatrixAnalysisError, Result};
pub use persist::{load_matrix, save_matrix, save_vector, SaveOutcome, SavedFormat, TextTableOptions};
pub use pipeline::{run_pipeline, PipelineSummary};
pub use plot::{render_heatmap, save_eigenvalue_stem, save_heatmap, HeatmapOptions, RasterImage};
pub use rank::{default_rank_tol, matrix_rank, set_default_rank_tol};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// One-line greeting shown by front ends on startup
pub fn banner() -> String {
    format!("Matrix Analysis Toolkit v{VERSION}")
}

/// Emit [`banner`] through `tracing`
pub fn log_banner() {
    tracing::info!("{}", banner());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_banner_has_version() {
        assert!(banner().ends_with(VERSION));
        assert!(banner().starts_with("Matrix Analysis Toolkit v"));
    }
}
