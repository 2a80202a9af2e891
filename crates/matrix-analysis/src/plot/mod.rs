//! Bitmap rendering of matrices and eigenvalue spectra.
//!
//! - [`save_heatmap`] / [`render_heatmap`]: colored cell grid with an optional
//!   colorbar, extreme-value markers and block overlay
//! - [`save_eigenvalue_stem`]: stem plot of a spectrum

mod heatmap;
mod overlay;
mod stem;

pub use heatmap::{heatmap_title, render_heatmap, save_heatmap, HeatmapOptions, RasterImage};
pub use overlay::{dashed_segments, overlay_rectangles, OverlayRect, MAIN_BLOCK_STROKE, SUB_BLOCK_STROKE};
pub use stem::{save_eigenvalue_stem, STEM_PLOT_SIZE};

use plotters::drawing::DrawingAreaErrorKind;

use crate::error::MatrixAnalysisError;

pub(crate) fn plot_err<E: std::error::Error + Send + Sync>(e: DrawingAreaErrorKind<E>) -> MatrixAnalysisError {
    MatrixAnalysisError::Plot(e.to_string())
}
