//! End-to-end analysis run.
//!
//! Builds `L`, forms `L·Lᵗ`, and writes every report, archive and plot into
//! the configured output directory. Each file is produced by its own
//! [`Artifact`]; a failing artifact is logged and the rest still run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::artifacts::{run_artifacts, Artifact, ArtifactOutcome};
use crate::builder::build;
use crate::config::PipelineConfig;
use crate::dense::{mat_mul, transpose, Matrix};
use crate::eigen::{characteristic_polynomial, polynomial_from_roots, EigenAnalysis};
use crate::error::{MatrixAnalysisError, Result};
use crate::persist::{save_archive, save_matrix, save_text_table, TextTableOptions};
use crate::plot::{save_eigenvalue_stem, save_heatmap, HeatmapOptions};
use crate::rank::matrix_rank;
use crate::report::{
    timestamp, write_eigen_report, write_polynomial_report, write_rank_report, write_simple_polynomial_report,
    write_to_path, EigenReport, RankSummary,
};

pub const MATRIX_L_TEXT: &str = "matrix_L.txt";
pub const MATRIX_L_ARCHIVE: &str = "matrix_L.mgz";
pub const L_HEATMAP: &str = "heatmap.png";
pub const BLOCK_COORDS_JSON: &str = "block_coords.json";
pub const MATRIX_LLT_TEXT: &str = "matrix_L_LT.txt";
pub const LLT_HEATMAP: &str = "L_LT_heatmap.png";
pub const EIGENVALUES_TEXT: &str = "eigenvalues_L_LT.txt";
pub const EIGENVALUES_ARCHIVE: &str = "eigenvalues_L_LT.mgz";
pub const EIGENVALUES_PLOT: &str = "eigenvalues_L_LT.png";
pub const POLYNOMIAL_TEXT: &str = "characteristic_polynomial.txt";
pub const POLYNOMIAL_ARCHIVE: &str = "characteristic_polynomial.mgz";
pub const POLYNOMIAL_SIMPLE_TEXT: &str = "characteristic_polynomial_simple.txt";
pub const RANK_TEXT: &str = "matrix_rank.txt";

const LLT_NAME: &str = "L*L^T";

/// What a pipeline run computed and wrote
#[derive(Debug)]
pub struct PipelineSummary {
    pub l_shape: (usize, usize),
    pub llt_shape: (usize, usize),
    pub rank_l: usize,
    pub rank_llt: usize,
    /// Eigenvalues of `L·Lᵗ`, largest first
    pub eigenvalues: Vec<f64>,
    pub outcomes: Vec<ArtifactOutcome>,
}

impl PipelineSummary {
    pub fn failures(&self) -> impl Iterator<Item = &ArtifactOutcome> {
        self.outcomes.iter().filter(|o| !o.is_ok())
    }

    /// Every file written, in production order
    pub fn written(&self) -> Vec<&Path> {
        self.outcomes
            .iter()
            .flat_map(|o| o.paths().iter().map(PathBuf::as_path))
            .collect()
    }
}

/// Run the full analysis into `config.output_dir`.
///
/// # Errors
/// Fails only if the output directory cannot be created, the size
/// parameters do not describe a buildable `L`, or the rank tolerance is
/// invalid. Artifact failures are reported in the summary.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineSummary> {
    let dir = config.output_dir.as_path();
    fs::create_dir_all(dir).map_err(|e| MatrixAnalysisError::io(dir, e))?;

    let block = build(&config.params)?;
    let l = &block.matrix;
    info!(shape = ?l.shape(), params = ?config.params, "built L");

    let llt = mat_mul(l, &transpose(l))?;
    let rank_l = matrix_rank(l, Some(config.rank_tol))?;
    let analysis = EigenAnalysis::of(&llt, Some(config.rank_tol))?;
    info!(rank_l, rank_llt = analysis.rank, "computed ranks");

    let created = timestamp();
    let rank_summary = RankSummary {
        l_shape: l.shape(),
        llt_shape: llt.shape(),
        rank_l,
        rank_llt: analysis.rank,
    };

    let mut artifacts = vec![
        Artifact::new("L text table", || {
            let path = dir.join(MATRIX_L_TEXT);
            save_text_table(&path, l, &TextTableOptions::new(8, 4))?;
            Ok(vec![path])
        }),
        Artifact::new("L archive", || Ok(vec![save_matrix(&dir.join(MATRIX_L_ARCHIVE), l)?.path])),
    ];

    if !config.skip_plots {
        artifacts.push(Artifact::new("L heatmap", || {
            let path = dir.join(L_HEATMAP);
            let opts = HeatmapOptions {
                clim: Some((-1.0, 1.0)),
                size: (1200, 1200),
                ..HeatmapOptions::with_title("Matrix L with highlighted blocks")
            };
            save_heatmap(&path, l, &opts, Some(&block.coords))?;
            Ok(vec![path])
        }));
    }

    artifacts.push(Artifact::new("block coordinates", || {
        let path = dir.join(BLOCK_COORDS_JSON);
        let json = block.coords.to_json()?;
        fs::write(&path, json).map_err(|e| MatrixAnalysisError::io(&path, e))?;
        Ok(vec![path])
    }));

    artifacts.push(Artifact::new("L*L^T text table", || {
        let path = dir.join(MATRIX_LLT_TEXT);
        save_text_table(&path, &llt, &TextTableOptions::new(12, 6))?;
        Ok(vec![path])
    }));

    if !config.skip_plots {
        artifacts.push(Artifact::new("L*L^T heatmap", || {
            let path = dir.join(LLT_HEATMAP);
            let opts = HeatmapOptions {
                highlight_extremes: true,
                ..HeatmapOptions::with_title("Matrix L * L^T")
            };
            save_heatmap(&path, &llt, &opts, None)?;
            Ok(vec![path])
        }));
    }

    artifacts.push(Artifact::new("eigenvalue report", || {
        let path = dir.join(EIGENVALUES_TEXT);
        let report = EigenReport {
            name: LLT_NAME,
            shape: llt.shape(),
            rank: analysis.rank,
            eigenvalues: &analysis.eigen.eigenvalues,
        };
        write_to_path(&path, |w| write_eigen_report(w, &created, &report))?;
        Ok(vec![path])
    }));

    artifacts.push(Artifact::new("eigenvalue archive", || {
        let path = dir.join(EIGENVALUES_ARCHIVE);
        let values = &analysis.eigen.eigenvalues;
        let column = Matrix::from_row_major(values.len(), 1, values.clone())?;
        let rank = Matrix::from_row_major(1, 1, vec![analysis.rank as f64])?;
        save_archive(
            &path,
            &[
                ("eigenvalues", &column),
                ("eigenvectors", &analysis.eigen.eigenvectors),
                ("rank", &rank),
            ],
        )?;
        Ok(vec![path])
    }));

    if !config.skip_plots {
        artifacts.push(Artifact::new("eigenvalue plot", || {
            let path = dir.join(EIGENVALUES_PLOT);
            save_eigenvalue_stem(&path, &analysis.eigen.eigenvalues, "Eigenvalues of L*L^T")?;
            Ok(vec![path])
        }));
    }

    artifacts.push(Artifact::new("characteristic polynomial", || {
        match save_polynomial(dir, &llt, &created) {
            Ok(paths) => Ok(paths),
            Err(e) => {
                warn!(error = %e, "characteristic polynomial failed, writing coefficients from eigenvalues");
                let coeffs = polynomial_from_roots(&analysis.eigen.eigenvalues);
                let path = dir.join(POLYNOMIAL_SIMPLE_TEXT);
                write_to_path(&path, |w| write_simple_polynomial_report(w, LLT_NAME, &coeffs))?;
                Ok(vec![path])
            }
        }
    }));

    artifacts.push(Artifact::new("rank report", || {
        let path = dir.join(RANK_TEXT);
        write_to_path(&path, |w| write_rank_report(w, &created, &rank_summary))?;
        Ok(vec![path])
    }));

    let outcomes = run_artifacts(artifacts);

    let summary = PipelineSummary {
        l_shape: l.shape(),
        llt_shape: llt.shape(),
        rank_l,
        rank_llt: analysis.rank,
        eigenvalues: analysis.eigen.eigenvalues.clone(),
        outcomes,
    };
    let failed = summary.failures().count();
    info!(
        written = summary.written().len(),
        failed,
        dir = %dir.display(),
        "pipeline finished"
    );
    Ok(summary)
}

fn save_polynomial(dir: &Path, llt: &Matrix<f64>, created: &str) -> Result<Vec<PathBuf>> {
    let coeffs = characteristic_polynomial(llt)?;

    let text = dir.join(POLYNOMIAL_TEXT);
    write_to_path(&text, |w| write_polynomial_report(w, created, LLT_NAME, llt.shape(), &coeffs))?;

    let archive = dir.join(POLYNOMIAL_ARCHIVE);
    let row = Matrix::from_row_major(1, coeffs.len(), coeffs)?;
    save_archive(&archive, &[("poly_coeffs", &row)])?;

    Ok(vec![text, archive])
}
