//! Pipeline configuration.

use std::path::PathBuf;

use crate::builder::SizeParameters;
use crate::rank::default_rank_tol;

/// Options for [`run_pipeline`](crate::pipeline::run_pipeline)
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Size parameters of `L`
    pub params: SizeParameters,
    /// Directory receiving every artifact (created if missing)
    pub output_dir: PathBuf,
    /// Singular-value threshold for rank computations
    pub rank_tol: f64,
    /// Skip the PNG artifacts
    pub skip_plots: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            params: SizeParameters::default(),
            output_dir: PathBuf::from("."),
            rank_tol: default_rank_tol(),
            skip_plots: false,
        }
    }
}

impl PipelineConfig {
    pub fn new(params: SizeParameters, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            params,
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }
}
