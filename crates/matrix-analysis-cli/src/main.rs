//! Command-line front end: builds `L` and writes the full set of analysis artifacts.
//!
//! Usage: `matrix-analysis [--n-minus1 N] [--n1 N] ... [--output-dir DIR]`

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use matrix_analysis::{log_banner, run_pipeline, PipelineConfig, SizeParameters};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "matrix-analysis", version, about = "Build the block matrix L and analyze L*L^T")]
struct Cli {
    /// Row multiplicity of every "ones" factor
    #[arg(long = "n-minus1", default_value_t = 1, allow_negative_numbers = true)]
    n_minus1: i64,
    #[arg(long, default_value_t = 2, allow_negative_numbers = true)]
    n1: i64,
    #[arg(long, default_value_t = 3, allow_negative_numbers = true)]
    n2: i64,
    #[arg(long, default_value_t = 4, allow_negative_numbers = true)]
    n3: i64,
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    n4: i64,
    /// Directory receiving the reports, archives and plots
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
    /// Singular values at or below this count as zero
    #[arg(long, default_value_t = 1e-10)]
    rank_tol: f64,
    /// Do not render PNG files
    #[arg(long)]
    skip_plots: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive("info".parse()?)
                .from_env_lossy(),
        )
        .init();

    let cli = Cli::parse();
    log_banner();

    let params = SizeParameters::new(cli.n_minus1, cli.n1, cli.n2, cli.n3, cli.n4)
        .context("Invalid size parameters")?;
    let config = PipelineConfig {
        params,
        output_dir: cli.output_dir,
        rank_tol: cli.rank_tol,
        skip_plots: cli.skip_plots,
    };

    let summary = run_pipeline(&config)
        .with_context(|| format!("Analysis run into {} failed", config.output_dir.display()))?;

    info!(
        l_shape = ?summary.l_shape,
        rank_l = summary.rank_l,
        rank_llt = summary.rank_llt,
        "analysis complete"
    );
    for path in summary.written() {
        info!("  - {}", path.display());
    }
    for failed in summary.failures() {
        if let Some(e) = failed.error() {
            warn!(artifact = %failed.name, error = %e, "not written");
        }
    }
    Ok(())
}
