//! Full analysis runs into scratch directories.

use matrix_analysis::pipeline::{
    BLOCK_COORDS_JSON, EIGENVALUES_ARCHIVE, EIGENVALUES_PLOT, EIGENVALUES_TEXT, LLT_HEATMAP, L_HEATMAP,
    MATRIX_LLT_TEXT, MATRIX_L_ARCHIVE, MATRIX_L_TEXT, POLYNOMIAL_ARCHIVE, POLYNOMIAL_SIMPLE_TEXT, POLYNOMIAL_TEXT,
    RANK_TEXT,
};
use matrix_analysis::persist::load_archive;
use matrix_analysis::{load_matrix, run_pipeline, BlockCoordinateMap, PipelineConfig, SizeParameters};
use tempfile::tempdir;

const ALL_FILES: [&str; 12] = [
    MATRIX_L_TEXT,
    MATRIX_L_ARCHIVE,
    L_HEATMAP,
    BLOCK_COORDS_JSON,
    MATRIX_LLT_TEXT,
    LLT_HEATMAP,
    EIGENVALUES_TEXT,
    EIGENVALUES_ARCHIVE,
    EIGENVALUES_PLOT,
    POLYNOMIAL_TEXT,
    POLYNOMIAL_ARCHIVE,
    RANK_TEXT,
];

#[test]
fn test_default_run_writes_every_artifact() {
    let dir = tempdir().unwrap();
    let config = PipelineConfig::new(SizeParameters::default(), dir.path());
    let summary = run_pipeline(&config).unwrap();

    assert_eq!(summary.failures().count(), 0);
    assert_eq!(summary.l_shape, (71, 154));
    assert_eq!(summary.llt_shape, (71, 71));
    assert_eq!(summary.rank_l, summary.rank_llt);
    assert_eq!(summary.eigenvalues.len(), 71);

    for name in ALL_FILES {
        assert!(dir.path().join(name).is_file(), "{name} missing");
    }
    assert!(!dir.path().join(POLYNOMIAL_SIMPLE_TEXT).exists());
    assert_eq!(summary.written().len(), ALL_FILES.len());

    let l = load_matrix(&dir.path().join(MATRIX_L_ARCHIVE)).unwrap();
    assert_eq!(l.shape(), (71, 154));

    let json = std::fs::read_to_string(dir.path().join(BLOCK_COORDS_JSON)).unwrap();
    let coords: BlockCoordinateMap = serde_json::from_str(&json).unwrap();
    assert_eq!(coords.vlines, vec![60, 100, 130, 154]);

    let rank_text = std::fs::read_to_string(dir.path().join(RANK_TEXT)).unwrap();
    assert!(rank_text.contains("Size of L: 71 x 154"));
    assert!(rank_text.contains(&format!("Rank of L*L^T: {}", summary.rank_llt)));

    let eigen = load_archive(&dir.path().join(EIGENVALUES_ARCHIVE)).unwrap();
    assert_eq!(eigen[0].1.shape(), (71, 1));
    assert_eq!(eigen[1].1.shape(), (71, 71));
    assert_eq!(eigen[2].0, "rank");
    assert_eq!(eigen[2].1[[0, 0]], summary.rank_llt as f64);

    let poly = load_archive(&dir.path().join(POLYNOMIAL_ARCHIVE)).unwrap();
    assert_eq!(poly[0].1.shape(), (1, 72));
}

#[test]
fn test_run_creates_nested_output_dir() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("a").join("b");
    let config = PipelineConfig {
        skip_plots: true,
        ..PipelineConfig::new(SizeParameters::new(1, 1, 1, 1, 1).unwrap(), &out)
    };
    let summary = run_pipeline(&config).unwrap();
    assert_eq!(summary.failures().count(), 0);
    assert!(out.join(RANK_TEXT).is_file());
    assert!(!out.join(EIGENVALUES_PLOT).exists());
}

#[test]
fn test_failed_artifact_does_not_stop_the_run() {
    let dir = tempdir().unwrap();
    // occupy the L text table path with a directory
    std::fs::create_dir(dir.path().join(MATRIX_L_TEXT)).unwrap();
    let config = PipelineConfig {
        skip_plots: true,
        ..PipelineConfig::new(SizeParameters::default(), dir.path())
    };
    let summary = run_pipeline(&config).unwrap();

    let failed: Vec<&str> = summary.failures().map(|o| o.name.as_str()).collect();
    assert_eq!(failed, vec!["L text table"]);
    assert!(dir.path().join(RANK_TEXT).is_file());
    assert!(dir.path().join(MATRIX_L_ARCHIVE).is_file());
}

#[test]
fn test_archive_fallback_keeps_text_table() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join(MATRIX_L_ARCHIVE)).unwrap();
    let config = PipelineConfig {
        skip_plots: true,
        ..PipelineConfig::new(SizeParameters::default(), dir.path())
    };
    let summary = run_pipeline(&config).unwrap();
    assert_eq!(summary.failures().count(), 0);

    let fallback = dir.path().join("matrix_L.mgz.txt");
    let archive = summary.outcomes.iter().find(|o| o.name == "L archive").unwrap();
    assert_eq!(archive.paths(), &[fallback.clone()]);
    assert_eq!(load_matrix(&fallback).unwrap().shape(), (71, 154));

    // the 8.4 table written earlier is left alone
    let table = std::fs::read_to_string(dir.path().join(MATRIX_L_TEXT)).unwrap();
    assert!(table.lines().nth(1).unwrap().starts_with(" -1.0000"));

    let mut written = summary.written();
    let total = written.len();
    written.sort();
    written.dedup();
    assert_eq!(written.len(), total);
}

#[test]
fn test_empty_rows_run() {
    let dir = tempdir().unwrap();
    let config = PipelineConfig::new(SizeParameters::new(0, 2, 3, 4, 5).unwrap(), dir.path());
    let summary = run_pipeline(&config).unwrap();
    assert_eq!(summary.l_shape, (0, 154));
    assert_eq!(summary.rank_l, 0);
    assert!(dir.path().join(POLYNOMIAL_TEXT).is_file());
}

#[test]
fn test_invalid_tolerance_is_fatal() {
    let dir = tempdir().unwrap();
    let config = PipelineConfig {
        rank_tol: -1.0,
        ..PipelineConfig::new(SizeParameters::default(), dir.path())
    };
    assert!(run_pipeline(&config).is_err());
}
