//! Saving and reloading `L`.

use matrix_analysis::persist::{load_archive, load_text_table, save_text_table};
use matrix_analysis::{build_l_matrix, load_matrix, save_matrix, MatrixAnalysisError, SavedFormat, TextTableOptions};
use tempfile::tempdir;

#[test]
fn test_archive_roundtrip_of_l() {
    let dir = tempdir().unwrap();
    let (l, _) = build_l_matrix(1, 2, 3, 4, 5).unwrap();
    let path = dir.path().join("matrix_L.mgz");

    let outcome = save_matrix(&path, &l).unwrap();
    assert_eq!(outcome.format, SavedFormat::Archive);
    assert_eq!(outcome.path, path);

    let back = load_matrix(&path).unwrap();
    assert_eq!(back.shape(), (71, 154));
    assert!(back.max_abs_diff(&l).unwrap() < 1e-8);

    let entries = load_archive(&path).unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "matrix");
}

#[test]
fn test_text_roundtrip_with_custom_width() {
    let dir = tempdir().unwrap();
    let (l, _) = build_l_matrix(1, 2, 3, 4, 5).unwrap();
    let path = dir.path().join("matrix_L.txt");

    save_text_table(&path, &l, &TextTableOptions::new(8, 4)).unwrap();
    let first_row = std::fs::read_to_string(&path).unwrap().lines().nth(1).unwrap().to_string();
    assert!(first_row.starts_with(" -1.0000"));

    let back = load_text_table(&path).unwrap();
    assert!(back.max_abs_diff(&l).unwrap() < 1e-8);
}

#[test]
fn test_falls_back_to_text_when_archive_fails() {
    let dir = tempdir().unwrap();
    let (l, _) = build_l_matrix(1, 1, 2, 1, 2).unwrap();
    // a directory at the target path makes the archive rename fail
    let path = dir.path().join("matrix_L.mgz");
    std::fs::create_dir(&path).unwrap();

    let outcome = save_matrix(&path, &l).unwrap();
    assert_eq!(outcome.format, SavedFormat::TextTable);
    assert_eq!(outcome.path, dir.path().join("matrix_L.mgz.txt"));
    assert!(load_matrix(&outcome.path).unwrap().max_abs_diff(&l).unwrap() < 1e-8);
}

#[test]
fn test_both_formats_failing_reports_io() {
    let dir = tempdir().unwrap();
    let (l, _) = build_l_matrix(1, 1, 1, 1, 1).unwrap();
    let path = dir.path().join("missing").join("matrix_L.mgz");
    assert!(matches!(save_matrix(&path, &l), Err(MatrixAnalysisError::Io { .. })));
}

#[test]
fn test_empty_matrix_roundtrip() {
    let dir = tempdir().unwrap();
    let (l, _) = build_l_matrix(0, 2, 3, 4, 5).unwrap();
    let archive = dir.path().join("empty.mgz");
    save_matrix(&archive, &l).unwrap();
    assert_eq!(load_matrix(&archive).unwrap().shape(), (0, 154));

    let text = dir.path().join("empty.txt");
    save_text_table(&text, &l, &TextTableOptions::default()).unwrap();
    assert_eq!(load_text_table(&text).unwrap().shape(), (0, 154));
}
