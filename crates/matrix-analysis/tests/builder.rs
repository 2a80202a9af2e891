//! Structural properties of the assembled `L` matrix.

use matrix_analysis::{build, build_l_matrix, mat_mul, matrix_rank, transpose, MatrixAnalysisError, SizeParameters};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Column sums and non-zero counts per column, grouped by column segment
fn column_profile(params: &SizeParameters) -> Vec<(f64, usize, usize)> {
    let block = build(params).unwrap();
    let l = &block.matrix;
    let widths = params.segment_widths().unwrap();

    let mut profile = Vec::with_capacity(l.ncols());
    let mut segment = 0;
    let mut seg_end = widths[0];
    for j in 0..l.ncols() {
        while j >= seg_end {
            segment += 1;
            seg_end += widths[segment];
        }
        let column: Vec<f64> = (0..l.nrows()).map(|i| l[[i, j]]).collect();
        let sum: f64 = column.iter().sum();
        let nnz = column.iter().filter(|v| **v != 0.0).count();
        profile.push((sum, nnz, segment));
    }
    profile
}

#[test]
fn test_default_shape_and_coordinates() {
    let (l, coords) = build_l_matrix(1, 2, 3, 4, 5).unwrap();
    assert_eq!(l.shape(), (71, 154));

    assert_eq!(coords.main_blocks.len(), 6);
    assert_eq!(coords.sub_blocks.len(), 21);
    assert_eq!(coords.hlines, vec![20, 35, 45, 57, 65]);
    assert_eq!(coords.vlines, vec![60, 100, 130, 154]);
    assert_eq!(coords.total_rows(), 71);

    for (g, main) in coords.main_blocks.iter().enumerate() {
        let width: usize = coords.sub_blocks_of(g).map(|s| s.cols.len).sum();
        assert_eq!(width, 154, "row-group {g}");
        for sub in coords.sub_blocks_of(g) {
            assert!(sub.rows.is_within(&main.rows));
            assert!(sub.cols.is_within(&main.cols));
        }
    }
    assert_eq!(coords.main_blocks[0].rows.inclusive(), Some((0, 19)));
}

#[test]
fn test_entries_are_signed_units() {
    let (l, _) = build_l_matrix(1, 2, 3, 4, 5).unwrap();
    assert!(l.as_slice().iter().all(|&v| v == 0.0 || v == 1.0 || v == -1.0));
}

#[test]
fn test_zero_sub_blocks_are_zero() {
    let (l, coords) = build_l_matrix(1, 2, 3, 4, 5).unwrap();
    // the merged trailing zero block of row-group 1
    let zero = coords.sub_blocks_of(0).last().unwrap();
    for i in zero.rows.start..zero.rows.end() {
        for j in zero.cols.start..zero.cols.end() {
            assert_eq!(l[[i, j]], 0.0);
        }
    }
}

#[test]
fn test_column_sums_per_segment() {
    let params = SizeParameters::default();
    for (sum, nnz, segment) in column_profile(&params) {
        assert_eq!(nnz, 3);
        assert_eq!(sum, [-3.0, -1.0, 1.0, 3.0][segment]);
    }
}

#[test]
fn test_rank_of_gram_matches_rank_of_l() {
    let (l, _) = build_l_matrix(1, 2, 3, 4, 5).unwrap();
    let llt = mat_mul(&l, &transpose(&l)).unwrap();
    assert_eq!(llt.shape(), (71, 71));
    assert!(llt.is_symmetric(0.0));
    assert_eq!(matrix_rank(&llt, None).unwrap(), matrix_rank(&l, None).unwrap());
}

#[test]
fn test_n_minus1_zero_gives_empty_rows() {
    let (l, coords) = build_l_matrix(0, 2, 3, 4, 5).unwrap();
    assert_eq!(l.shape(), (0, 154));
    assert_eq!(matrix_rank(&l, None).unwrap(), 0);
    assert!(coords.main_blocks.iter().all(|b| b.rows.inclusive().is_none()));
    assert_eq!(coords.vlines.last(), Some(&154));
}

#[test]
fn test_n_minus1_scales_row_groups() {
    let one = SizeParameters::default();
    let two = SizeParameters::new(2, 2, 3, 4, 5).unwrap();
    let h1 = one.group_heights().unwrap();
    let h2 = two.group_heights().unwrap();
    for (a, b) in h1.iter().zip(h2.iter()) {
        assert_eq!(*b, 2 * a);
    }
    let (l, _) = build_l_matrix(2, 2, 3, 4, 5).unwrap();
    assert_eq!(l.shape(), (142, 154));
}

#[test]
fn test_negative_parameters_rejected() {
    let err = build_l_matrix(1, 2, -3, 4, 5).unwrap_err();
    assert!(matches!(
        err,
        MatrixAnalysisError::InvalidDimension { name: "n2", value: -3 }
    ));
    assert!(build_l_matrix(-1, 0, 0, 0, 0).is_err());
}

#[test]
fn test_zero_axis_collapses_segments() {
    // n1 = 0 removes segments 2..4 entirely
    let (l, coords) = build_l_matrix(1, 0, 3, 4, 5).unwrap();
    assert_eq!(l.ncols(), 60);
    assert_eq!(coords.vlines, vec![60, 60, 60, 60]);
    assert_eq!(l.nrows(), 20 + 15 + 12);
}

#[test]
fn test_random_parameter_sweep() {
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    for _ in 0..40 {
        let m: i64 = rng.random_range(0..3);
        let dims: Vec<i64> = (0..4).map(|_| rng.random_range(0..4)).collect();
        let params = SizeParameters::new(m, dims[0], dims[1], dims[2], dims[3]).unwrap();

        let block = build(&params).unwrap();
        assert_eq!(block.matrix.shape(), params.expected_shape().unwrap());
        assert_eq!(block.coords.total_rows(), block.matrix.nrows());
        assert_eq!(block.coords.sub_blocks.len(), 21);

        let mains = &block.coords.main_blocks;
        assert_eq!(mains[0].rows.start, 0);
        for g in 1..mains.len() {
            assert_eq!(mains[g].rows.start, mains[g - 1].rows.end(), "row-group {g} not contiguous");
        }
        for (g, main) in mains.iter().enumerate() {
            let mut col = main.cols.start;
            for sub in block.coords.sub_blocks_of(g) {
                assert_eq!(sub.rows, main.rows);
                assert_eq!(sub.cols.start, col, "sub-block of group {g} not contiguous");
                col = sub.cols.end();
            }
            assert_eq!(col, main.cols.end());
        }

        let l = &block.matrix;
        let llt = mat_mul(l, &transpose(l)).unwrap();
        assert_eq!(matrix_rank(&llt, None).unwrap(), matrix_rank(l, None).unwrap(), "{params:?}");

        let scale = m as f64;
        for (sum, nnz, segment) in column_profile(&params) {
            assert_eq!(nnz, 3 * m as usize);
            assert_eq!(sum, scale * [-3.0, -1.0, 1.0, 3.0][segment]);
        }
    }
}
