//! Assembly of the structured block matrix `L`.
//!
//! `L` is the vertical stack of six row-groups. Every row-group is the
//! horizontal concatenation of sub-blocks aligned with four column segments
//! of widths `n2·n3·n4`, `n1·n3·n4`, `n1·n2·n4` and `n1·n2·n3`. Non-zero
//! sub-blocks are signed Kronecker products of identity matrices and one
//! `ones[n_minus1 × k]` factor, so every row-group height carries a factor
//! `n_minus1`.
//!
//! # Example
//!
//! ```
//! use matrix_analysis::build_l_matrix;
//!
//! let (l, coords) = build_l_matrix(1, 2, 3, 4, 5).unwrap();
//! assert_eq!(l.shape(), (71, 154));
//! assert_eq!(coords.main_blocks.len(), 6);
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::coords::BlockCoordinateMap;
use crate::dense::{eye, hstack, kron_all, ones, vstack, zeros, Matrix};
use crate::error::{MatrixAnalysisError, Result};

/// Number of row-groups in `L`
pub const NUM_ROW_GROUPS: usize = 6;

/// Size parameters of the `L` matrix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeParameters {
    /// Row count of every "ones" Kronecker factor
    pub n_minus1: usize,
    pub n1: usize,
    pub n2: usize,
    pub n3: usize,
    pub n4: usize,
}

impl Default for SizeParameters {
    fn default() -> Self {
        Self {
            n_minus1: 1,
            n1: 2,
            n2: 3,
            n3: 4,
            n4: 5,
        }
    }
}

impl SizeParameters {
    /// Validate signed size parameters.
    ///
    /// # Errors
    /// `InvalidDimension` if any parameter is negative, `DimensionOverflow`
    /// if a block extent does not fit in `usize`.
    pub fn new(n_minus1: i64, n1: i64, n2: i64, n3: i64, n4: i64) -> Result<Self> {
        let params = Self {
            n_minus1: non_negative("n_minus1", n_minus1)?,
            n1: non_negative("n1", n1)?,
            n2: non_negative("n2", n2)?,
            n3: non_negative("n3", n3)?,
            n4: non_negative("n4", n4)?,
        };
        params.layout()?;
        Ok(params)
    }

    /// Widths of the four column segments
    pub fn segment_widths(&self) -> Result<[usize; 4]> {
        let Self { n1, n2, n3, n4, .. } = *self;
        Ok([
            product("segment 1 width", &[n2, n3, n4])?,
            product("segment 2 width", &[n1, n3, n4])?,
            product("segment 3 width", &[n1, n2, n4])?,
            product("segment 4 width", &[n1, n2, n3])?,
        ])
    }

    /// Heights of the six row-groups
    pub fn group_heights(&self) -> Result<[usize; NUM_ROW_GROUPS]> {
        let Self {
            n_minus1: m,
            n1,
            n2,
            n3,
            n4,
        } = *self;
        Ok([
            product("row-group 1 height", &[m, n3, n4])?,
            product("row-group 2 height", &[m, n2, n4])?,
            product("row-group 3 height", &[m, n1, n4])?,
            product("row-group 4 height", &[m, n2, n3])?,
            product("row-group 5 height", &[m, n1, n3])?,
            product("row-group 6 height", &[m, n1, n2])?,
        ])
    }

    /// Shape `(rows, cols)` that [`build`] produces for these parameters
    pub fn expected_shape(&self) -> Result<(usize, usize)> {
        let rows = checked_sum("total rows", &self.group_heights()?)?;
        let cols = checked_sum("total columns", &self.segment_widths()?)?;
        Ok((rows, cols))
    }

    fn layout(&self) -> Result<Vec<RowGroup>> {
        let Self {
            n_minus1: m,
            n1,
            n2,
            n3,
            n4,
        } = *self;
        let [s1, s2, s3, s4] = self.segment_widths()?;
        let [h1, h2, h3, h4, h5, h6] = self.group_heights()?;
        // totals are checked here so the merged zero widths below cannot overflow
        self.expected_shape()?;
        let n1n2 = product("n1·n2", &[n1, n2])?;
        let n1n3 = product("n1·n3", &[n1, n3])?;
        let n2n3 = product("n2·n3", &[n2, n3])?;
        let n2n4 = product("n2·n4", &[n2, n4])?;
        let n3n4 = product("n3·n4", &[n3, n4])?;

        use Factor::{Eye, Ones};
        use Piece::{Kron, Zero};

        Ok(vec![
            RowGroup {
                height: h1,
                pieces: vec![
                    Kron(-1.0, vec![Ones(m, n2), Eye(n3n4)]),
                    Kron(1.0, vec![Ones(m, n1), Eye(n3n4)]),
                    Zero(s3 + s4),
                ],
            },
            RowGroup {
                height: h2,
                pieces: vec![
                    Kron(-1.0, vec![Eye(n2), Ones(m, n3), Eye(n4)]),
                    Zero(s2),
                    Kron(1.0, vec![Ones(m, n1), Eye(n2n4)]),
                    Zero(s4),
                ],
            },
            RowGroup {
                height: h3,
                pieces: vec![
                    Zero(s1),
                    Kron(-1.0, vec![Eye(n1), Ones(m, n3), Eye(n4)]),
                    Kron(1.0, vec![Eye(n1), Ones(m, n2), Eye(n4)]),
                    Zero(s4),
                ],
            },
            RowGroup {
                height: h4,
                pieces: vec![
                    Kron(-1.0, vec![Eye(n2n3), Ones(m, n4)]),
                    Zero(s2 + s3),
                    Kron(1.0, vec![Ones(m, n1), Eye(n2n3)]),
                ],
            },
            RowGroup {
                height: h5,
                pieces: vec![
                    Zero(s1),
                    Kron(-1.0, vec![Eye(n1n3), Ones(m, n4)]),
                    Zero(s3),
                    Kron(1.0, vec![Eye(n1), Ones(m, n2), Eye(n3)]),
                ],
            },
            RowGroup {
                height: h6,
                pieces: vec![
                    Zero(s1 + s2),
                    Kron(-1.0, vec![Eye(n1n2), Ones(m, n4)]),
                    Kron(1.0, vec![Eye(n1n2), Ones(m, n3)]),
                ],
            },
        ])
    }
}

/// One factor of a Kronecker chain
#[derive(Debug, Clone, Copy)]
enum Factor {
    /// `ones[rows × cols]`
    Ones(usize, usize),
    /// `I[n]`
    Eye(usize),
}

impl Factor {
    fn shape(self) -> (usize, usize) {
        match self {
            Factor::Ones(r, c) => (r, c),
            Factor::Eye(n) => (n, n),
        }
    }

    fn to_matrix(self) -> Matrix<f64> {
        match self {
            Factor::Ones(r, c) => ones(r, c),
            Factor::Eye(n) => eye(n),
        }
    }
}

/// One sub-block of a row-group
#[derive(Debug, Clone)]
enum Piece {
    /// Signed Kronecker product of the factors, left to right
    Kron(f64, Vec<Factor>),
    /// All-zero block of the given width (height taken from the row-group)
    Zero(usize),
}

#[derive(Debug, Clone)]
struct RowGroup {
    height: usize,
    pieces: Vec<Piece>,
}

impl RowGroup {
    fn assemble(&self) -> Vec<Matrix<f64>> {
        self.pieces
            .iter()
            .map(|piece| match piece {
                Piece::Kron(sign, factors) => {
                    let (rows, cols) = factors.iter().fold((1usize, 1usize), |(r, c), f| {
                        let (fr, fc) = f.shape();
                        (r.saturating_mul(fr), c.saturating_mul(fc))
                    });
                    if rows == 0 || cols == 0 {
                        // skip materializing identity factors of an empty product
                        return zeros(rows, cols);
                    }
                    let factors: Vec<Matrix<f64>> =
                        factors.iter().map(|f| f.to_matrix()).collect();
                    kron_all(&factors).scale(*sign)
                }
                Piece::Zero(width) => zeros(self.height, *width),
            })
            .collect()
    }
}

/// The assembled `L` matrix together with its block coordinates
#[derive(Debug, Clone)]
pub struct BlockMatrix {
    pub params: SizeParameters,
    pub matrix: Matrix<f64>,
    pub coords: BlockCoordinateMap,
}

/// Build `L` and its coordinate map from validated parameters
pub fn build(params: &SizeParameters) -> Result<BlockMatrix> {
    let groups = params.layout()?;
    let segment_widths = params.segment_widths()?;

    let mut stacked = Vec::with_capacity(groups.len());
    let mut shapes = Vec::with_capacity(groups.len());
    for group in &groups {
        let sub_blocks = group.assemble();
        shapes.push(sub_blocks.iter().map(|b| b.shape()).collect::<Vec<_>>());
        stacked.push(hstack(&sub_blocks)?);
    }

    let matrix = vstack(&stacked)?;
    let coords = BlockCoordinateMap::from_shapes(&shapes, &segment_widths);

    debug!(
        rows = matrix.nrows(),
        cols = matrix.ncols(),
        sub_blocks = coords.sub_blocks.len(),
        "assembled L matrix"
    );

    Ok(BlockMatrix {
        params: *params,
        matrix,
        coords,
    })
}

/// Build `L` from raw size parameters.
///
/// # Errors
/// `InvalidDimension` for a negative parameter.
pub fn build_l_matrix(
    n_minus1: i64,
    n1: i64,
    n2: i64,
    n3: i64,
    n4: i64,
) -> Result<(Matrix<f64>, BlockCoordinateMap)> {
    let params = SizeParameters::new(n_minus1, n1, n2, n3, n4)?;
    let BlockMatrix { matrix, coords, .. } = build(&params)?;
    Ok((matrix, coords))
}

fn non_negative(name: &'static str, value: i64) -> Result<usize> {
    usize::try_from(value).map_err(|_| MatrixAnalysisError::InvalidDimension { name, value })
}

fn product(name: &'static str, factors: &[usize]) -> Result<usize> {
    factors
        .iter()
        .try_fold(1usize, |acc, &f| acc.checked_mul(f))
        .ok_or(MatrixAnalysisError::DimensionOverflow { name })
}

fn checked_sum(name: &'static str, values: &[usize]) -> Result<usize> {
    values
        .iter()
        .try_fold(0usize, |acc, &v| acc.checked_add(v))
        .ok_or(MatrixAnalysisError::DimensionOverflow { name })
}
