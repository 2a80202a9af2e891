//! Saving and loading matrices.
//!
//! Two formats are supported:
//!
//! - a gzip-compressed archive of named matrices (`.mgz`), little-endian
//!   `u64` shapes followed by row-major `f64` data;
//! - a plain-text table with a `# matrix {rows}x{cols}` header and one line
//!   per row.
//!
//! [`save_matrix`] writes the archive and falls back to the text table when
//! that fails.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::NamedTempFile;
use tracing::{debug, error, warn};

use crate::dense::Matrix;
use crate::error::{MatrixAnalysisError, Result};
use crate::report::{write_to_path, write_vector_report};

/// Leading bytes of the decompressed archive stream
pub const ARCHIVE_MAGIC: &[u8; 8] = b"MATARCH1";

/// File extension used for archives
pub const ARCHIVE_EXTENSION: &str = "mgz";

/// Entry name used by [`save_matrix`]
pub const DEFAULT_ENTRY: &str = "matrix";

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Format written by [`save_matrix`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SavedFormat {
    Archive,
    TextTable,
}

/// Where and how a matrix ended up on disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub format: SavedFormat,
}

/// Column formatting of the text table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextTableOptions {
    /// Minimum field width per value
    pub width: usize,
    /// Digits after the decimal point
    pub precision: usize,
}

impl Default for TextTableOptions {
    fn default() -> Self {
        Self {
            width: 15,
            precision: 8,
        }
    }
}

impl TextTableOptions {
    pub fn new(width: usize, precision: usize) -> Self {
        Self { width, precision }
    }
}

fn parse_error(path: &Path, line: usize, message: impl Into<String>) -> MatrixAnalysisError {
    MatrixAnalysisError::Parse {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

fn target_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

// ============================================================================
// Archive
// ============================================================================

fn write_archive<W: Write>(w: &mut W, entries: &[(&str, &Matrix<f64>)]) -> io::Result<()> {
    let count = u32::try_from(entries.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "too many archive entries"))?;
    w.write_all(ARCHIVE_MAGIC)?;
    w.write_u32::<LittleEndian>(count)?;
    for (name, m) in entries {
        let name_len = u16::try_from(name.len())
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "entry name too long"))?;
        w.write_u16::<LittleEndian>(name_len)?;
        w.write_all(name.as_bytes())?;
        w.write_u64::<LittleEndian>(m.nrows() as u64)?;
        w.write_u64::<LittleEndian>(m.ncols() as u64)?;
        for &v in m.as_slice() {
            w.write_f64::<LittleEndian>(v)?;
        }
    }
    Ok(())
}

/// Write named matrices into a compressed archive at `path`.
///
/// Data goes to a temporary file next to `path` which is renamed into place
/// once complete, so an existing file is never left truncated.
pub fn save_archive(path: &Path, entries: &[(&str, &Matrix<f64>)]) -> Result<()> {
    let io_err = |e: io::Error| MatrixAnalysisError::io(path, e);

    let tmp = NamedTempFile::new_in(target_dir(path)).map_err(io_err)?;
    {
        let mut encoder = GzEncoder::new(BufWriter::new(tmp.as_file()), Compression::default());
        write_archive(&mut encoder, entries).map_err(io_err)?;
        encoder.finish().and_then(|mut w| w.flush()).map_err(io_err)?;
    }
    tmp.persist(path).map_err(|e| io_err(e.error))?;

    debug!(path = %path.display(), entries = entries.len(), "saved archive");
    Ok(())
}

/// Read every entry of an archive written by [`save_archive`], in order
pub fn load_archive(path: &Path) -> Result<Vec<(String, Matrix<f64>)>> {
    let io_err = |e: io::Error| MatrixAnalysisError::io(path, e);

    let file = File::open(path).map_err(io_err)?;
    let mut r = GzDecoder::new(BufReader::new(file));

    let mut magic = [0u8; 8];
    r.read_exact(&mut magic).map_err(io_err)?;
    if &magic != ARCHIVE_MAGIC {
        return Err(parse_error(path, 0, "not a matrix archive"));
    }

    let count = r.read_u32::<LittleEndian>().map_err(io_err)?;
    let mut entries = Vec::new();
    for _ in 0..count {
        let name_len = r.read_u16::<LittleEndian>().map_err(io_err)?;
        let mut name = vec![0u8; name_len as usize];
        r.read_exact(&mut name).map_err(io_err)?;
        let name = String::from_utf8(name).map_err(|_| parse_error(path, 0, "entry name is not UTF-8"))?;

        let nrows = read_extent(&mut r, path)?;
        let ncols = read_extent(&mut r, path)?;
        let len = nrows
            .checked_mul(ncols)
            .ok_or_else(|| parse_error(path, 0, format!("entry {name} shape overflows")))?;

        let mut data = Vec::with_capacity(len.min(1 << 20));
        for _ in 0..len {
            data.push(r.read_f64::<LittleEndian>().map_err(io_err)?);
        }
        entries.push((name, Matrix::from_row_major(nrows, ncols, data)?));
    }
    Ok(entries)
}

fn read_extent<R: Read>(r: &mut R, path: &Path) -> Result<usize> {
    let v = r
        .read_u64::<LittleEndian>()
        .map_err(|e| MatrixAnalysisError::io(path, e))?;
    usize::try_from(v).map_err(|_| parse_error(path, 0, format!("extent {v} does not fit in usize")))
}

// ============================================================================
// Text table
// ============================================================================

pub fn write_text_table<W: Write>(w: &mut W, m: &Matrix<f64>, opts: &TextTableOptions) -> io::Result<()> {
    writeln!(w, "# matrix {}x{}", m.nrows(), m.ncols())?;
    for row in m.rows() {
        let line: Vec<String> = row
            .iter()
            .map(|v| format!("{:>width$.prec$}", v, width = opts.width, prec = opts.precision))
            .collect();
        writeln!(w, "{}", line.join(" "))?;
    }
    Ok(())
}

pub fn save_text_table(path: &Path, m: &Matrix<f64>, opts: &TextTableOptions) -> Result<()> {
    write_to_path(path, |w| write_text_table(w, m, opts))?;
    debug!(path = %path.display(), shape = ?m.shape(), "saved text table");
    Ok(())
}

fn parse_header(line: &str) -> Option<(usize, usize)> {
    let dims = line.trim().strip_prefix('#')?.trim().strip_prefix("matrix")?.trim();
    let (r, c) = dims.split_once('x')?;
    Some((r.trim().parse().ok()?, c.trim().parse().ok()?))
}

/// Read a text table.
///
/// The `# matrix {rows}x{cols}` header is optional; without it the shape is
/// inferred from the rows, which must all have the same length.
pub fn load_text_table(path: &Path) -> Result<Matrix<f64>> {
    let file = File::open(path).map_err(|e| MatrixAnalysisError::io(path, e))?;
    let reader = BufReader::new(file);

    let mut header = None;
    let mut rows: Vec<Vec<f64>> = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| MatrixAnalysisError::io(path, e))?;
        let lineno = idx + 1;
        let trimmed = line.trim();
        if trimmed.starts_with('#') {
            if header.is_none() {
                header = parse_header(trimmed);
            }
            continue;
        }
        if trimmed.is_empty() {
            continue;
        }
        let row = trimmed
            .split_whitespace()
            .map(|tok| {
                tok.parse::<f64>()
                    .map_err(|e| parse_error(path, lineno, format!("invalid value {tok:?}: {e}")))
            })
            .collect::<Result<Vec<f64>>>()?;
        if let Some(first) = rows.first() {
            if first.len() != row.len() {
                return Err(parse_error(
                    path,
                    lineno,
                    format!("expected {} values, found {}", first.len(), row.len()),
                ));
            }
        }
        rows.push(row);
    }

    let (nrows, ncols) = match header {
        Some((nrows, 0)) if rows.is_empty() => return Ok(Matrix::zeros(nrows, 0)),
        Some(shape) => shape,
        None => (rows.len(), rows.first().map_or(0, Vec::len)),
    };
    let found_cols = rows.first().map_or(ncols, Vec::len);
    if rows.len() != nrows || found_cols != ncols {
        return Err(parse_error(
            path,
            0,
            format!("header declares {nrows}x{ncols}, found {}x{found_cols}", rows.len()),
        ));
    }
    Matrix::from_row_major(nrows, ncols, rows.into_iter().flatten().collect())
}

// ============================================================================
// Format-agnostic entry points
// ============================================================================

/// `path` with `.txt` appended, so `matrix_L.mgz` falls back to `matrix_L.mgz.txt`
pub fn text_fallback_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".txt");
    PathBuf::from(name)
}

/// Save `m` as an archive, falling back to a text table.
///
/// When the archive cannot be written a warning is logged and the matrix is
/// written once more as a text table at [`text_fallback_path`]. If that also
/// fails the text-table error is returned.
pub fn save_matrix(path: &Path, m: &Matrix<f64>) -> Result<SaveOutcome> {
    match save_archive(path, &[(DEFAULT_ENTRY, m)]) {
        Ok(()) => Ok(SaveOutcome {
            path: path.to_path_buf(),
            format: SavedFormat::Archive,
        }),
        Err(archive_err) => {
            let fallback = text_fallback_path(path);
            warn!(
                path = %path.display(),
                fallback = %fallback.display(),
                error = %archive_err,
                "archive save failed, writing text table instead"
            );
            match save_text_table(&fallback, m, &TextTableOptions::default()) {
                Ok(()) => Ok(SaveOutcome {
                    path: fallback,
                    format: SavedFormat::TextTable,
                }),
                Err(text_err) => {
                    error!(path = %fallback.display(), error = %text_err, "text table fallback failed");
                    Err(text_err)
                }
            }
        }
    }
}

/// Load a matrix saved by [`save_matrix`], detecting the format from the file.
///
/// For an archive the first entry is returned.
pub fn load_matrix(path: &Path) -> Result<Matrix<f64>> {
    let mut file = File::open(path).map_err(|e| MatrixAnalysisError::io(path, e))?;
    let mut magic = [0u8; 2];
    let n = file.read(&mut magic).map_err(|e| MatrixAnalysisError::io(path, e))?;
    drop(file);

    if n == magic.len() && magic == GZIP_MAGIC {
        load_archive(path)?
            .into_iter()
            .next()
            .map(|(_, m)| m)
            .ok_or_else(|| parse_error(path, 0, "archive holds no entries"))
    } else {
        load_text_table(path)
    }
}

/// Write `values` as a numbered list under `description`
pub fn save_vector(path: &Path, description: &str, values: &[f64]) -> Result<()> {
    write_to_path(path, |w| write_vector_report(w, description, values))
}
