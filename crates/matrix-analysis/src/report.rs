//! Human-readable text reports for eigenvalues, polynomials and ranks.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{MatrixAnalysisError, Result};

const RULE: &str = "===========================================";
const WIDE_RULE: &str = "========================================================";

/// Coefficients with magnitude below this are omitted from the readable polynomial
pub const POLY_ZERO_TOL: f64 = 1e-10;

/// Local time formatted for report headers
pub fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Format with `digits` significant digits, trailing zeros trimmed (like `%g`)
pub fn format_significant(x: f64, digits: usize) -> String {
    if x == 0.0 || !x.is_finite() {
        return format!("{x}");
    }
    let digits = digits.max(1);
    let exp = x.abs().log10().floor() as i32;
    if exp < -5 || exp >= digits as i32 {
        let s = format!("{:.*e}", digits - 1, x);
        match s.split_once('e') {
            Some((mantissa, exponent)) => format!("{}e{}", trim_zeros(mantissa), exponent),
            None => s,
        }
    } else {
        let decimals = (digits as i32 - 1 - exp).max(0) as usize;
        trim_zeros(&format!("{:.*}", decimals, x)).to_string()
    }
}

fn trim_zeros(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// Render `det(λI - A)` from coefficients (highest degree first)
///
/// Near-zero coefficients are skipped except the constant term, and unit
/// coefficients are not printed.
pub fn format_polynomial(coeffs: &[f64]) -> String {
    let Some(degree) = coeffs.len().checked_sub(1) else {
        return String::new();
    };

    let mut out = String::new();
    for (i, &coef) in coeffs.iter().enumerate() {
        let power = degree - i;
        if coef.abs() < POLY_ZERO_TOL && power > 0 {
            continue;
        }
        let coef = if coef.abs() < POLY_ZERO_TOL { 0.0 } else { coef };

        let magnitude = coef.abs();
        if out.is_empty() {
            if coef < 0.0 {
                out.push('-');
            }
        } else if coef < 0.0 {
            out.push_str(" - ");
        } else {
            out.push_str(" + ");
        }

        let unit = (magnitude - 1.0).abs() < POLY_ZERO_TOL;
        let term = match power {
            0 => format_significant(magnitude, 10),
            1 if unit => "λ".to_string(),
            1 => format!("{}*λ", format_significant(magnitude, 10)),
            _ if unit => format!("λ^{power}"),
            _ => format!("{}*λ^{power}", format_significant(magnitude, 10)),
        };
        out.push_str(&term);
    }
    out
}

/// Inputs of the eigenvalue report
#[derive(Debug, Clone, Copy)]
pub struct EigenReport<'a> {
    pub name: &'a str,
    pub shape: (usize, usize),
    pub rank: usize,
    /// Eigenvalues in the order they are listed (descending)
    pub eigenvalues: &'a [f64],
}

/// Ranks of `L` and `L·Lᵗ` for the rank report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankSummary {
    pub l_shape: (usize, usize),
    pub llt_shape: (usize, usize),
    pub rank_l: usize,
    pub rank_llt: usize,
}

pub fn write_eigen_report<W: Write>(w: &mut W, created: &str, report: &EigenReport<'_>) -> std::io::Result<()> {
    writeln!(w, "EIGENVALUE ANALYSIS OF MATRIX {}", report.name)?;
    writeln!(w, "{RULE}\n")?;
    writeln!(w, "Created: {created}\n")?;
    writeln!(w, "MATRIX SIZE: {} x {}\n", report.shape.0, report.shape.1)?;
    writeln!(w, "MATRIX RANK: {}\n", report.rank)?;
    writeln!(w, "EIGENVALUES (sorted in descending order):")?;
    writeln!(w, "{WIDE_RULE}\n")?;
    for (i, v) in report.eigenvalues.iter().enumerate() {
        writeln!(w, "  λ{} = {}", i + 1, format_significant(*v, 15))?;
    }
    Ok(())
}

pub fn write_polynomial_report<W: Write>(
    w: &mut W,
    created: &str,
    name: &str,
    shape: (usize, usize),
    coeffs: &[f64],
) -> std::io::Result<()> {
    writeln!(w, "CHARACTERISTIC POLYNOMIAL OF MATRIX {name}")?;
    writeln!(w, "{RULE}\n")?;
    writeln!(w, "Created: {created}\n")?;
    writeln!(w, "Matrix size: {} x {}\n", shape.0, shape.1)?;
    writeln!(w, "Characteristic polynomial det(λI - A):")?;
    writeln!(w, "{}\n", format_polynomial(coeffs))?;
    writeln!(w, "Polynomial coefficients (descending powers):")?;
    let listed: Vec<String> = coeffs.iter().map(|c| format_significant(*c, 15)).collect();
    writeln!(w, "[{}]", listed.join(", "))?;
    Ok(())
}

/// Bare coefficient listing, used when the full polynomial report cannot be produced
pub fn write_simple_polynomial_report<W: Write>(w: &mut W, name: &str, coeffs: &[f64]) -> std::io::Result<()> {
    writeln!(w, "CHARACTERISTIC POLYNOMIAL COEFFICIENTS OF MATRIX {name}")?;
    writeln!(w, "{WIDE_RULE}\n")?;
    writeln!(w, "Coefficients in descending order of degree:")?;
    let degree = coeffs.len().saturating_sub(1);
    for (i, c) in coeffs.iter().enumerate() {
        writeln!(w, "a{} = {}", degree - i, format_significant(*c, 15))?;
    }
    Ok(())
}

pub fn write_rank_report<W: Write>(w: &mut W, created: &str, summary: &RankSummary) -> std::io::Result<()> {
    writeln!(w, "MATRIX RANK ANALYSIS")?;
    writeln!(w, "{RULE}\n")?;
    writeln!(w, "Created: {created}\n")?;
    writeln!(w, "Size of L: {} x {}", summary.l_shape.0, summary.l_shape.1)?;
    writeln!(w, "Size of L*L^T: {} x {}\n", summary.llt_shape.0, summary.llt_shape.1)?;
    writeln!(w, "Rank of L*L^T: {}", summary.rank_llt)?;
    writeln!(w, "\nNote: the rank of a matrix is the number of linearly independent rows or columns.")?;
    writeln!(w, "For the symmetric matrix L*L^T the rank equals the number of non-zero eigenvalues.")?;
    writeln!(w, "{RULE}\n")?;
    writeln!(w, "Rank of L:")?;
    writeln!(w, "  {}\n", summary.rank_l)?;
    Ok(())
}

pub fn write_vector_report<W: Write>(w: &mut W, description: &str, values: &[f64]) -> std::io::Result<()> {
    writeln!(w, "{description}")?;
    writeln!(w, "{RULE}\n")?;
    for (i, v) in values.iter().enumerate() {
        writeln!(w, "Value {}: {:.10}", i + 1, v)?;
    }
    Ok(())
}

/// Create `path` and run `write` on a buffered writer, tagging errors with the path
pub fn write_to_path<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
{
    let file = File::create(path).map_err(|e| MatrixAnalysisError::io(path, e))?;
    let mut w = BufWriter::new(file);
    write(&mut w)
        .and_then(|_| w.flush())
        .map_err(|e| MatrixAnalysisError::io(path, e))
}
