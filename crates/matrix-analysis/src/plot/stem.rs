//! Stem plot of an eigenvalue spectrum.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use super::plot_err;
use crate::error::Result;

/// Image size of [`save_eigenvalue_stem`]
pub const STEM_PLOT_SIZE: (u32, u32) = (1000, 600);

/// Plot `values` sorted in descending order as blue stems on a red baseline
pub fn save_eigenvalue_stem(path: &Path, values: &[f64], title: &str) -> Result<()> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| b.total_cmp(a));
    {
        let root = BitMapBackend::new(path, STEM_PLOT_SIZE).into_drawing_area();
        draw_stem(&root, &sorted, title)?;
        root.present().map_err(plot_err)?;
    }
    debug!(path = %path.display(), count = values.len(), "saved eigenvalue plot");
    Ok(())
}

fn value_range(values: &[f64]) -> (f64, f64) {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (lo, hi) = finite.fold((0.0f64, 0.0f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = ((hi - lo) * 0.05).max(1e-3);
    (lo - pad, hi + pad)
}

fn draw_stem<DB: DrawingBackend>(root: &DrawingArea<DB, Shift>, values: &[f64], title: &str) -> Result<()> {
    root.fill(&WHITE).map_err(plot_err)?;

    let n = values.len();
    let (y_lo, y_hi) = value_range(values);
    let x_hi = n as f64 + 1.0;

    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0f64..x_hi, y_lo..y_hi)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .x_desc("Index")
        .y_desc("Eigenvalue")
        .light_line_style(BLACK.mix(0.1))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(0.0, 0.0), (x_hi, 0.0)],
            RED.stroke_width(1),
        )))
        .map_err(plot_err)?;

    let points: Vec<(f64, f64)> = values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_finite())
        .map(|(i, &v)| ((i + 1) as f64, v))
        .collect();

    chart
        .draw_series(
            points
                .iter()
                .map(|&(x, y)| PathElement::new(vec![(x, 0.0), (x, y)], BLUE.stroke_width(1))),
        )
        .map_err(plot_err)?;
    chart
        .draw_series(points.iter().map(|&p| Circle::new(p, 3, BLUE.filled())))
        .map_err(plot_err)?;
    Ok(())
}
