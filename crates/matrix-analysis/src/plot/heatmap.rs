//! Matrix heatmaps.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use tracing::debug;

use super::overlay::draw_block_overlay;
use super::plot_err;
use crate::colormap::{custom_colormap, Colormap, Normalize};
use crate::coords::BlockCoordinateMap;
use crate::dense::Matrix;
use crate::error::Result;

const COLORBAR_WIDTH: u32 = 90;
const MARKER_RADIUS: i32 = 6;

/// Options for [`save_heatmap`] and [`render_heatmap`]
#[derive(Debug, Clone)]
pub struct HeatmapOptions {
    pub title: String,
    /// Colormap constructor
    pub colormap: fn() -> Colormap,
    /// Mark the maximum (red) and minimum (green) and report them in the title
    pub highlight_extremes: bool,
    /// Color limits, `±max|A|` when `None`
    pub clim: Option<(f64, f64)>,
    /// Draw a colorbar to the right of the cells
    pub colorbar: bool,
    /// Image size in pixels
    pub size: (u32, u32),
}

impl Default for HeatmapOptions {
    fn default() -> Self {
        Self {
            title: "Matrix Heatmap".to_string(),
            colormap: custom_colormap,
            highlight_extremes: false,
            clim: None,
            colorbar: true,
            size: (1200, 1000),
        }
    }
}

impl HeatmapOptions {
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    fn normalize(&self, m: &Matrix<f64>) -> Normalize {
        match self.clim {
            Some((vmin, vmax)) => Normalize::new(vmin, vmax),
            None => Normalize::symmetric(m.max_abs()),
        }
    }
}

/// In-memory RGB image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGB triples
    pub pixels: Vec<u8>,
}

impl RasterImage {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let at = (y as usize * self.width as usize + x as usize) * 3;
        Some([self.pixels[at], self.pixels[at + 1], self.pixels[at + 2]])
    }

    /// Number of pixels with exactly this color
    pub fn count_color(&self, rgb: [u8; 3]) -> usize {
        self.pixels.chunks_exact(3).filter(|p| *p == rgb).count()
    }
}

/// Title shown above the heatmap.
///
/// With `highlight_extremes` the maximum and minimum values and their
/// `(row, col)` positions are appended on a second line.
pub fn heatmap_title(m: &Matrix<f64>, opts: &HeatmapOptions) -> String {
    if !opts.highlight_extremes {
        return opts.title.clone();
    }
    match (m.argmax(), m.argmin()) {
        (Some(((ri, ci), max)), Some(((rj, cj), min))) => format!(
            "{}\nMax: {:.4} at ({}, {}), Min: {:.4} at ({}, {})",
            opts.title, max, ri, ci, min, rj, cj
        ),
        _ => opts.title.clone(),
    }
}

/// Render `m` to a PNG at `path`
pub fn save_heatmap(
    path: &Path,
    m: &Matrix<f64>,
    opts: &HeatmapOptions,
    overlay: Option<&BlockCoordinateMap>,
) -> Result<()> {
    {
        let root = BitMapBackend::new(path, opts.size).into_drawing_area();
        draw_heatmap(&root, m, opts, overlay)?;
        root.present().map_err(plot_err)?;
    }
    debug!(path = %path.display(), shape = ?m.shape(), "saved heatmap");
    Ok(())
}

/// Render `m` into memory
pub fn render_heatmap(
    m: &Matrix<f64>,
    opts: &HeatmapOptions,
    overlay: Option<&BlockCoordinateMap>,
) -> Result<RasterImage> {
    let (width, height) = opts.size;
    let mut pixels = vec![0u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut pixels, opts.size).into_drawing_area();
        draw_heatmap(&root, m, opts, overlay)?;
        root.present().map_err(plot_err)?;
    }
    Ok(RasterImage {
        width,
        height,
        pixels,
    })
}

fn cell_center(i: usize, j: usize, top: f64) -> (f64, f64) {
    (j as f64 + 0.5, top - i as f64 - 0.5)
}

fn to_color(rgb: [u8; 3]) -> RGBColor {
    RGBColor(rgb[0], rgb[1], rgb[2])
}

fn draw_heatmap<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    m: &Matrix<f64>,
    opts: &HeatmapOptions,
    overlay: Option<&BlockCoordinateMap>,
) -> Result<()> {
    root.fill(&WHITE).map_err(plot_err)?;

    let cmap = (opts.colormap)();
    let norm = opts.normalize(m);

    let (plot_area, bar_area) = if opts.colorbar {
        let (width, _) = root.dim_in_pixel();
        let (plot, bar) = root.split_horizontally(width.saturating_sub(COLORBAR_WIDTH));
        (plot, Some(bar))
    } else {
        (root.clone(), None)
    };

    let (nrows, ncols) = m.shape();
    let top = nrows as f64;
    // keep a non-degenerate range for empty matrices
    let x_max = ncols.max(1) as f64;
    let y_max = nrows.max(1) as f64;

    let title = heatmap_title(m, opts);
    let mut chart = ChartBuilder::on(&plot_area)
        .caption(&title, ("sans-serif", 20))
        .margin(10)
        .x_label_area_size(30)
        .y_label_area_size(40)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .y_label_formatter(&|y| format!("{:.0}", top - *y))
        .draw()
        .map_err(plot_err)?;

    chart
        .draw_series((0..nrows).flat_map(|i| (0..ncols).map(move |j| (i, j))).map(|(i, j)| {
            let color = to_color(cmap.map(norm.apply(m[[i, j]])));
            let y1 = top - i as f64;
            Rectangle::new([(j as f64, y1 - 1.0), (j as f64 + 1.0, y1)], color.filled())
        }))
        .map_err(plot_err)?;

    if opts.highlight_extremes {
        for (extreme, color) in [(m.argmax(), RED), (m.argmin(), GREEN)] {
            if let Some(((i, j), _)) = extreme {
                chart
                    .draw_series(std::iter::once(Circle::new(
                        cell_center(i, j, top),
                        MARKER_RADIUS,
                        color.filled(),
                    )))
                    .map_err(plot_err)?;
            }
        }
    }

    if let Some(coords) = overlay {
        draw_block_overlay(&mut chart, coords, top)?;
    }

    if let Some(bar) = bar_area {
        draw_colorbar(&bar, &cmap, &norm)?;
    }
    Ok(())
}

fn draw_colorbar<DB: DrawingBackend>(area: &DrawingArea<DB, Shift>, cmap: &Colormap, norm: &Normalize) -> Result<()> {
    let lo = norm.vmin;
    let hi = if norm.vmax > norm.vmin { norm.vmax } else { norm.vmin + 1.0 };

    let mut chart = ChartBuilder::on(area)
        .margin_top(40)
        .margin_bottom(40)
        .margin_left(10)
        .right_y_label_area_size(50)
        .build_cartesian_2d(0f64..1f64, lo..hi)
        .map_err(plot_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .disable_x_axis()
        .draw()
        .map_err(plot_err)?;

    let n = cmap.len();
    let denom = n.saturating_sub(1).max(1) as f64;
    let step = (hi - lo) / n as f64;
    chart
        .draw_series((0..n).map(|k| {
            let y0 = lo + step * k as f64;
            let color = to_color(cmap.map(k as f64 / denom));
            Rectangle::new([(0.0, y0), (1.0, y0 + step)], color.filled())
        }))
        .map_err(plot_err)?;
    Ok(())
}
