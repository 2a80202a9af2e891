//! Dashed block outlines drawn on top of a heatmap.

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::*;

use super::plot_err;
use crate::coords::{BlockCoordinateMap, BlockSpan};
use crate::error::Result;

/// Stroke width of row-group outlines
pub const MAIN_BLOCK_STROKE: u32 = 2;
/// Stroke width of sub-block outlines
pub const SUB_BLOCK_STROKE: u32 = 1;

const OVERLAY_GREY: RGBColor = RGBColor(128, 128, 128);

// dash pattern in cell units
const DASH: f64 = 1.0;
const GAP: f64 = 0.6;

/// Outline rectangle in chart coordinates (x right, y up)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayRect {
    pub x0: f64,
    pub x1: f64,
    pub y0: f64,
    pub y1: f64,
    pub stroke: u32,
}

impl OverlayRect {
    fn from_spans(rows: &BlockSpan, cols: &BlockSpan, top: f64, stroke: u32) -> Option<Self> {
        if rows.is_empty() || cols.is_empty() {
            return None;
        }
        Some(Self {
            x0: cols.start as f64,
            x1: cols.end() as f64,
            y0: top - rows.end() as f64,
            y1: top - rows.start as f64,
            stroke,
        })
    }

    /// Dashed segments tracing the four edges
    pub fn dashed_outline(&self) -> Vec<[(f64, f64); 2]> {
        let corners = [
            (self.x0, self.y0),
            (self.x1, self.y0),
            (self.x1, self.y1),
            (self.x0, self.y1),
        ];
        (0..4)
            .flat_map(|k| dashed_segments(corners[k], corners[(k + 1) % 4], DASH, GAP))
            .collect()
    }
}

/// Split the line `from → to` into dashes of length `dash` separated by `gap`
pub fn dashed_segments(from: (f64, f64), to: (f64, f64), dash: f64, gap: f64) -> Vec<[(f64, f64); 2]> {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    let length = dx.hypot(dy);
    if length <= 0.0 || dash <= 0.0 || gap < 0.0 {
        return Vec::new();
    }
    let at = |t: f64| (from.0 + dx * t / length, from.1 + dy * t / length);

    let mut segments = Vec::new();
    let mut t = 0.0;
    while t < length {
        let end = (t + dash).min(length);
        segments.push([at(t), at(end)]);
        t += dash + gap;
    }
    segments
}

/// Outlines of every non-empty row-group and sub-block.
///
/// `top` is the row count of the plotted matrix, used to flip rows so that
/// row 0 is drawn at the top.
pub fn overlay_rectangles(coords: &BlockCoordinateMap, top: f64) -> Vec<OverlayRect> {
    let main = coords
        .main_blocks
        .iter()
        .filter_map(|b| OverlayRect::from_spans(&b.rows, &b.cols, top, MAIN_BLOCK_STROKE));
    let sub = coords
        .sub_blocks
        .iter()
        .filter_map(|b| OverlayRect::from_spans(&b.rows, &b.cols, top, SUB_BLOCK_STROKE));
    main.chain(sub).collect()
}

pub(super) fn draw_block_overlay<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    coords: &BlockCoordinateMap,
    top: f64,
) -> Result<()> {
    for rect in overlay_rectangles(coords, top) {
        let style = OVERLAY_GREY.stroke_width(rect.stroke);
        chart
            .draw_series(
                rect.dashed_outline()
                    .into_iter()
                    .map(|[a, b]| PathElement::new(vec![a, b], style)),
            )
            .map_err(plot_err)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build, SizeParameters};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_dashed_segments() {
        let segs = dashed_segments((0.0, 0.0), (4.0, 0.0), 1.0, 1.0);
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0], [(0.0, 0.0), (1.0, 0.0)]);
        assert_eq!(segs[1], [(2.0, 0.0), (3.0, 0.0)]);

        // last dash is clipped to the end point
        let segs = dashed_segments((0.0, 0.0), (0.0, 2.5), 1.0, 1.0);
        assert_eq!(segs.len(), 2);
        assert_abs_diff_eq!(segs[1][1].1, 2.5);

        assert!(dashed_segments((1.0, 1.0), (1.0, 1.0), 1.0, 1.0).is_empty());
    }

    #[test]
    fn test_overlay_rectangles_default() {
        let block = build(&SizeParameters::default()).unwrap();
        let top = block.matrix.nrows() as f64;
        let rects = overlay_rectangles(&block.coords, top);
        // 6 row-groups and 21 sub-blocks, none empty
        assert_eq!(rects.len(), 27);
        assert_eq!(rects.iter().filter(|r| r.stroke == MAIN_BLOCK_STROKE).count(), 6);

        // first row-group sits at the top and spans the full width
        let first = rects[0];
        assert_abs_diff_eq!(first.y1, top);
        assert_abs_diff_eq!(first.x0, 0.0);
        assert_abs_diff_eq!(first.x1, block.matrix.ncols() as f64);
    }

    #[test]
    fn test_overlay_skips_empty_blocks() {
        let params = SizeParameters::new(0, 2, 3, 4, 5).unwrap();
        let block = build(&params).unwrap();
        assert!(overlay_rectangles(&block.coords, 0.0).is_empty());
    }
}
