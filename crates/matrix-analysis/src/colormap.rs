//! Listed colormaps and value normalization for heatmaps.

/// Number of entries in [`custom_colormap`]
pub const COLORMAP_LEN: usize = 256;

/// A listed colormap with RGB entries in `[0, 1]`
#[derive(Debug, Clone, PartialEq)]
pub struct Colormap {
    entries: Vec<[f64; 3]>,
}

impl Colormap {
    /// Build from explicit entries. Returns `None` for an empty list.
    pub fn from_entries(entries: Vec<[f64; 3]>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[[f64; 3]] {
        &self.entries
    }

    /// Color for a normalized value `t` in `[0, 1]` as 8-bit RGB.
    ///
    /// `t` outside the range is clamped; NaN maps to the middle entry.
    pub fn map(&self, t: f64) -> [u8; 3] {
        let t = if t.is_nan() { 0.5 } else { t.clamp(0.0, 1.0) };
        let last = self.entries.len() - 1;
        let idx = ((t * last as f64).round() as usize).min(last);
        let [r, g, b] = self.entries[idx];
        [to_byte(r), to_byte(g), to_byte(b)]
    }
}

fn to_byte(c: f64) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Diverging blue → white → red colormap with 256 entries.
///
/// The first 128 entries run from `(0, 0, 1)` to white, the last 128 from
/// white to `(1, 0, 0)`.
pub fn custom_colormap() -> Colormap {
    let half = COLORMAP_LEN / 2;
    let step = |i: usize| i as f64 / (half - 1) as f64;

    let mut entries = Vec::with_capacity(COLORMAP_LEN);
    for i in 0..half {
        let s = step(i);
        entries.push([s, s, 1.0]);
    }
    for i in 0..half {
        let s = step(i);
        entries.push([1.0, 1.0 - s, 1.0 - s]);
    }
    Colormap { entries }
}

/// Linear map from `[vmin, vmax]` to `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub vmin: f64,
    pub vmax: f64,
}

impl Normalize {
    pub fn new(vmin: f64, vmax: f64) -> Self {
        Self { vmin, vmax }
    }

    /// Symmetric range `±max|v|`, falling back to `±1` when all values are zero
    pub fn symmetric(max_abs: f64) -> Self {
        let m = if max_abs > 0.0 && max_abs.is_finite() { max_abs } else { 1.0 };
        Self::new(-m, m)
    }

    /// Degenerate ranges map every value to 0.5
    pub fn apply(&self, v: f64) -> f64 {
        let span = self.vmax - self.vmin;
        if !span.is_finite() || span <= 0.0 {
            return 0.5;
        }
        (v - self.vmin) / span
    }
}
