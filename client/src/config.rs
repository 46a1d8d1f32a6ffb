use serde::Deserialize;

pub const DEFAULT_ROWS: u32 = 11;
pub const DEFAULT_COLS: u32 = 15;
pub const DEFAULT_MAX_ZOOM: f64 = 8.0;
pub const DEFAULT_ZOOM_STEP: f64 = 1.1;
/// Pointer travel (screen px) past which a press becomes a drag instead of a click.
pub const DEFAULT_DRAG_THRESHOLD: f64 = 5.0;

/// Border stroke widths, in content pixels.
pub const TILE_BORDER_WIDTH: f64 = 1.0;
pub const SELECTED_BORDER_WIDTH: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: u32,
    pub cols: u32,
    pub max_zoom: f64,
    pub zoom_step: f64,
    pub drag_threshold: f64,
    pub palette: Palette,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            max_zoom: DEFAULT_MAX_ZOOM,
            zoom_step: DEFAULT_ZOOM_STEP,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            palette: Palette::default(),
        }
    }
}

impl GridConfig {
    pub fn with_dimensions(rows: u32, cols: u32) -> Self {
        Self {
            rows,
            cols,
            ..Self::default()
        }
    }

    /// Replace out-of-range values with defaults so downstream math never sees
    /// a zero-sized grid or a zoom ceiling below 1.
    pub fn sanitized(mut self) -> Self {
        if self.rows == 0 {
            self.rows = DEFAULT_ROWS;
        }
        if self.cols == 0 {
            self.cols = DEFAULT_COLS;
        }
        if !self.max_zoom.is_finite() || self.max_zoom < 1.0 {
            self.max_zoom = DEFAULT_MAX_ZOOM;
        }
        if !self.zoom_step.is_finite() || self.zoom_step <= 1.0 {
            self.zoom_step = DEFAULT_ZOOM_STEP;
        }
        if !self.drag_threshold.is_finite() || self.drag_threshold < 0.0 {
            self.drag_threshold = DEFAULT_DRAG_THRESHOLD;
        }
        self
    }
}

/// CSS colour strings for tile borders and overlays.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: String,
    pub default_border: String,
    pub owned_border: String,
    pub unclaimed_border: String,
    pub unclaimed_fill: String,
    pub selected_border: String,
    pub hover_fill: String,
    pub production_marker: String,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: "#0c0e17".into(),
            default_border: "rgba(255,255,255,0.35)".into(),
            owned_border: "rgba(72,220,120,0.95)".into(),
            unclaimed_border: "rgba(160,160,160,0.25)".into(),
            unclaimed_fill: "rgba(0,0,0,0.35)".into(),
            selected_border: "rgba(255,217,102,1)".into(),
            hover_fill: "rgba(255,255,255,0.12)".into(),
            production_marker: "rgba(250,180,20,0.9)".into(),
        }
    }
}
