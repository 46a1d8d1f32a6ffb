use crate::config::{DEFAULT_MAX_ZOOM, DEFAULT_ZOOM_STEP};

const MIN_ZOOM: f64 = 1.0;
/// Zoom values this close to 1 are treated as fully zoomed out.
const UNZOOMED_EPSILON: f64 = 1e-9;

/// Last known pointer position (screen space) and button state.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
    pub is_down: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Browsers report a negative `deltaY` when the wheel scrolls up, which
    /// zooms in. A zero delta carries no direction.
    pub fn from_wheel_delta(delta_y: f64) -> Option<Self> {
        if delta_y < 0.0 {
            Some(Self::In)
        } else if delta_y > 0.0 {
            Some(Self::Out)
        } else {
            None
        }
    }
}

/// Pan/zoom transform from content coordinates to screen coordinates:
/// `screen = content * zoom + pan`.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportState {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
    pub pointer: Pointer,
    max_zoom: f64,
    zoom_step: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ZOOM, DEFAULT_ZOOM_STEP)
    }
}

impl ViewportState {
    pub fn new(max_zoom: f64, zoom_step: f64) -> Self {
        Self {
            pan_x: 0.0,
            pan_y: 0.0,
            zoom: MIN_ZOOM,
            pointer: Pointer::default(),
            max_zoom: max_zoom.max(MIN_ZOOM),
            zoom_step,
        }
    }

    pub fn max_zoom(&self) -> f64 {
        self.max_zoom
    }

    pub fn is_unzoomed(&self) -> bool {
        self.zoom - MIN_ZOOM <= UNZOOMED_EPSILON
    }

    pub fn content_to_screen(&self, cx: f64, cy: f64) -> (f64, f64) {
        (cx * self.zoom + self.pan_x, cy * self.zoom + self.pan_y)
    }

    pub fn screen_to_content(&self, sx: f64, sy: f64) -> (f64, f64) {
        ((sx - self.pan_x) / self.zoom, (sy - self.pan_y) / self.zoom)
    }

    /// Pan by screen-space delta. The unzoomed map always fills the viewport
    /// exactly and cannot be dragged.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        if self.is_unzoomed() {
            self.pan_x = 0.0;
            self.pan_y = 0.0;
            return;
        }
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Zoom one notch toward a focus point (screen coordinates).
    /// Returns whether the zoom factor changed.
    pub fn zoom_at(&mut self, pointer_x: f64, pointer_y: f64, direction: ZoomDirection) -> bool {
        let factor = match direction {
            ZoomDirection::In => self.zoom_step,
            ZoomDirection::Out => 1.0 / self.zoom_step,
        };
        let mut new_zoom = (self.zoom * factor).clamp(MIN_ZOOM, self.max_zoom);
        if new_zoom - MIN_ZOOM <= UNZOOMED_EPSILON {
            new_zoom = MIN_ZOOM;
        }
        if new_zoom == self.zoom {
            return false;
        }
        let ratio = new_zoom / self.zoom;

        // Keep the content point under the pointer fixed on screen.
        self.pan_x = pointer_x - ratio * (pointer_x - self.pan_x);
        self.pan_y = pointer_y - ratio * (pointer_y - self.pan_y);
        self.zoom = new_zoom;
        true
    }

    /// Keep the scaled content covering the viewport: pan stays within
    /// `[viewport - content * zoom, 0]` on each axis. An axis whose scaled
    /// content is smaller than the viewport is pinned to 0.
    pub fn clamp_to_bounds(
        &mut self,
        viewport_width: f64,
        viewport_height: f64,
        content_width: f64,
        content_height: f64,
    ) {
        if self.is_unzoomed() {
            self.pan_x = 0.0;
            self.pan_y = 0.0;
            return;
        }
        self.pan_x = clamp_axis(self.pan_x, viewport_width, content_width * self.zoom);
        self.pan_y = clamp_axis(self.pan_y, viewport_height, content_height * self.zoom);
    }

    /// Content-space rectangle `(x0, y0, x1, y1)` currently on screen.
    pub fn visible_content_rect(&self, viewport_width: f64, viewport_height: f64) -> (f64, f64, f64, f64) {
        let (x0, y0) = self.screen_to_content(0.0, 0.0);
        let (x1, y1) = self.screen_to_content(viewport_width, viewport_height);
        (x0, y0, x1, y1)
    }
}

fn clamp_axis(pan: f64, viewport: f64, scaled_content: f64) -> f64 {
    let min = viewport - scaled_content;
    if min >= 0.0 {
        return 0.0;
    }
    pan.clamp(min, 0.0)
}
