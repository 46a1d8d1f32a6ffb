use std::cell::Cell;
use std::rc::Rc;

use crate::grid::TileRect;

/// Image whose pixels may still be loading when a frame runs.
pub trait BackgroundImage {
    fn is_loaded(&self) -> bool;
}

/// Immediate-mode 2D drawing target the render loop paints into.
///
/// Coordinates passed between `set_transform` and `reset_transform` are in
/// content space; the surface applies `screen = content * zoom + pan`.
pub trait DrawSurface {
    type Image: BackgroundImage;

    fn clear(&mut self, width: f64, height: f64, fill: &str);
    fn set_transform(&mut self, zoom: f64, pan_x: f64, pan_y: f64);
    fn reset_transform(&mut self);
    fn draw_image(&mut self, image: &Self::Image, x: f64, y: f64, width: f64, height: f64);
    fn fill_rect(&mut self, rect: TileRect, color: &str);
    fn stroke_rect(&mut self, rect: TileRect, color: &str, line_width: f64);
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: &str);
}

/// Shared load flag standing in for a decoded image, for headless hosts.
#[derive(Debug, Clone, Default)]
pub struct ImageHandle {
    loaded: Rc<Cell<bool>>,
}

impl ImageHandle {
    pub fn pending() -> Self {
        Self::default()
    }

    pub fn ready() -> Self {
        let handle = Self::default();
        handle.mark_loaded();
        handle
    }

    pub fn mark_loaded(&self) {
        self.loaded.set(true);
    }
}

impl BackgroundImage for ImageHandle {
    fn is_loaded(&self) -> bool {
        self.loaded.get()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Clear {
        width: f64,
        height: f64,
    },
    SetTransform {
        zoom: f64,
        pan_x: f64,
        pan_y: f64,
    },
    ResetTransform,
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Fill {
        rect: TileRect,
        color: String,
    },
    Stroke {
        rect: TileRect,
        color: String,
        line_width: f64,
    },
    Circle {
        cx: f64,
        cy: f64,
        radius: f64,
        color: String,
    },
}

/// Surface that records every call, used by the replay harness and tests.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Drain everything recorded so far.
    pub fn take(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn strokes(&self) -> impl Iterator<Item = (&TileRect, &str, f64)> {
        self.commands.iter().filter_map(|cmd| match cmd {
            DrawCommand::Stroke {
                rect,
                color,
                line_width,
            } => Some((rect, color.as_str(), *line_width)),
            _ => None,
        })
    }
}

impl DrawSurface for RecordingSurface {
    type Image = ImageHandle;

    fn clear(&mut self, width: f64, height: f64, _fill: &str) {
        self.commands.push(DrawCommand::Clear { width, height });
    }

    fn set_transform(&mut self, zoom: f64, pan_x: f64, pan_y: f64) {
        self.commands
            .push(DrawCommand::SetTransform { zoom, pan_x, pan_y });
    }

    fn reset_transform(&mut self) {
        self.commands.push(DrawCommand::ResetTransform);
    }

    fn draw_image(&mut self, _image: &ImageHandle, x: f64, y: f64, width: f64, height: f64) {
        self.commands.push(DrawCommand::Image {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_rect(&mut self, rect: TileRect, color: &str) {
        self.commands.push(DrawCommand::Fill {
            rect,
            color: color.to_string(),
        });
    }

    fn stroke_rect(&mut self, rect: TileRect, color: &str, line_width: f64) {
        self.commands.push(DrawCommand::Stroke {
            rect,
            color: color.to_string(),
            line_width,
        });
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: &str) {
        self.commands.push(DrawCommand::Circle {
            cx,
            cy,
            radius,
            color: color.to_string(),
        });
    }
}
