use std::cell::RefCell;
use std::rc::Rc;

use landgrid_shared::{LandRecord, normalize_address};

use crate::config::GridConfig;
use crate::grid::GridMapper;
use crate::render_loop::{FrameScene, FrameScheduler, FrameStats, LoopState, RenderLoop, draw_frame};
use crate::selection::TileSelectionController;
use crate::source::{LandDataSource, Subscription};
use crate::surface::DrawSurface;
use crate::viewport::{Pointer, ViewportState, ZoomDirection};

pub type SelectionCallback = Box<dyn FnMut(Option<u32>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created, not yet attached to a surface. Land data may already arrive.
    Detached,
    Mounted,
    /// Torn down; every further call is a no-op.
    TornDown,
}

/// One interactive land grid bound to a drawing surface.
///
/// Input handlers take surface-local pixel coordinates. The tile-selected
/// callback runs synchronously inside the handler that changed the selection,
/// so it must not call back into the same view.
pub struct GridView<S: DrawSurface, F> {
    config: GridConfig,
    grid: GridMapper,
    viewport: ViewportState,
    selection: TileSelectionController,
    render_loop: RenderLoop<F>,
    surface: S,
    background: Option<S::Image>,
    current_user: Option<String>,
    width: f64,
    height: f64,
    lifecycle: Lifecycle,
    press_origin: Option<(f64, f64)>,
    dragging: bool,
    on_selected: Option<SelectionCallback>,
}

impl<S: DrawSurface, F: FrameScheduler> GridView<S, F> {
    pub fn new(config: GridConfig, surface: S, scheduler: F) -> Self {
        let config = config.sanitized();
        Self {
            grid: GridMapper::new(config.rows, config.cols),
            viewport: ViewportState::new(config.max_zoom, config.zoom_step),
            selection: TileSelectionController::new(),
            render_loop: RenderLoop::new(scheduler),
            surface,
            background: None,
            current_user: None,
            width: 0.0,
            height: 0.0,
            lifecycle: Lifecycle::Detached,
            press_origin: None,
            dragging: false,
            on_selected: None,
            config,
        }
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridMapper {
        &self.grid
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn selected(&self) -> Option<u32> {
        self.selection.selected()
    }

    pub fn hovered(&self) -> Option<u32> {
        self.selection.hovered()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn scheduler(&self) -> &F {
        self.render_loop.scheduler()
    }

    pub fn loop_state(&self) -> LoopState {
        self.render_loop.state()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.render_loop.frames()
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_mounted(&self) -> bool {
        self.lifecycle == Lifecycle::Mounted
    }

    pub fn on_tile_selected(&mut self, callback: impl FnMut(Option<u32>) + 'static) {
        self.on_selected = Some(Box::new(callback));
    }

    /// Attach to a surface of the given pixel size and start the frame loop.
    pub fn mount(&mut self, width: f64, height: f64) {
        if self.lifecycle != Lifecycle::Detached {
            return;
        }
        self.lifecycle = Lifecycle::Mounted;
        self.viewport = ViewportState::new(self.config.max_zoom, self.config.zoom_step);
        self.apply_size(width, height);
        self.render_loop.start();
        tracing::debug!(width, height, tiles = self.grid.tiles().len(), "grid view mounted");
    }

    /// Cancel the pending frame and discard view state.
    pub fn unmount(&mut self) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        self.render_loop.stop();
        self.lifecycle = Lifecycle::TornDown;
        self.viewport.pointer = Pointer::default();
        self.press_origin = None;
        self.dragging = false;
        self.on_selected = None;
        tracing::debug!(frames = self.render_loop.frames(), "grid view torn down");
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        if !self.is_mounted() {
            return;
        }
        self.apply_size(width, height);
    }

    /// Replace the land collection. Tiles are re-derived by land id; a
    /// selection survives while its land is still present.
    pub fn set_lands(&mut self, lands: &[LandRecord]) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        let summary = self.grid.rebuild(lands);
        tracing::debug!(tiles = summary.tiles, "land collection replaced");
        if let Some(change) = self.selection.reconcile(&mut self.grid) {
            self.notify_selected(change);
        }
    }

    pub fn set_current_user(&mut self, address: Option<&str>) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        self.current_user = address
            .map(normalize_address)
            .filter(|addr| !addr.is_empty());
    }

    pub fn set_background(&mut self, image: S::Image) {
        if self.lifecycle == Lifecycle::TornDown {
            return;
        }
        self.background = Some(image);
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) {
        if !self.is_mounted() {
            return;
        }
        self.viewport.pointer = Pointer {
            x,
            y,
            is_down: true,
        };
        self.press_origin = Some((x, y));
        self.dragging = false;
        self.selection.hover(None);
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        if !self.is_mounted() {
            return;
        }
        let previous = self.viewport.pointer;
        self.viewport.pointer.x = x;
        self.viewport.pointer.y = y;

        if previous.is_down {
            if let Some((ox, oy)) = self.press_origin
                && ((x - ox).abs() > self.config.drag_threshold
                    || (y - oy).abs() > self.config.drag_threshold)
            {
                self.dragging = true;
            }
            self.viewport.pan(x - previous.x, y - previous.y);
            self.clamp_view();
        } else {
            let hit = self.hit_at(x, y);
            self.selection.hover(hit);
        }
    }

    /// A release that did not turn into a drag is a click on the tile under it.
    pub fn pointer_up(&mut self, x: f64, y: f64) {
        if !self.is_mounted() {
            return;
        }
        let was_down = self.viewport.pointer.is_down;
        self.viewport.pointer = Pointer {
            x,
            y,
            is_down: false,
        };
        let press = self.press_origin.take();
        if !was_down || self.dragging || press.is_none() {
            self.dragging = false;
            return;
        }
        let hit = self.hit_at(x, y);
        if let Some(change) = self.selection.click(&mut self.grid, hit) {
            tracing::debug!(selected = ?change, "tile selection changed");
            self.notify_selected(change);
        }
    }

    pub fn pointer_leave(&mut self) {
        if !self.is_mounted() {
            return;
        }
        self.viewport.pointer.is_down = false;
        self.press_origin = None;
        self.dragging = false;
        self.selection.hover(None);
    }

    /// One wheel notch at `(x, y)`; the sign of `delta_y` picks the direction.
    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) {
        if !self.is_mounted() {
            return;
        }
        let Some(direction) = ZoomDirection::from_wheel_delta(delta_y) else {
            return;
        };
        if self.viewport.zoom_at(x, y, direction) {
            self.clamp_view();
        }
    }

    /// Per-frame entry point for the scheduler's callback. Returns `None`
    /// when the loop is idle (torn down or never started).
    pub fn frame(&mut self) -> Option<FrameStats> {
        if !self.is_mounted() || !self.render_loop.begin_frame() {
            return None;
        }
        let stats = draw_frame(
            &mut self.surface,
            &FrameScene {
                width: self.width,
                height: self.height,
                viewport: &self.viewport,
                grid: &self.grid,
                hovered: self.selection.hovered(),
                current_user: self.current_user.as_deref(),
                background: self.background.as_ref(),
                palette: &self.config.palette,
            },
        );
        self.render_loop.finish_frame();
        Some(stats)
    }

    fn hit_at(&self, x: f64, y: f64) -> Option<u32> {
        let (cx, cy) = self.viewport.screen_to_content(x, y);
        TileSelectionController::hit_test(&self.grid, cx, cy)
    }

    fn apply_size(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        let size = self.grid.tile_size_for_width(self.width);
        self.grid.set_tile_size(size);
        self.clamp_view();
    }

    fn clamp_view(&mut self) {
        let (content_w, content_h) = self.grid.content_size();
        self.viewport
            .clamp_to_bounds(self.width, self.height, content_w, content_h);
    }

    fn notify_selected(&mut self, selected: Option<u32>) {
        if let Some(callback) = self.on_selected.as_mut() {
            callback(selected);
        }
    }
}

pub type SharedGridView<S, F> = Rc<RefCell<GridView<S, F>>>;

/// Feed a shared view from a land source: pushes the current snapshot now and
/// every replacement afterwards. The listener holds the view weakly, so the
/// returned subscription never keeps a torn-down view alive.
pub fn bind_source<S, F, D>(view: &SharedGridView<S, F>, source: &D) -> Subscription
where
    S: DrawSurface + 'static,
    F: FrameScheduler + 'static,
    D: LandDataSource + ?Sized,
{
    view.borrow_mut().set_lands(&source.snapshot());
    let weak = Rc::downgrade(view);
    source.subscribe(Box::new(move |lands| {
        let Some(view) = weak.upgrade() else {
            return;
        };
        match view.try_borrow_mut() {
            Ok(mut view) => view.set_lands(lands),
            Err(_) => tracing::warn!("grid view busy; dropped land collection replacement"),
        }
    }))
}
