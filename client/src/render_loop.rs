use crate::config::{Palette, SELECTED_BORDER_WIDTH, TILE_BORDER_WIDTH};
use crate::grid::{GridMapper, Tile};
use crate::surface::{BackgroundImage, DrawSurface};
use crate::viewport::ViewportState;

/// Production marker radius as a fraction of the tile edge.
const PRODUCTION_MARKER_RATIO: f64 = 0.12;

/// Handle for one pending frame callback, as returned by the host scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken(pub i32);

/// "Call me on the next display tick" capability.
///
/// The browser implementation wraps `requestAnimationFrame`; headless hosts
/// queue the request and fire it when they choose.
pub trait FrameScheduler {
    /// Request one frame callback. `None` means the host cannot schedule.
    fn schedule(&mut self) -> Option<FrameToken>;
    fn cancel(&mut self, token: FrameToken);
}

/// Scheduler for headless hosts: records the request and lets the host
/// decide when the frame fires.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    next: i32,
    pending: Option<FrameToken>,
    cancelled: Vec<FrameToken>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<FrameToken> {
        self.pending
    }

    pub fn cancelled(&self) -> &[FrameToken] {
        &self.cancelled
    }
}

impl FrameScheduler for ManualScheduler {
    fn schedule(&mut self) -> Option<FrameToken> {
        self.next = self.next.wrapping_add(1);
        let token = FrameToken(self.next);
        self.pending = Some(token);
        Some(token)
    }

    fn cancel(&mut self, token: FrameToken) {
        if self.pending == Some(token) {
            self.pending = None;
        }
        self.cancelled.push(token);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    /// One frame callback is pending.
    Running(FrameToken),
}

/// Keeps exactly one frame callback in flight while running.
///
/// `stop` cancels the pending callback. A callback that was already in flight
/// when `stop` ran finds the loop idle and does nothing.
#[derive(Debug)]
pub struct RenderLoop<F> {
    scheduler: F,
    state: LoopState,
    frames: u64,
}

impl<F: FrameScheduler> RenderLoop<F> {
    pub fn new(scheduler: F) -> Self {
        Self {
            scheduler,
            state: LoopState::Idle,
            frames: 0,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, LoopState::Running(_))
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn scheduler(&self) -> &F {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut F {
        &mut self.scheduler
    }

    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }
        self.reschedule();
    }

    pub fn stop(&mut self) {
        if let LoopState::Running(token) = self.state {
            self.scheduler.cancel(token);
        }
        self.state = LoopState::Idle;
    }

    /// Called when a frame callback fires. Returns whether the frame should be drawn.
    pub fn begin_frame(&mut self) -> bool {
        self.is_running()
    }

    /// Count the drawn frame and queue the next one.
    pub fn finish_frame(&mut self) {
        if !self.is_running() {
            return;
        }
        self.frames += 1;
        self.reschedule();
    }

    fn reschedule(&mut self) {
        self.state = match self.scheduler.schedule() {
            Some(token) => LoopState::Running(token),
            None => {
                tracing::warn!("frame scheduler refused request; render loop idle");
                LoopState::Idle
            }
        };
    }
}

/// Everything one frame reads.
pub struct FrameScene<'a, I> {
    pub width: f64,
    pub height: f64,
    pub viewport: &'a ViewportState,
    pub grid: &'a GridMapper,
    pub hovered: Option<u32>,
    /// Normalized address of the connected wallet.
    pub current_user: Option<&'a str>,
    pub background: Option<&'a I>,
    pub palette: &'a Palette,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub background_drawn: bool,
    pub tiles_drawn: usize,
    pub selection_drawn: bool,
}

/// Paint one frame: clear, transform, background, tile borders, selection
/// highlight, reset.
///
/// A background that has not finished loading is skipped; tiles are still drawn.
pub fn draw_frame<S: DrawSurface>(surface: &mut S, scene: &FrameScene<'_, S::Image>) -> FrameStats {
    let FrameScene {
        width,
        height,
        viewport,
        grid,
        hovered,
        current_user,
        background,
        palette,
    } = *scene;
    let mut stats = FrameStats::default();

    surface.clear(width, height, &palette.background);
    surface.set_transform(viewport.zoom, viewport.pan_x, viewport.pan_y);

    let (content_w, content_h) = grid.content_size();
    if let Some(image) = background
        && image.is_loaded()
    {
        surface.draw_image(image, 0.0, 0.0, content_w, content_h);
        stats.background_drawn = true;
    }

    let (x0, y0, x1, y1) = viewport.visible_content_rect(width, height);
    let mut selected: Option<&Tile> = None;
    for tile in grid.tiles_in(x0, y0, x1, y1) {
        let rect = tile.rect();
        if tile.is_unclaimed {
            surface.fill_rect(rect, &palette.unclaimed_fill);
        } else if let Some(ref tint) = tile.tint {
            surface.fill_rect(rect, tint);
        }
        if hovered == Some(tile.land_id) {
            surface.fill_rect(rect, &palette.hover_fill);
        }

        surface.stroke_rect(rect, border_color(tile, current_user, palette), TILE_BORDER_WIDTH);

        if tile.producing {
            let radius = (tile.size * PRODUCTION_MARKER_RATIO).max(1.0);
            surface.fill_circle(
                rect.right() - radius * 2.0,
                tile.y + radius * 2.0,
                radius,
                &palette.production_marker,
            );
        }

        if tile.selected {
            selected = Some(tile);
        }
        stats.tiles_drawn += 1;
    }

    // Selection goes last so its heavier stroke sits above neighbouring borders.
    if let Some(tile) = selected {
        surface.stroke_rect(tile.rect(), &palette.selected_border, SELECTED_BORDER_WIDTH);
        stats.selection_drawn = true;
    }

    surface.reset_transform();
    tracing::trace!(
        tiles = stats.tiles_drawn,
        background = stats.background_drawn,
        "frame drawn"
    );
    stats
}

/// Border colour keyed by ownership relative to the connected wallet.
pub fn border_color<'a>(tile: &Tile, current_user: Option<&str>, palette: &'a Palette) -> &'a str {
    if tile.is_unclaimed {
        &palette.unclaimed_border
    } else if current_user.is_some() && tile.owner.as_deref() == current_user {
        &palette.owned_border
    } else {
        &palette.default_border
    }
}

#[cfg(test)]
mod tests {
    use landgrid_shared::LandRecord;

    use super::*;
    use crate::surface::{DrawCommand, ImageHandle, RecordingSurface};

    #[derive(Debug, Default)]
    struct CountingScheduler {
        next: i32,
        cancelled: Vec<FrameToken>,
        refuse: bool,
    }

    impl FrameScheduler for CountingScheduler {
        fn schedule(&mut self) -> Option<FrameToken> {
            if self.refuse {
                return None;
            }
            self.next += 1;
            Some(FrameToken(self.next))
        }

        fn cancel(&mut self, token: FrameToken) {
            self.cancelled.push(token);
        }
    }

    fn small_grid() -> GridMapper {
        let mut grid = GridMapper::new(2, 2);
        grid.rebuild(&[
            LandRecord::unclaimed(0),
            LandRecord::owned_by(1, "0xME"),
            LandRecord::owned_by(2, "0xother"),
            LandRecord::owned_by(3, "0xme"),
        ]);
        grid.set_tile_size(50.0);
        grid
    }

    #[test]
    fn loop_transitions_idle_running_idle() {
        let mut rl = RenderLoop::new(CountingScheduler::default());
        assert_eq!(rl.state(), LoopState::Idle);

        rl.start();
        assert_eq!(rl.state(), LoopState::Running(FrameToken(1)));
        rl.start();
        assert_eq!(rl.state(), LoopState::Running(FrameToken(1)));

        assert!(rl.begin_frame());
        rl.finish_frame();
        assert_eq!(rl.state(), LoopState::Running(FrameToken(2)));
        assert_eq!(rl.frames(), 1);

        rl.stop();
        assert_eq!(rl.state(), LoopState::Idle);
        assert_eq!(rl.scheduler().cancelled, vec![FrameToken(2)]);
        assert!(!rl.begin_frame());
        rl.finish_frame();
        assert_eq!(rl.state(), LoopState::Idle);
    }

    #[test]
    fn refused_schedule_leaves_loop_idle() {
        let mut rl = RenderLoop::new(CountingScheduler {
            refuse: true,
            ..CountingScheduler::default()
        });
        rl.start();
        assert_eq!(rl.state(), LoopState::Idle);
    }

    #[test]
    fn frame_order_is_clear_transform_tiles_reset() {
        let grid = small_grid();
        let viewport = ViewportState::default();
        let palette = Palette::default();
        let background = ImageHandle::ready();
        let mut surface = RecordingSurface::new();

        let stats = draw_frame(
            &mut surface,
            &FrameScene {
                width: 100.0,
                height: 100.0,
                viewport: &viewport,
                grid: &grid,
                hovered: None,
                current_user: Some("0xme"),
                background: Some(&background),
                palette: &palette,
            },
        );

        let cmds = surface.commands();
        assert!(matches!(cmds[0], DrawCommand::Clear { .. }));
        assert!(matches!(cmds[1], DrawCommand::SetTransform { zoom, .. } if zoom == 1.0));
        assert!(matches!(cmds[2], DrawCommand::Image { width, height, .. } if width == 100.0 && height == 100.0));
        assert_eq!(cmds.last(), Some(&DrawCommand::ResetTransform));
        assert!(stats.background_drawn);
        assert_eq!(stats.tiles_drawn, 4);
    }

    #[test]
    fn pending_background_is_skipped_but_tiles_drawn() {
        let grid = small_grid();
        let viewport = ViewportState::default();
        let palette = Palette::default();
        let background = ImageHandle::pending();
        let mut surface = RecordingSurface::new();

        let stats = draw_frame(
            &mut surface,
            &FrameScene {
                width: 100.0,
                height: 100.0,
                viewport: &viewport,
                grid: &grid,
                hovered: None,
                current_user: None,
                background: Some(&background),
                palette: &palette,
            },
        );

        assert!(!stats.background_drawn);
        assert!(!surface
            .commands()
            .iter()
            .any(|c| matches!(c, DrawCommand::Image { .. })));
        assert_eq!(surface.strokes().count(), 4);
    }

    #[test]
    fn border_colours_follow_ownership() {
        let grid = small_grid();
        let palette = Palette::default();
        let colour = |id: u32, user: Option<&str>| {
            let tile = grid.tile(id).expect("tile");
            border_color(tile, user, &palette).to_string()
        };

        assert_eq!(colour(0, Some("0xme")), palette.unclaimed_border);
        assert_eq!(colour(1, Some("0xme")), palette.owned_border);
        assert_eq!(colour(3, Some("0xme")), palette.owned_border);
        assert_eq!(colour(2, Some("0xme")), palette.default_border);
        assert_eq!(colour(1, None), palette.default_border);
    }

    #[test]
    fn selected_tile_gets_heavier_stroke_last() {
        let mut grid = small_grid();
        if let Some(tile) = grid.tile_mut(2) {
            tile.selected = true;
        }
        let viewport = ViewportState::default();
        let palette = Palette::default();
        let mut surface = RecordingSurface::new();

        let stats = draw_frame::<RecordingSurface>(
            &mut surface,
            &FrameScene {
                width: 100.0,
                height: 100.0,
                viewport: &viewport,
                grid: &grid,
                hovered: None,
                current_user: None,
                background: None,
                palette: &palette,
            },
        );

        assert!(stats.selection_drawn);
        let (rect, colour, width) = surface.strokes().last().expect("selection stroke");
        assert_eq!((rect.x, rect.y), (0.0, 50.0));
        assert_eq!(colour, palette.selected_border);
        assert!(width > TILE_BORDER_WIDTH);
    }

    #[test]
    fn offscreen_tiles_are_culled() {
        let grid = small_grid();
        let mut viewport = ViewportState::default();
        viewport.zoom = 2.0;
        viewport.pan_x = -100.0;
        viewport.pan_y = -100.0;
        let palette = Palette::default();
        let mut surface = RecordingSurface::new();

        let stats = draw_frame::<RecordingSurface>(
            &mut surface,
            &FrameScene {
                width: 100.0,
                height: 100.0,
                viewport: &viewport,
                grid: &grid,
                hovered: None,
                current_user: None,
                background: None,
                palette: &palette,
            },
        );
        assert_eq!(stats.tiles_drawn, 1);
    }
}
