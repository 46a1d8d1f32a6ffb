use std::cell::RefCell;
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};

use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, PointerEvent, WheelEvent,
};

use crate::config::GridConfig;
use crate::grid::TileRect;
use crate::source::{LandStore, Subscription};
use crate::surface::{BackgroundImage, DrawSurface};
use crate::view::{GridView, SharedGridView, bind_source};
use crate::web::app::{GridSettings, LandsSignal, SelectedLand, WalletAddress};
use crate::web::raf::RafScheduler;

pub const BACKGROUND_URL: &str = "/assets/land-map.webp";

type CanvasGrid = GridView<CanvasSurface, RafScheduler>;

/// Canvas 2D drawing surface. All drawing stays in CSS pixel coordinates;
/// the device pixel ratio is folded into every transform.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    dpr: f64,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d, dpr: f64) -> Self {
        Self { ctx, dpr }
    }
}

impl BackgroundImage for HtmlImageElement {
    fn is_loaded(&self) -> bool {
        self.complete() && self.natural_width() > 0
    }
}

impl DrawSurface for CanvasSurface {
    type Image = HtmlImageElement;

    fn clear(&mut self, width: f64, height: f64, fill: &str) {
        self.reset_transform();
        self.ctx.set_fill_style_str(fill);
        self.ctx.fill_rect(0.0, 0.0, width, height);
    }

    fn set_transform(&mut self, zoom: f64, pan_x: f64, pan_y: f64) {
        let scale = zoom * self.dpr;
        self.ctx
            .set_transform(scale, 0.0, 0.0, scale, pan_x * self.dpr, pan_y * self.dpr)
            .ok();
    }

    fn reset_transform(&mut self) {
        self.ctx
            .set_transform(self.dpr, 0.0, 0.0, self.dpr, 0.0, 0.0)
            .ok();
    }

    fn draw_image(&mut self, image: &HtmlImageElement, x: f64, y: f64, width: f64, height: f64) {
        self.ctx
            .draw_image_with_html_image_element_and_dw_and_dh(image, x, y, width, height)
            .ok();
    }

    fn fill_rect(&mut self, rect: TileRect, color: &str) {
        self.ctx.set_fill_style_str(color);
        self.ctx.fill_rect(rect.x, rect.y, rect.size, rect.size);
    }

    fn stroke_rect(&mut self, rect: TileRect, color: &str, line_width: f64) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(line_width);
        self.ctx.stroke_rect(rect.x, rect.y, rect.size, rect.size);
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, color: &str) {
        self.ctx.begin_path();
        if self.ctx.arc(cx, cy, radius, 0.0, TAU).is_ok() {
            self.ctx.set_fill_style_str(color);
            self.ctx.fill();
        }
    }
}

struct MountedGrid {
    view: SharedGridView<CanvasSurface, RafScheduler>,
    _lands: Subscription,
}

thread_local! {
    static MOUNTED_GRID: RefCell<Option<MountedGrid>> = const { RefCell::new(None) };
}

fn is_mounted() -> bool {
    MOUNTED_GRID.with(|slot| slot.borrow().is_some())
}

fn with_view(f: impl FnOnce(&mut CanvasGrid)) {
    MOUNTED_GRID.with(|slot| {
        let slot = slot.borrow();
        let Some(mounted) = slot.as_ref() else {
            return;
        };
        if let Ok(mut view) = mounted.view.try_borrow_mut() {
            f(&mut view);
        }
    });
}

/// Cancel the frame loop and release the view. Safe to call more than once.
fn teardown() {
    let taken = MOUNTED_GRID.with(|slot| slot.borrow_mut().take());
    if let Some(mounted) = taken {
        mounted.view.borrow_mut().unmount();
    }
}

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .max(1.0)
}

/// CSS size of the canvas container.
fn container_size(canvas: &HtmlCanvasElement) -> (f64, f64) {
    match canvas.parent_element() {
        Some(parent) => (parent.client_width() as f64, parent.client_height() as f64),
        None => (canvas.client_width() as f64, canvas.client_height() as f64),
    }
}

fn size_backing_store(canvas: &HtmlCanvasElement, width: f64, height: f64, dpr: f64) {
    let bw = (width * dpr).round().max(1.0) as u32;
    let bh = (height * dpr).round().max(1.0) as u32;
    if canvas.width() != bw || canvas.height() != bh {
        canvas.set_width(bw);
        canvas.set_height(bh);
    }
}

fn set_cursor(canvas: &HtmlCanvasElement, cursor: &str) {
    // Leptos' `ElementExt::style` shadows the web-sys getter on canvas elements.
    web_sys::HtmlElement::style(canvas)
        .set_property("cursor", cursor)
        .ok();
}

fn local_point(canvas: &HtmlCanvasElement, client_x: i32, client_y: i32) -> (f64, f64) {
    let rect = canvas.get_bounding_client_rect();
    (client_x as f64 - rect.left(), client_y as f64 - rect.top())
}

fn mount_grid(
    canvas: &HtmlCanvasElement,
    store: &LandStore,
    config: GridConfig,
    selected: RwSignal<Option<u32>>,
    wallet: Option<String>,
) -> Result<(), String> {
    let dpr = device_pixel_ratio();
    let (width, height) = container_size(canvas);
    size_backing_store(canvas, width, height, dpr);

    let ctx = canvas
        .get_context("2d")
        .map_err(|_| "getContext(2d) threw".to_string())?
        .ok_or_else(|| "2d context unavailable".to_string())?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| "context is not CanvasRenderingContext2d".to_string())?;
    let surface = CanvasSurface::new(ctx, dpr);

    let frame_canvas = canvas.clone();
    let view: SharedGridView<CanvasSurface, RafScheduler> =
        Rc::new_cyclic(|weak: &Weak<RefCell<CanvasGrid>>| {
            let weak = weak.clone();
            let scheduler = RafScheduler::new(move || {
                let Some(view) = weak.upgrade() else {
                    return;
                };
                let Ok(mut view) = view.try_borrow_mut() else {
                    return;
                };
                // Track container resizes here instead of a separate observer.
                let (w, h) = container_size(&frame_canvas);
                if w > 0.0 && h > 0.0 && (w, h) != view.size() {
                    size_backing_store(&frame_canvas, w, h, dpr);
                    view.resize(w, h);
                }
                view.frame();
            });
            RefCell::new(GridView::new(config, surface, scheduler))
        });

    {
        let mut grid = view.borrow_mut();
        grid.on_tile_selected(move |land| selected.set(land));
        grid.set_current_user(wallet.as_deref());
        if let Ok(image) = HtmlImageElement::new() {
            image.set_src(BACKGROUND_URL);
            grid.set_background(image);
        }
        grid.mount(width, height);
    }
    let lands = bind_source(&view, store);

    MOUNTED_GRID.with(|slot| {
        *slot.borrow_mut() = Some(MountedGrid {
            view,
            _lands: lands,
        });
    });
    Ok(())
}

/// Land grid drawn on a Canvas 2D surface, driven by `requestAnimationFrame`.
#[component]
pub fn LandGridCanvas() -> impl IntoView {
    let LandsSignal(lands) = expect_context();
    let WalletAddress(wallet) = expect_context();
    let SelectedLand(selected) = expect_context();
    let GridSettings(config) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let store = LandStore::default();

    // Mirror the reactive land list into the store the view subscribes to.
    Effect::new({
        let store = store.clone();
        move || {
            store.replace(lands.get());
        }
    });

    Effect::new({
        let store = store.clone();
        move || {
            let Some(canvas) = canvas_ref.get() else {
                return;
            };
            if is_mounted() {
                return;
            }
            let canvas: &HtmlCanvasElement = &canvas;
            if let Err(e) = mount_grid(
                canvas,
                &store,
                config.clone(),
                selected,
                wallet.get_untracked(),
            ) {
                web_sys::console::warn_1(&format!("land grid mount failed: {e}").into());
            }
        }
    });

    Effect::new(move || {
        let address = wallet.get();
        with_view(|view| view.set_current_user(address.as_deref()));
    });

    on_cleanup(teardown);

    // --- Input handlers ---

    let on_pointer_down = move |e: PointerEvent| {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let (x, y) = local_point(&canvas, e.client_x(), e.client_y());
        with_view(|view| view.pointer_down(x, y));
        canvas.set_pointer_capture(e.pointer_id()).ok();
        set_cursor(&canvas, "grabbing");
    };

    let on_pointer_move = move |e: PointerEvent| {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let (x, y) = local_point(&canvas, e.client_x(), e.client_y());
        with_view(|view| view.pointer_move(x, y));
    };

    let on_pointer_up = move |e: PointerEvent| {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let (x, y) = local_point(&canvas, e.client_x(), e.client_y());
        with_view(|view| view.pointer_up(x, y));
        set_cursor(&canvas, "grab");
    };

    let on_pointer_leave = move |_: PointerEvent| {
        with_view(|view| view.pointer_leave());
    };

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let Some(canvas) = canvas_ref.get_untracked() else {
            return;
        };
        let (x, y) = local_point(&canvas, e.client_x(), e.client_y());
        let delta = e.delta_y();
        with_view(|view| view.wheel(x, y, delta));
    };

    view! {
        <div style="position: relative; width: 100%; height: 100%; overflow: hidden;">
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
                on:pointerdown=on_pointer_down
                on:pointermove=on_pointer_move
                on:pointerup=on_pointer_up
                on:pointerleave=on_pointer_leave
                on:wheel=on_wheel
            />
        </div>
    }
}
