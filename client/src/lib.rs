//! Interactive land-tile grid: maps land records onto a 2D grid, handles
//! pan/zoom/hover/click against a drawing surface and keeps a frame loop in
//! step with asynchronously replaced land data.
//!
//! The engine modules are host-agnostic; [`web`] binds them to a browser
//! canvas through `requestAnimationFrame` and Leptos.

pub mod colors;
pub mod config;
pub mod grid;
pub mod render_loop;
pub mod selection;
pub mod source;
pub mod surface;
pub mod view;
pub mod viewport;
pub mod web;

pub use config::{GridConfig, Palette};
pub use grid::{GridMapper, Tile, TileRect};
pub use render_loop::{FrameScheduler, FrameStats, FrameToken, LoopState, ManualScheduler};
pub use selection::TileSelectionController;
pub use source::{LandDataSource, LandStore, Subscription};
pub use surface::{BackgroundImage, DrawSurface, ImageHandle, RecordingSurface};
pub use view::{GridView, Lifecycle, SharedGridView, bind_source};
pub use viewport::{ViewportState, ZoomDirection};
