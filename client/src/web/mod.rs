//! Browser binding: Canvas 2D surface, `requestAnimationFrame` scheduling and
//! the Leptos shell around the grid view.

mod app;
mod canvas;
mod feed;
mod raf;

pub use app::App;
pub use canvas::{CanvasSurface, LandGridCanvas};
pub use feed::FeedStatus;
pub use raf::RafScheduler;
