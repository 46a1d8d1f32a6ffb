pub mod colors;
pub mod events;
pub mod land;

pub use colors::owner_color;
pub use events::*;
pub use land::*;
