//! Headless basestation map: the region border, its inverse mask and the station markers,
//! kept as typed overlays over a Web Mercator viewport and exported for the browser.

pub mod error;
pub mod export;
pub mod outline;
pub mod overlay;
pub mod palette;
pub mod source;
pub mod view;
pub mod viewport;

pub use view::{load_map, MapOptions, MapView};
