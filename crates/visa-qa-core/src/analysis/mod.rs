//! Pixel analysis over raw RGBA frames.
//!
//! All functions are pure and linear in the pixel count.

mod corners;
mod frame;
mod luma;

pub use corners::corner_brightness;
pub use frame::PixelFrame;
pub use luma::{luminance, LumaMoments, LumaPlane};
