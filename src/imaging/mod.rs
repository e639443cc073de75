//! Pixel-level geometry: buffers, rotation, and scale policy.
//!
//! | Operation | Where |
//! |---|---|
//! | **Decode + metadata** | [`ImageBackend`] / [`RustBackend`] (`image`, `kamadak-exif`) |
//! | **Scale policy** | [`resolve_target`], pure dimension math |
//! | **Rescale** | [`ImageBackend::scale`], `image::imageops::resize` in production |
//! | **Rotate** | [`rotate()`], a lossless right-angle remap |
//!
//! The module is split into:
//! - **Buffer**: the owned raster every other part passes around
//! - **Parameters**: [`Rotation`] and [`ScaleRatio`]
//! - **Calculations**: pure functions for target sizes (unit testable)
//! - **Rotate**: the pixel remap
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]

pub mod backend;
pub mod buffer;
mod calculations;
mod params;
pub mod rotate;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, ImageMetadata};
pub use buffer::{BufferError, PixelBuffer};
pub use calculations::{
    FULLSCREEN_SCALE_SLOP, NORMAL_SCALE_SLOP, PolicyError, ScaleMode, ScaleRequest,
    resolve_target, scale_to_fit,
};
pub use params::{Rotation, ScaleRatio};
pub use rotate::rotate;
pub use rust_backend::{RustBackend, is_supported_image, supported_input_extensions};
