//! Production backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP, GIF, BMP) | `image::ImageReader` with format sniffing |
//! | Metadata | `kamadak-exif` via [`crate::metadata`] |
//! | Rescale | `image::imageops::resize` with `Nearest` filter |
//!
//! Decoded images are normalized to 8 bits per sample: gray, gray+alpha, RGB
//! or RGBA, whichever keeps the source's channels.

use super::backend::{BackendError, ImageBackend, ImageMetadata};
use super::buffer::PixelBuffer;
use super::backend::Dimensions;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageBuffer, ImageFormat, ImageReader, Luma, LumaA, Pixel, Rgb, Rgba};
use std::path::Path;
use std::sync::LazyLock;

const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
    ("gif", ImageFormat::Gif),
    ("bmp", ImageFormat::Bmp),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// `true` if the path's extension names a decodable format.
pub fn is_supported_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

/// Backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Load and decode an image from disk. The format is sniffed from content,
/// so misnamed files still open.
fn load_image(path: &Path) -> Result<DynamicImage, BackendError> {
    ImageReader::open(path)
        .map_err(BackendError::Io)?
        .with_guessed_format()
        .map_err(BackendError::Io)?
        .decode()
        .map_err(|e| BackendError::Decode(format!("{}: {}", path.display(), e)))
}

fn into_pixel_buffer(img: DynamicImage) -> Result<PixelBuffer, BackendError> {
    let (width, height) = (img.width(), img.height());
    let color = img.color();
    let (channels, has_alpha, data) = match (color.channel_count(), color.has_alpha()) {
        (1, _) => (1, false, img.into_luma8().into_raw()),
        (2, _) => (2, true, img.into_luma_alpha8().into_raw()),
        (_, true) => (4, true, img.into_rgba8().into_raw()),
        _ => (3, false, img.into_rgb8().into_raw()),
    };
    let row_stride = width as usize * channels as usize;
    Ok(PixelBuffer::from_raw(
        width, height, channels, has_alpha, row_stride, data,
    )?)
}

/// Nearest-neighbour rescale to `target`, keeping the channel layout.
///
/// The output size is checked against available memory before `imageops`
/// allocates, so an oversized zoom reports [`BufferError::Allocation`]
/// instead of aborting.
///
/// [`BufferError::Allocation`]: super::buffer::BufferError::Allocation
pub fn resize_nearest(buffer: &PixelBuffer, target: Dimensions) -> Result<PixelBuffer, BackendError> {
    buffer.check_allocation(target)?;
    let data = match buffer.channels() {
        1 => resize_as::<Luma<u8>>(buffer, target)?,
        2 => resize_as::<LumaA<u8>>(buffer, target)?,
        3 => resize_as::<Rgb<u8>>(buffer, target)?,
        _ => resize_as::<Rgba<u8>>(buffer, target)?,
    };
    let row_stride = target.width as usize * buffer.channels() as usize;
    Ok(PixelBuffer::from_raw(
        target.width,
        target.height,
        buffer.channels(),
        buffer.has_alpha(),
        row_stride,
        data,
    )?)
}

fn resize_as<P: Pixel<Subpixel = u8> + 'static>(
    buffer: &PixelBuffer,
    target: Dimensions,
) -> Result<Vec<u8>, BackendError> {
    let view = ImageBuffer::<P, Vec<u8>>::from_raw(buffer.width(), buffer.height(), buffer.packed_rows())
        .ok_or_else(|| BackendError::Decode(format!("{} pixel data is short", buffer.dimensions())))?;
    Ok(imageops::resize(&view, target.width, target.height, FilterType::Nearest).into_raw())
}

impl ImageBackend for RustBackend {
    fn decode(&self, path: &Path) -> Result<PixelBuffer, BackendError> {
        into_pixel_buffer(load_image(path)?)
    }

    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata, BackendError> {
        Ok(crate::metadata::read_metadata(path))
    }

    fn scale(&self, buffer: &PixelBuffer, target: Dimensions) -> Result<PixelBuffer, BackendError> {
        resize_nearest(buffer, target)
    }
}
