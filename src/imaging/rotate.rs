//! Lossless right-angle rotation.
//!
//! Pixels are moved, never resampled: every channel byte of every source pixel
//! lands unchanged at its remapped position. Destination coordinates are
//! computed from source coordinates:
//!
//! | Rotation | Source (x, y) goes to | Output size |
//! |---|---|---|
//! | 90° | (h - 1 - y, x) | h × w |
//! | 180° | (w - 1 - x, h - 1 - y) | w × h |
//! | 270° | (y, w - 1 - x) | h × w |

use super::buffer::{BufferError, PixelBuffer};
use super::params::Rotation;
use std::borrow::Cow;

/// Rotate `source` clockwise by `rotation`.
///
/// [`Rotation::Upright`] borrows the source back without allocating. Any other
/// rotation allocates the output in full before returning it, so a failed
/// allocation leaves the caller holding the untouched source.
pub fn rotate(source: &PixelBuffer, rotation: Rotation) -> Result<Cow<'_, PixelBuffer>, BufferError> {
    if rotation.is_upright() {
        return Ok(Cow::Borrowed(source));
    }

    let (w, h) = (source.width(), source.height());
    let mut out = source.with_same_layout(source.dimensions().oriented(rotation))?;

    for y in 0..h {
        for x in 0..w {
            let (nx, ny) = match rotation {
                Rotation::Cw90 => (h - 1 - y, x),
                Rotation::Cw180 => (w - 1 - x, h - 1 - y),
                Rotation::Cw270 => (y, w - 1 - x),
                Rotation::Upright => (x, y),
            };
            out.pixel_mut(nx, ny).copy_from_slice(source.pixel(x, y));
        }
    }

    Ok(Cow::Owned(out))
}
