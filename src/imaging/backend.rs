//! Image backend trait and shared types.
//!
//! The [`ImageBackend`] trait covers the three collaborator operations the
//! viewer needs from the outside world: decode a file into a
//! [`PixelBuffer`], read the orientation/date metadata, and rescale a buffer.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the
//! [`MockBackend`](tests::MockBackend) below, which synthesizes buffers of
//! configured sizes and records every call.

use super::buffer::{BufferError, PixelBuffer};
use super::params::Rotation;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

/// Width and height of an image or of the space it is shown in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// `true` when either axis is zero (a record that was never decoded).
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn swapped(self) -> Self {
        Self {
            width: self.height,
            height: self.width,
        }
    }

    /// These dimensions as seen after applying `rotation`.
    pub fn oriented(self, rotation: Rotation) -> Self {
        if rotation.swaps_axes() {
            self.swapped()
        } else {
            self
        }
    }

    /// `true` when either axis is larger than the same axis of `other`.
    pub fn exceeds(self, other: Dimensions) -> bool {
        self.width > other.width || self.height > other.height
    }

    /// `true` when both axes are strictly smaller than `other`.
    pub fn smaller_than(self, other: Dimensions) -> bool {
        self.width < other.width && self.height < other.height
    }

    /// Sum of the absolute per-axis differences.
    pub fn distance(self, other: Dimensions) -> u32 {
        self.width.abs_diff(other.width) + self.height.abs_diff(other.height)
    }

    pub fn pixels(self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Dimensions {
    type Err = String;

    /// Parses `WIDTHxHEIGHT`, e.g. `1920x1080`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
        let width = w
            .trim()
            .parse()
            .map_err(|_| format!("invalid width '{w}'"))?;
        let height = h
            .trim()
            .parse()
            .map_err(|_| format!("invalid height '{h}'"))?;
        Ok(Self { width, height })
    }
}

/// Embedded metadata the viewer cares about.
///
/// Every field is optional: most files carry none of them, and that is not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageMetadata {
    /// Clockwise rotation the camera asks for, from the EXIF Orientation tag.
    pub orientation: Option<Rotation>,
    /// Capture date, display only.
    pub date: Option<String>,
    /// Free text from a sidecar file, if one exists.
    pub comment: Option<String>,
}

/// Trait for image backends.
///
/// `decode` and `read_metadata` talk to the filesystem; `scale` is a pure
/// buffer operation, kept on the trait so tests can inject allocation
/// failures.
pub trait ImageBackend {
    /// Decode a file into a freshly allocated pixel buffer.
    fn decode(&self, path: &Path) -> Result<PixelBuffer, BackendError>;

    /// Read orientation and date. Missing metadata yields the default value.
    fn read_metadata(&self, path: &Path) -> Result<ImageMetadata, BackendError>;

    /// Produce a rescaled copy of `buffer`. The source is left untouched.
    fn scale(&self, buffer: &PixelBuffer, target: Dimensions) -> Result<PixelBuffer, BackendError>;
}
