//! Owned raster with an explicit row stride.
//!
//! A [`PixelBuffer`] is always fully constructed: allocation goes through
//! [`PixelBuffer::new`], which reports failure as [`BufferError::Allocation`]
//! instead of handing back a half-built or zero-sized raster. Callers build the
//! replacement buffer first and only then drop the one it replaces.

use super::backend::Dimensions;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    #[error("cannot allocate a {width}x{height} buffer: probably out of memory")]
    Allocation { width: u32, height: u32 },
    #[error("invalid buffer geometry: {0}")]
    Geometry(String),
}

/// An 8-bit-per-sample raster: `channels` bytes per pixel, rows `row_stride` bytes apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    channels: u8,
    has_alpha: bool,
    row_stride: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Allocate a zero-filled, tightly packed buffer.
    pub fn new(width: u32, height: u32, channels: u8, has_alpha: bool) -> Result<Self, BufferError> {
        check_layout(width, height, channels, has_alpha)?;
        let row_stride = width as usize * channels as usize;
        let mut data = reserve_packed(width, height, channels)?;
        data.resize(row_stride * height as usize, 0);

        Ok(Self {
            width,
            height,
            channels,
            has_alpha,
            row_stride,
            data,
        })
    }

    /// Wrap decoded pixel data. `data` must hold `height` rows of `row_stride`
    /// bytes (the last row may stop right after its final pixel).
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: u8,
        has_alpha: bool,
        row_stride: usize,
        data: Vec<u8>,
    ) -> Result<Self, BufferError> {
        check_layout(width, height, channels, has_alpha)?;
        let row_bytes = width as usize * channels as usize;
        if row_stride < row_bytes {
            return Err(BufferError::Geometry(format!(
                "row stride {row_stride} is shorter than a {width}-pixel row"
            )));
        }
        let needed = row_stride * (height as usize - 1) + row_bytes;
        if data.len() < needed {
            return Err(BufferError::Geometry(format!(
                "{} bytes of pixel data, {width}x{height} needs {needed}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            has_alpha,
            row_stride,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.width, self.height)
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn has_alpha(&self) -> bool {
        self.has_alpha
    }

    pub fn row_stride(&self) -> usize {
        self.row_stride
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// An empty buffer with the same channel layout, sized `dims`.
    pub fn with_same_layout(&self, dims: Dimensions) -> Result<Self, BufferError> {
        Self::new(dims.width, dims.height, self.channels, self.has_alpha)
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.row_stride + x as usize * self.channels as usize
    }

    /// The bytes of one pixel. Panics if `(x, y)` lies outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let start = self.offset(x, y);
        &self.data[start..start + self.channels as usize]
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [u8] {
        assert!(x < self.width && y < self.height, "pixel ({x}, {y}) out of bounds");
        let start = self.offset(x, y);
        let channels = self.channels as usize;
        &mut self.data[start..start + channels]
    }

    /// Fail with [`BufferError::Allocation`] unless a tightly packed
    /// `target` raster with this buffer's channel count could be allocated.
    /// The memory is released again straight away.
    pub fn check_allocation(&self, target: Dimensions) -> Result<(), BufferError> {
        reserve_packed(target.width, target.height, self.channels).map(drop)
    }

    /// Pixel bytes without row padding, in row order.
    pub fn packed_rows(&self) -> Vec<u8> {
        let row_bytes = self.width as usize * self.channels as usize;
        (0..self.height as usize)
            .flat_map(|y| {
                let start = y * self.row_stride;
                self.data[start..start + row_bytes].iter().copied()
            })
            .collect()
    }
}

/// Empty vector with room for exactly `width * height * channels` bytes.
fn reserve_packed(width: u32, height: u32, channels: u8) -> Result<Vec<u8>, BufferError> {
    let alloc_err = || BufferError::Allocation { width, height };
    let len = (width as usize)
        .checked_mul(channels as usize)
        .and_then(|row| row.checked_mul(height as usize))
        .ok_or_else(alloc_err)?;
    let mut data = Vec::new();
    data.try_reserve_exact(len).map_err(|_| alloc_err())?;
    Ok(data)
}

fn check_layout(width: u32, height: u32, channels: u8, has_alpha: bool) -> Result<(), BufferError> {
    if width == 0 || height == 0 {
        return Err(BufferError::Geometry(format!(
            "{width}x{height} has no pixels"
        )));
    }
    if !(1..=4).contains(&channels) {
        return Err(BufferError::Geometry(format!(
            "{channels} channels per pixel"
        )));
    }
    if has_alpha && channels % 2 != 0 {
        return Err(BufferError::Geometry(format!(
            "alpha needs 2 or 4 channels, got {channels}"
        )));
    }
    Ok(())
}
