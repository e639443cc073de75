//! Pure calculation functions for display dimensions.
//!
//! [`resolve_target`] decides how large an image should be shown under each
//! [`ScaleMode`]. All inputs are already expressed in the orientation the image
//! will have once any pending rotation is applied, so the policy never needs to
//! know about rotation itself.

use super::backend::Dimensions;
use super::params::ScaleRatio;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Below this many pixels of total change (width + height), Normal, ScreenRatio
/// and ImgRatio keep the current size.
pub const NORMAL_SCALE_SLOP: u32 = 5;

/// Below this many pixels of total change, Fullscreen keeps the current size.
pub const FULLSCREEN_SCALE_SLOP: u32 = 20;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("rotation of {0}° is not a multiple of 90")]
    Angle(i32),
    #[error("cannot scale {image} into {bounds}: empty geometry")]
    EmptyGeometry { image: Dimensions, bounds: Dimensions },
}

/// How the displayed size is derived from the image's true size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScaleMode {
    /// True size, shrunk to fit the bounds if needed, times the scale ratio.
    #[default]
    Normal,
    /// True size, even when larger than the bounds.
    Fullsize,
    /// True size times the scale ratio, ignoring the bounds.
    ImgRatio,
    /// Same policy as Normal; entered by zooming from a fitted mode.
    ScreenRatio,
    /// Larger axis matches the bounds exactly, scaling up or down.
    Fullscreen,
}

impl ScaleMode {
    pub fn slop(self) -> u32 {
        match self {
            Self::Fullscreen => FULLSCREEN_SCALE_SLOP,
            Self::Fullsize => 0,
            _ => NORMAL_SCALE_SLOP,
        }
    }
}

impl fmt::Display for ScaleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "normal",
            Self::Fullsize => "fullsize",
            Self::ImgRatio => "img-ratio",
            Self::ScreenRatio => "screen-ratio",
            Self::Fullscreen => "fullscreen",
        };
        f.write_str(name)
    }
}

impl FromStr for ScaleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "fullsize" => Ok(Self::Fullsize),
            "img-ratio" => Ok(Self::ImgRatio),
            "screen-ratio" => Ok(Self::ScreenRatio),
            "fullscreen" => Ok(Self::Fullscreen),
            other => Err(format!(
                "unknown scale mode '{other}' (expected normal, fullsize, img-ratio, screen-ratio or fullscreen)"
            )),
        }
    }
}

/// Everything the resolver looks at, in as-displayed orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRequest {
    /// Size as decoded from disk.
    pub true_dims: Dimensions,
    /// Size of the buffer as currently shown.
    pub current: Dimensions,
    /// Space available: monitor or window, depending on display mode.
    pub bounds: Dimensions,
    pub mode: ScaleMode,
    pub ratio: ScaleRatio,
}

/// Multiply `dim` by `num / den`, truncating. Exact for integer ratios.
fn scale_axis(dim: u32, num: u32, den: u32) -> u32 {
    (dim as u64 * num as u64 / den as u64) as u32
}

/// Scale `dims` so that both axes fit `bounds`, preserving aspect ratio.
///
/// Picks the smaller of the two per-axis ratios so the tighter axis lands
/// exactly on its bound. Works for enlarging as well as shrinking. Axes never
/// drop below one pixel.
///
/// # Examples
/// ```
/// # use ringview::imaging::{Dimensions, scale_to_fit};
/// let fitted = scale_to_fit(Dimensions::new(2000, 1000), Dimensions::new(1024, 768));
/// assert_eq!(fitted, Dimensions::new(1024, 512));
/// ```
pub fn scale_to_fit(dims: Dimensions, bounds: Dimensions) -> Dimensions {
    // bounds.w / dims.w > bounds.h / dims.h, cross-multiplied
    let x_ratio_larger =
        bounds.width as u64 * dims.height as u64 > bounds.height as u64 * dims.width as u64;
    let (num, den) = if x_ratio_larger {
        (bounds.height, dims.height)
    } else {
        (bounds.width, dims.width)
    };
    Dimensions::new(
        scale_axis(dims.width, num, den).max(1),
        scale_axis(dims.height, num, den).max(1),
    )
}

/// Apply the zoom multiplier, never going below one pixel.
fn apply_ratio(dims: Dimensions, ratio: ScaleRatio) -> Dimensions {
    Dimensions::new(
        ratio.apply(dims.width).max(1),
        ratio.apply(dims.height).max(1),
    )
}

/// Keep the current size when the target is within `slop` of it.
fn snap(target: Dimensions, current: Dimensions, slop: u32) -> Dimensions {
    if !current.is_empty() && target.distance(current) < slop {
        current
    } else {
        target
    }
}

/// Decide the displayed size for an image.
///
/// | Mode | Target |
/// |---|---|
/// | Fullsize | true size |
/// | Normal / ScreenRatio | true size, fitted to bounds if it overflows, × ratio |
/// | ImgRatio | true size × ratio |
/// | Fullscreen | true size fitted to bounds, up or down |
///
/// Every mode except Fullsize snaps to the current size when the target is
/// closer than the mode's [slop](ScaleMode::slop).
pub fn resolve_target(request: &ScaleRequest) -> Result<Dimensions, PolicyError> {
    let ScaleRequest {
        true_dims,
        current,
        bounds,
        mode,
        ratio,
    } = *request;

    if true_dims.is_empty() {
        return Err(PolicyError::EmptyGeometry {
            image: true_dims,
            bounds,
        });
    }
    let needs_bounds = matches!(
        mode,
        ScaleMode::Normal | ScaleMode::ScreenRatio | ScaleMode::Fullscreen
    );
    if needs_bounds && bounds.is_empty() {
        return Err(PolicyError::EmptyGeometry {
            image: true_dims,
            bounds,
        });
    }

    let target = match mode {
        ScaleMode::Fullsize => true_dims,
        ScaleMode::Normal | ScaleMode::ScreenRatio => {
            let overflows = true_dims.exceeds(bounds);
            let fitted = if overflows {
                scale_to_fit(true_dims, bounds)
            } else {
                true_dims
            };
            let target = apply_ratio(fitted, ratio);
            // an oversized current size never wins the snap
            if overflows && current.exceeds(bounds) {
                target
            } else {
                snap(target, current, mode.slop())
            }
        }
        ScaleMode::ImgRatio => snap(apply_ratio(true_dims, ratio), current, mode.slop()),
        ScaleMode::Fullscreen => snap(scale_to_fit(true_dims, bounds), current, mode.slop()),
    };
    Ok(target)
}
