//! Parameter types for geometry operations.
//!
//! - [`Rotation`]: one of the four right-angle orientations. Signed degree
//!   increments normalize into it (`-90` → 270°), and rotations compose with `+`.
//! - [`ScaleRatio`]: the user's zoom multiplier, clamped on construction.

use std::fmt;
use std::ops::Add;

/// Clockwise rotation by a multiple of 90°.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Rotation {
    #[default]
    Upright,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Normalize a signed degree value. Anything that is not a multiple of 90
    /// has no lossless rotation and yields `None`.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        match degrees.rem_euclid(360) {
            0 => Some(Self::Upright),
            90 => Some(Self::Cw90),
            180 => Some(Self::Cw180),
            270 => Some(Self::Cw270),
            _ => None,
        }
    }

    pub fn degrees(self) -> u16 {
        match self {
            Self::Upright => 0,
            Self::Cw90 => 90,
            Self::Cw180 => 180,
            Self::Cw270 => 270,
        }
    }

    pub fn is_upright(self) -> bool {
        self == Self::Upright
    }

    /// 90° and 270° exchange width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Self::Cw90 | Self::Cw270)
    }

    /// The rotation that undoes this one.
    pub fn inverse(self) -> Self {
        match self {
            Self::Upright => Self::Upright,
            Self::Cw90 => Self::Cw270,
            Self::Cw180 => Self::Cw180,
            Self::Cw270 => Self::Cw90,
        }
    }
}

impl Add for Rotation {
    type Output = Rotation;

    fn add(self, rhs: Rotation) -> Rotation {
        let sum = (self.degrees() + rhs.degrees()) % 360;
        match sum {
            90 => Self::Cw90,
            180 => Self::Cw180,
            270 => Self::Cw270,
            _ => Self::Upright,
        }
    }
}

impl fmt::Display for Rotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}

/// Zoom multiplier applied by the ratio scale modes (1/32 – 32, default 1).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleRatio(f64);

impl ScaleRatio {
    pub const MIN: f64 = 1.0 / 32.0;
    pub const MAX: f64 = 32.0;

    pub fn new(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(Self::MIN, Self::MAX))
        } else {
            Self::default()
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn doubled(self) -> Self {
        Self::new(self.0 * 2.0)
    }

    pub fn halved(self) -> Self {
        Self::new(self.0 / 2.0)
    }

    /// Apply to a pixel count, truncating like an integer conversion would.
    pub fn apply(self, pixels: u32) -> u32 {
        (pixels as f64 * self.0) as u32
    }
}

impl Default for ScaleRatio {
    fn default() -> Self {
        Self(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_degrees_wrap() {
        assert_eq!(Rotation::from_degrees(-90), Some(Rotation::Cw270));
        assert_eq!(Rotation::from_degrees(-270), Some(Rotation::Cw90));
        assert_eq!(Rotation::from_degrees(450), Some(Rotation::Cw90));
        assert_eq!(Rotation::from_degrees(720), Some(Rotation::Upright));
    }

    #[test]
    fn off_axis_degrees_are_rejected() {
        assert_eq!(Rotation::from_degrees(45), None);
        assert_eq!(Rotation::from_degrees(-1), None);
    }

    #[test]
    fn rotations_compose() {
        assert_eq!(Rotation::Cw90 + Rotation::Cw90, Rotation::Cw180);
        assert_eq!(Rotation::Cw270 + Rotation::Cw180, Rotation::Cw90);
        assert_eq!(Rotation::Cw90 + Rotation::Cw90.inverse(), Rotation::Upright);
    }

    #[test]
    fn only_quarter_turns_swap_axes() {
        assert!(Rotation::Cw90.swaps_axes());
        assert!(Rotation::Cw270.swaps_axes());
        assert!(!Rotation::Cw180.swaps_axes());
        assert!(!Rotation::Upright.swaps_axes());
    }

    #[test]
    fn scale_ratio_clamps_to_valid_range() {
        assert_eq!(ScaleRatio::new(100.0).value(), 32.0);
        assert_eq!(ScaleRatio::new(0.0).value(), ScaleRatio::MIN);
        assert_eq!(ScaleRatio::new(f64::NAN).value(), 1.0);
        assert_eq!(ScaleRatio::new(1.5).value(), 1.5);
    }

    #[test]
    fn scale_ratio_doubles_and_halves() {
        let ratio = ScaleRatio::default().doubled().doubled();
        assert_eq!(ratio.value(), 4.0);
        assert_eq!(ratio.halved().value(), 2.0);
        assert_eq!(ScaleRatio::new(0.5).apply(1001), 500);
    }
}
