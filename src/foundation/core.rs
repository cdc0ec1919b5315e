pub use kurbo::{Point, Rect, Size, Vec2};

use crate::foundation::error::{TwinframeError, TwinframeResult};

/// Owner-supplied layout state: the logical (unscaled) container size plus
/// the backing-scale factor of the display the surfaces are shown on.
///
/// Backing-buffer dimensions are always `floor(logical × scale_factor)`,
/// matching what a high-DPI host would allocate for a logical CSS size.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub logical: Size,
    pub scale_factor: f64,
}

impl Viewport {
    pub fn new(logical: Size, scale_factor: f64) -> TwinframeResult<Self> {
        if !logical.width.is_finite() || !logical.height.is_finite() {
            return Err(TwinframeError::validation(
                "viewport logical size must be finite",
            ));
        }
        if logical.width < 0.0 || logical.height < 0.0 {
            return Err(TwinframeError::validation(
                "viewport logical size must be >= 0",
            ));
        }
        if !scale_factor.is_finite() || scale_factor <= 0.0 {
            return Err(TwinframeError::validation(
                "viewport scale factor must be finite and > 0",
            ));
        }
        Ok(Self {
            logical,
            scale_factor,
        })
    }

    /// True when either logical dimension is zero. Resize-observer churn
    /// during host layout routinely reports zero sizes; repaints no-op on
    /// them rather than collapsing the backing buffers.
    pub fn is_empty(self) -> bool {
        self.logical.width <= 0.0 || self.logical.height <= 0.0
    }

    pub fn backing_width(self) -> u32 {
        (self.logical.width * self.scale_factor).floor().max(0.0) as u32
    }

    pub fn backing_height(self) -> u32 {
        (self.logical.height * self.scale_factor).floor().max(0.0) as u32
    }
}

/// Which way an image swap travels through the set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    /// Sign applied to horizontal travel: `Next` moves content leftward.
    pub fn signum(self) -> f64 {
        match self {
            Direction::Next => 1.0,
            Direction::Previous => -1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_backing_dims_floor() {
        let v = Viewport::new(Size::new(800.5, 600.25), 2.0).unwrap();
        assert_eq!(v.backing_width(), 1601);
        assert_eq!(v.backing_height(), 1200);
    }

    #[test]
    fn viewport_rejects_bad_scale() {
        assert!(Viewport::new(Size::new(10.0, 10.0), 0.0).is_err());
        assert!(Viewport::new(Size::new(10.0, 10.0), f64::NAN).is_err());
    }

    #[test]
    fn zero_size_is_empty() {
        let v = Viewport::new(Size::new(0.0, 600.0), 1.0).unwrap();
        assert!(v.is_empty());
        let v = Viewport::new(Size::new(800.0, 600.0), 1.0).unwrap();
        assert!(!v.is_empty());
    }

    #[test]
    fn direction_signum() {
        assert_eq!(Direction::Next.signum(), 1.0);
        assert_eq!(Direction::Previous.signum(), -1.0);
    }
}
