use crate::foundation::core::{Size, Viewport};
use crate::foundation::error::{TwinframeError, TwinframeResult};
use crate::foundation::math::rgba8_len;

/// A raster target: premultiplied RGBA8 backing buffer plus the logical
/// (unscaled) size and backing-scale factor it was sized for.
///
/// Backing dimensions are `floor(logical × scale_factor)`. The buffer is
/// resized in place and only when the computed backing size actually
/// changes; needless churn would discard baked filter pixels.
#[derive(Clone, Debug)]
pub struct Surface {
    viewport: Viewport,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    pub fn new(logical: Size, scale_factor: f64) -> TwinframeResult<Self> {
        let viewport = Viewport::new(logical, scale_factor)?;
        let width = viewport.backing_width();
        let height = viewport.backing_height();
        let len = rgba8_len(width, height)
            .ok_or_else(|| TwinframeError::raster("surface byte size overflow"))?;
        Ok(Self {
            viewport,
            width,
            height,
            data: vec![0u8; len],
        })
    }

    /// Adopt a new viewport. The backing buffer is reallocated (and zeroed)
    /// only when the computed backing dimensions differ from the current
    /// ones; a pure logical/scale bookkeeping change keeps the pixels.
    ///
    /// Returns true when the backing dimensions changed.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        let width = viewport.backing_width();
        let height = viewport.backing_height();
        self.viewport = viewport;
        if width == self.width && height == self.height {
            return false;
        }
        let len = rgba8_len(width, height).unwrap_or(0);
        self.width = width;
        self.height = height;
        self.data.clear();
        self.data.resize(len, 0);
        true
    }

    pub fn logical_size(&self) -> Size {
        self.viewport.logical
    }

    pub fn scale_factor(&self) -> f64 {
        self.viewport.scale_factor
    }

    /// Backing-buffer width in device pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Backing-buffer height in device pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA8 pixels, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Replace the whole backing buffer with `pixels`.
    pub fn commit(&mut self, pixels: &[u8]) -> TwinframeResult<()> {
        if pixels.len() != self.data.len() {
            return Err(TwinframeError::raster(
                "commit expects a buffer matching the surface backing size",
            ));
        }
        self.data.copy_from_slice(pixels);
        Ok(())
    }

    /// Copy another surface's pixels into this one. Both surfaces must share
    /// backing dimensions (the engine's twin-surface invariant).
    pub fn copy_from(&mut self, other: &Surface) -> TwinframeResult<()> {
        if self.width != other.width || self.height != other.height {
            return Err(TwinframeError::raster(
                "copy_from expects surfaces with identical backing dimensions",
            ));
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    /// The pixel at backing coordinates `(x, y)`, or transparent black when
    /// out of bounds. Read path for magnifier-style collaborators.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if x >= self.width || y >= self.height {
            return [0, 0, 0, 0];
        }
        let i = ((y * self.width + x) as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// Copy out the surface contents as a straight-alpha `image` buffer,
    /// for host-side save/export paths.
    pub fn to_rgba8_image(&self) -> TwinframeResult<image::RgbaImage> {
        let mut out = self.data.clone();
        for px in out.chunks_exact_mut(4) {
            let a = px[3] as u16;
            if a == 0 || a == 255 {
                continue;
            }
            px[0] = ((u16::from(px[0]) * 255 + a / 2) / a).min(255) as u8;
            px[1] = ((u16::from(px[1]) * 255 + a / 2) / a).min(255) as u8;
            px[2] = ((u16::from(px[2]) * 255 + a / 2) / a).min(255) as u8;
        }
        image::RgbaImage::from_raw(self.width, self.height, out)
            .ok_or_else(|| TwinframeError::raster("surface buffer does not match its dimensions"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backing_dims_floor_logical_times_scale() {
        let s = Surface::new(Size::new(800.0, 600.0), 1.5).unwrap();
        assert_eq!(s.width(), 1200);
        assert_eq!(s.height(), 900);
        assert_eq!(s.data().len(), 1200 * 900 * 4);
    }

    #[test]
    fn resize_is_noop_when_backing_unchanged() {
        let mut s = Surface::new(Size::new(10.0, 10.0), 1.0).unwrap();
        s.data_mut()[0] = 42;

        // Fractional logical change that floors to the same backing size.
        let v = Viewport::new(Size::new(10.4, 10.9), 1.0).unwrap();
        assert!(!s.resize(v));
        assert_eq!(s.data()[0], 42);

        let v = Viewport::new(Size::new(11.0, 10.0), 1.0).unwrap();
        assert!(s.resize(v));
        assert_eq!(s.data()[0], 0);
        assert_eq!(s.width(), 11);
    }

    #[test]
    fn commit_validates_length() {
        let mut s = Surface::new(Size::new(2.0, 2.0), 1.0).unwrap();
        assert!(s.commit(&[1u8; 16]).is_ok());
        assert!(s.commit(&[1u8; 15]).is_err());
        assert_eq!(s.data()[0], 1);
    }

    #[test]
    fn copy_from_requires_twin_dims() {
        let mut a = Surface::new(Size::new(2.0, 2.0), 1.0).unwrap();
        let b = Surface::new(Size::new(3.0, 2.0), 1.0).unwrap();
        assert!(a.copy_from(&b).is_err());
    }

    #[test]
    fn export_unpremultiplies() {
        let mut s = Surface::new(Size::new(1.0, 1.0), 1.0).unwrap();
        s.commit(&[64, 64, 64, 128]).unwrap();
        let img = s.to_rgba8_image().unwrap();
        let px = img.get_pixel(0, 0).0;
        assert_eq!(px[3], 128);
        assert!(px[0] >= 126 && px[0] <= 129);
    }

    #[test]
    fn out_of_bounds_pixel_is_transparent() {
        let s = Surface::new(Size::new(2.0, 2.0), 1.0).unwrap();
        assert_eq!(s.pixel(5, 0), [0, 0, 0, 0]);
    }
}
