use crate::assets::decode::SourceImage;
use crate::foundation::error::{TwinframeError, TwinframeResult};
use crate::foundation::math::rgba8_len;
use crate::layout::cover::CropWindow;

/// Bilinear sampler over one image's crop window.
///
/// Sampling is clamped to the crop rectangle (and the image bounds), so a
/// fractional crop edge never bleeds pixels from the cropped-away region.
struct CropSampler<'a> {
    px: &'a [u8],
    stride: i64,
    lo_x: i64,
    hi_x: i64,
    lo_y: i64,
    hi_y: i64,
}

impl<'a> CropSampler<'a> {
    fn new(image: &'a SourceImage, crop: CropWindow) -> Self {
        let iw = i64::from(image.natural_width());
        let ih = i64::from(image.natural_height());
        let lo_x = (crop.sx.floor() as i64).clamp(0, (iw - 1).max(0));
        let lo_y = (crop.sy.floor() as i64).clamp(0, (ih - 1).max(0));
        let hi_x = (((crop.sx + crop.swidth).ceil() as i64) - 1).clamp(lo_x, (iw - 1).max(0));
        let hi_y = (((crop.sy + crop.sheight).ceil() as i64) - 1).clamp(lo_y, (ih - 1).max(0));
        Self {
            px: image.pixels(),
            stride: iw,
            lo_x,
            hi_x,
            lo_y,
            hi_y,
        }
    }

    fn texel(&self, x: i64, y: i64) -> [u8; 4] {
        let i = ((y * self.stride + x) as usize) * 4;
        [self.px[i], self.px[i + 1], self.px[i + 2], self.px[i + 3]]
    }

    /// Bilinear sample at source coordinates `(sx, sy)` (pixel centers at
    /// half-integers).
    fn sample(&self, sx: f64, sy: f64) -> [u8; 4] {
        let fx = sx - 0.5;
        let fy = sy - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;

        let x0i = (x0 as i64).clamp(self.lo_x, self.hi_x);
        let x1i = (x0 as i64 + 1).clamp(self.lo_x, self.hi_x);
        let y0i = (y0 as i64).clamp(self.lo_y, self.hi_y);
        let y1i = (y0 as i64 + 1).clamp(self.lo_y, self.hi_y);

        let p00 = self.texel(x0i, y0i);
        let p10 = self.texel(x1i, y0i);
        let p01 = self.texel(x0i, y1i);
        let p11 = self.texel(x1i, y1i);

        let mut out = [0u8; 4];
        for c in 0..4 {
            let top = f64::from(p00[c]) * (1.0 - tx) + f64::from(p10[c]) * tx;
            let bot = f64::from(p01[c]) * (1.0 - tx) + f64::from(p11[c]) * tx;
            out[c] = (top * (1.0 - ty) + bot * ty).round().clamp(0.0, 255.0) as u8;
        }
        out
    }
}

fn check_dst(dst: &[u8], width: u32, height: u32) -> TwinframeResult<()> {
    let expected = rgba8_len(width, height)
        .ok_or_else(|| TwinframeError::raster("blit buffer size overflow"))?;
    if dst.len() != expected {
        return Err(TwinframeError::raster(
            "blit expects dst matching width*height*4",
        ));
    }
    Ok(())
}

fn blit_rows(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    image: &SourceImage,
    crop: CropWindow,
    offset_x: f64,
    mut span_for_row: impl FnMut(u32) -> (u32, u32),
) {
    if dst_w == 0 || dst_h == 0 || image.natural_width() == 0 || image.natural_height() == 0 {
        return;
    }
    let sampler = CropSampler::new(image, crop);
    let wf = f64::from(dst_w);
    let hf = f64::from(dst_h);

    for y in 0..dst_h {
        let (x0, x1) = span_for_row(y);
        if x0 >= x1 {
            continue;
        }
        let sy = crop.sy + ((f64::from(y) + 0.5) / hf) * crop.sheight;
        let row = ((y * dst_w) as usize) * 4;
        for x in x0..x1.min(dst_w) {
            // The image lands on dst columns [offset_x, offset_x + dst_w).
            let u = (f64::from(x) + 0.5 - offset_x) / wf;
            if !(0.0..1.0).contains(&u) {
                continue;
            }
            let sx = crop.sx + u * crop.swidth;
            let i = row + (x as usize) * 4;
            dst[i..i + 4].copy_from_slice(&sampler.sample(sx, sy));
        }
    }
}

/// Draw `image`'s crop window scaled onto the whole destination buffer,
/// translated horizontally by `offset_x` backing pixels. Destination pixels
/// the translated image does not land on are left untouched.
pub(crate) fn blit_cover(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    image: &SourceImage,
    crop: CropWindow,
    offset_x: f64,
) -> TwinframeResult<()> {
    check_dst(dst, dst_w, dst_h)?;
    blit_rows(dst, dst_w, dst_h, image, crop, offset_x, |_| (0, dst_w));
    Ok(())
}

/// Cover blit restricted to the full-height column span `[x0, x1)`.
pub(crate) fn blit_cover_rect(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    image: &SourceImage,
    crop: CropWindow,
    x0: u32,
    x1: u32,
) -> TwinframeResult<()> {
    check_dst(dst, dst_w, dst_h)?;
    blit_rows(dst, dst_w, dst_h, image, crop, 0.0, |_| (x0, x1));
    Ok(())
}

/// Cover blit restricted to a centered circle of `radius` backing pixels
/// around `(cx, cy)`. The clip edge is a hard per-pixel-center test.
pub(crate) fn blit_cover_circle(
    dst: &mut [u8],
    dst_w: u32,
    dst_h: u32,
    image: &SourceImage,
    crop: CropWindow,
    cx: f64,
    cy: f64,
    radius: f64,
) -> TwinframeResult<()> {
    check_dst(dst, dst_w, dst_h)?;
    if radius <= 0.0 {
        return Ok(());
    }
    blit_rows(dst, dst_w, dst_h, image, crop, 0.0, |y| {
        let dy = f64::from(y) + 0.5 - cy;
        let half = radius * radius - dy * dy;
        if half < 0.0 {
            return (0, 0);
        }
        let half = half.sqrt();
        // Pixel centers x + 0.5 within [cx - half, cx + half].
        let x0 = (cx - half - 0.5).ceil().max(0.0) as u32;
        let x1 = ((cx + half - 0.5).floor() as i64 + 1).max(0) as u32;
        (x0, x1)
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::cover::{PanOffset, cover_crop};

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> SourceImage {
        let px = rgba.repeat((width * height) as usize);
        SourceImage::from_premul_rgba8(width, height, px).unwrap()
    }

    fn crop_of(img: &SourceImage, w: u32, h: u32) -> CropWindow {
        cover_crop(
            f64::from(img.natural_width()),
            f64::from(img.natural_height()),
            kurbo::Size::new(f64::from(w), f64::from(h)),
            PanOffset::default(),
        )
    }

    #[test]
    fn full_blit_covers_every_pixel() {
        let img = solid(16, 9, [10, 20, 30, 255]);
        let (w, h) = (8u32, 6u32);
        let mut dst = vec![0u8; (w * h * 4) as usize];
        blit_cover(&mut dst, w, h, &img, crop_of(&img, w, h), 0.0).unwrap();
        assert!(dst.chunks_exact(4).all(|px| px == [10, 20, 30, 255]));
    }

    #[test]
    fn offset_blit_leaves_uncovered_columns_untouched() {
        let img = solid(8, 8, [9, 9, 9, 255]);
        let (w, h) = (8u32, 8u32);
        let mut dst = vec![0u8; (w * h * 4) as usize];
        blit_cover(&mut dst, w, h, &img, crop_of(&img, w, h), 4.0).unwrap();

        for y in 0..h {
            for x in 0..w {
                let i = ((y * w + x) as usize) * 4;
                if x < 4 {
                    assert_eq!(dst[i + 3], 0, "column {x} should be untouched");
                } else {
                    assert_eq!(&dst[i..i + 4], &[9, 9, 9, 255]);
                }
            }
        }
    }

    #[test]
    fn rect_blit_stays_in_span() {
        let img = solid(8, 8, [7, 7, 7, 255]);
        let (w, h) = (8u32, 4u32);
        let mut dst = vec![0u8; (w * h * 4) as usize];
        blit_cover_rect(&mut dst, w, h, &img, crop_of(&img, w, h), 2, 5).unwrap();

        for y in 0..h {
            for x in 0..w {
                let i = ((y * w + x) as usize) * 4;
                let painted = (2..5).contains(&x);
                assert_eq!(dst[i + 3] != 0, painted);
            }
        }
    }

    #[test]
    fn circle_blit_full_radius_covers_corners() {
        let img = solid(8, 8, [5, 5, 5, 255]);
        let (w, h) = (8u32, 8u32);
        let (cx, cy): (f64, f64) = (4.0, 4.0);
        let max_r = (cx * cx + cy * cy).sqrt();
        let mut dst = vec![0u8; (w * h * 4) as usize];
        blit_cover_circle(&mut dst, w, h, &img, crop_of(&img, w, h), cx, cy, max_r).unwrap();
        assert!(dst.chunks_exact(4).all(|px| px[3] == 255));
    }

    #[test]
    fn circle_blit_zero_radius_writes_nothing() {
        let img = solid(8, 8, [5, 5, 5, 255]);
        let mut dst = vec![0u8; 8 * 8 * 4];
        blit_cover_circle(&mut dst, 8, 8, &img, crop_of(&img, 8, 8), 4.0, 4.0, 0.0).unwrap();
        assert!(dst.iter().all(|&b| b == 0));
    }

    #[test]
    fn blit_validates_dst_length() {
        let img = solid(2, 2, [1, 1, 1, 255]);
        let mut dst = vec![0u8; 15];
        assert!(blit_cover(&mut dst, 2, 2, &img, crop_of(&img, 2, 2), 0.0).is_err());
    }
}
