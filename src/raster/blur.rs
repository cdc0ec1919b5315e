use crate::foundation::error::{TwinframeError, TwinframeResult};
use crate::foundation::math::rgba8_len;

const MAX_RADIUS: i32 = 256;

/// Separable Gaussian blur over premultiplied RGBA8, edge-clamped.
///
/// `sigma` is the standard deviation in backing pixels; the kernel radius is
/// `ceil(3σ)`, capped so a hostile filter spec cannot demand an unbounded
/// kernel.
pub(crate) fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    sigma: f32,
) -> TwinframeResult<Vec<u8>> {
    let expected = rgba8_len(width, height)
        .ok_or_else(|| TwinframeError::raster("blur buffer size overflow"))?;
    if src.len() != expected {
        return Err(TwinframeError::raster(
            "blur expects src matching width*height*4",
        ));
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Ok(src.to_vec());
    }

    let radius = ((sigma * 3.0).ceil() as i32).clamp(1, MAX_RADIUS);
    let kernel = gaussian_kernel(radius, sigma);

    let mut tmp = vec![0u8; expected];
    let mut out = vec![0u8; expected];
    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

fn gaussian_kernel(radius: i32, sigma: f32) -> Vec<f32> {
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let mut weights = Vec::with_capacity((2 * radius + 1) as usize);
    let mut sum = 0.0f64;
    for i in -radius..=radius {
        let x = f64::from(i);
        let w = (-x * x / denom).exp();
        weights.push(w);
        sum += w;
    }
    weights.into_iter().map(|w| (w / sum) as f32).collect()
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, kernel: &[f32]) {
    let radius = (kernel.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += kw * f32::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, kernel: &[f32]) {
    let radius = (kernel.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            for (ki, &kw) in kernel.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += kw * f32::from(src[idx + c]);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = acc[c].round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_positive_sigma_is_identity() {
        let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(blur_rgba8_premul(&src, 1, 2, 0.0).unwrap(), src);
        assert_eq!(blur_rgba8_premul(&src, 1, 2, -1.0).unwrap(), src);
    }

    #[test]
    fn constant_image_is_unchanged() {
        let (w, h) = (4u32, 3u32);
        let src = [10u8, 20, 30, 255].repeat((w * h) as usize);
        assert_eq!(blur_rgba8_premul(&src, w, h, 2.0).unwrap(), src);
    }

    #[test]
    fn energy_spreads_from_a_single_pixel() {
        let (w, h) = (7u32, 7u32);
        let mut src = vec![0u8; (w * h * 4) as usize];
        let center = ((3 * w + 3) * 4) as usize;
        src[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

        let out = blur_rgba8_premul(&src, w, h, 1.0).unwrap();
        let lit = out.chunks_exact(4).filter(|px| px[3] != 0).count();
        assert!(lit > 1);
        assert!(out[center + 3] < 255);
    }

    #[test]
    fn wrong_length_is_rejected() {
        assert!(blur_rgba8_premul(&[0u8; 9], 1, 2, 1.0).is_err());
    }
}
