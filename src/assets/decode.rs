use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::{TwinframeError, TwinframeResult};
use crate::foundation::math::{mul_div255_u8, rgba8_len};

/// A decode-complete raster asset: premultiplied RGBA8 pixels at the
/// image's natural dimensions.
///
/// The engine assumes every `SourceImage` handed to it is fully decoded;
/// that is the constructors' job, not the repaint paths'. Pixels sit behind
/// an `Arc` so the host can hold the same asset in several places (image
/// sets, magnifier, save paths) without copying.
#[derive(Clone, Debug)]
pub struct SourceImage {
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
}

impl SourceImage {
    /// Wrap raw premultiplied RGBA8 pixels.
    pub fn from_premul_rgba8(width: u32, height: u32, pixels: Vec<u8>) -> TwinframeResult<Self> {
        let expected = rgba8_len(width, height)
            .ok_or_else(|| TwinframeError::validation("image byte size overflow"))?;
        if pixels.len() != expected {
            return Err(TwinframeError::validation(format!(
                "image pixels must be width*height*4 bytes, got {} for {}x{}",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(pixels),
        })
    }

    /// Wrap straight-alpha RGBA8 pixels, premultiplying in place.
    pub fn from_rgba8(width: u32, height: u32, mut pixels: Vec<u8>) -> TwinframeResult<Self> {
        premultiply_rgba8_in_place(&mut pixels);
        Self::from_premul_rgba8(width, height, pixels)
    }

    /// Convert an already-decoded `image` crate value.
    pub fn from_image(img: &image::DynamicImage) -> TwinframeResult<Self> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self::from_rgba8(width, height, rgba.into_raw())
    }

    pub fn natural_width(&self) -> u32 {
        self.width
    }

    pub fn natural_height(&self) -> u32 {
        self.height
    }

    /// Premultiplied RGBA8 pixel data, row-major, 4 bytes per pixel.
    pub fn pixels(&self) -> &[u8] {
        &self.rgba8_premul
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> TwinframeResult<SourceImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    SourceImage::from_image(&dyn_img)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = mul_div255_u8(u16::from(px[0]), a);
        px[1] = mul_div255_u8(u16::from(px[1]), a);
        px[2] = mul_div255_u8(u16::from(px[2]), a);
    }
}
