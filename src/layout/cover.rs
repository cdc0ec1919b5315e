use crate::foundation::core::Size;

/// Pan displacement in natural-image pixel units.
///
/// Owned by the engine; reset to `(0, 0)` whenever the active image is
/// swapped. Arbitrarily large values are legal; the crop computation clamps
/// them to the image bounds.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PanOffset {
    pub x: f64,
    pub y: f64,
}

impl PanOffset {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// The source rectangle of the natural image selected for display, in
/// natural-image pixels.
///
/// Always derived from the current image, container size, and pan offset,
/// never stored and recomputed lazily. Holds `0 <= sx`,
/// `sx + swidth <= natural_width` (symmetrically for y) for any pan.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CropWindow {
    pub sx: f64,
    pub sy: f64,
    pub swidth: f64,
    pub sheight: f64,
}

/// Fill-crop (`object-fit: cover`) source rectangle with pan.
///
/// The image is scaled to fill the container while preserving aspect ratio;
/// the overflowing axis is cropped. Panning only has effect on the axis with
/// slack: the fully-fitted axis clamps to its single valid value, so a wide
/// image cannot be panned vertically once its height fills the container.
///
/// Callers must supply a decode-complete image's natural size and a positive
/// container size; a zero natural height or container height yields
/// degenerate geometry (NaN), by contract with the engine's documented
/// preconditions.
pub fn cover_crop(
    natural_width: f64,
    natural_height: f64,
    container: Size,
    pan: PanOffset,
) -> CropWindow {
    let img_ratio = natural_width / natural_height;
    let container_ratio = container.width / container.height;

    let (swidth, sheight, base_sx, base_sy) = if img_ratio > container_ratio {
        // Image wider than the container: height fills, crop left/right.
        let sheight = natural_height;
        let swidth = sheight * container_ratio;
        (swidth, sheight, (natural_width - swidth) / 2.0, 0.0)
    } else {
        // Image taller (or equal): width fills, crop top/bottom.
        let swidth = natural_width;
        let sheight = swidth / container_ratio;
        (swidth, sheight, 0.0, (natural_height - sheight) / 2.0)
    };

    let max_sx = (natural_width - swidth).max(0.0);
    let max_sy = (natural_height - sheight).max(0.0);

    CropWindow {
        sx: (base_sx + pan.x).clamp(0.0, max_sx),
        sy: (base_sy + pan.y).clamp(0.0, max_sy),
        swidth,
        sheight,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(w: f64, h: f64) -> Size {
        Size::new(w, h)
    }

    #[test]
    fn wide_image_crops_left_right() {
        // 1920x1080 into 800x600: height fills, width crops to 4:3.
        let crop = cover_crop(1920.0, 1080.0, container(800.0, 600.0), PanOffset::default());
        assert_eq!(crop.sx, 240.0);
        assert_eq!(crop.sy, 0.0);
        assert_eq!(crop.swidth, 1440.0);
        assert_eq!(crop.sheight, 1080.0);
    }

    #[test]
    fn tall_image_crops_top_bottom() {
        let crop = cover_crop(1080.0, 1920.0, container(800.0, 600.0), PanOffset::default());
        assert_eq!(crop.sx, 0.0);
        assert_eq!(crop.sy, 555.0);
        assert_eq!(crop.swidth, 1080.0);
        assert_eq!(crop.sheight, 810.0);
    }

    #[test]
    fn pan_moves_only_the_axis_with_slack() {
        let crop = cover_crop(
            1920.0,
            1080.0,
            container(800.0, 600.0),
            PanOffset::new(100.0, 50.0),
        );
        assert_eq!(crop.sx, 340.0);
        // Height already fills the container, so vertical pan clamps to 0.
        assert_eq!(crop.sy, 0.0);
    }

    #[test]
    fn huge_pan_clamps_to_natural_bounds() {
        let crop = cover_crop(
            1920.0,
            1080.0,
            container(800.0, 600.0),
            PanOffset::new(1e9, -1e9),
        );
        assert_eq!(crop.sx, 1920.0 - crop.swidth);
        assert_eq!(crop.sy, 0.0);

        let crop = cover_crop(
            1920.0,
            1080.0,
            container(800.0, 600.0),
            PanOffset::new(-1e9, 1e9),
        );
        assert_eq!(crop.sx, 0.0);
        assert_eq!(crop.sy, 0.0);
    }

    #[test]
    fn crop_preserves_container_aspect() {
        for (nw, nh, cw, ch) in [
            (1920.0, 1080.0, 800.0, 600.0),
            (1080.0, 1920.0, 800.0, 600.0),
            (333.0, 777.0, 123.0, 456.0),
            (5000.0, 100.0, 640.0, 480.0),
        ] {
            let crop = cover_crop(nw, nh, container(cw, ch), PanOffset::default());
            assert!(crop.swidth <= nw + 1e-9);
            assert!(crop.sheight <= nh + 1e-9);
            assert!(crop.sx >= 0.0 && crop.sy >= 0.0);
            assert!(crop.sx + crop.swidth <= nw + 1e-9);
            assert!(crop.sy + crop.sheight <= nh + 1e-9);
            let crop_ratio = crop.swidth / crop.sheight;
            assert!((crop_ratio - cw / ch).abs() < 1e-9);
        }
    }
}
