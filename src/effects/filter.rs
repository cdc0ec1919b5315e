use crate::foundation::error::{TwinframeError, TwinframeResult};
use crate::foundation::math::rgba8_len;
use crate::raster::blur::blur_rgba8_premul;

/// One operation of a parsed filter descriptor.
///
/// The vocabulary mirrors the named paint-time filter operations of the
/// original rasterizer: color-matrix ops plus Gaussian blur. Amounts are
/// already normalized (percentages divided down, angles in degrees, blur
/// sigma in logical pixels).
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum FilterOp {
    Blur { sigma: f32 },
    Brightness { amount: f32 },
    Contrast { amount: f32 },
    Grayscale { amount: f32 },
    Sepia { amount: f32 },
    Saturate { amount: f32 },
    Invert { amount: f32 },
    Opacity { amount: f32 },
    HueRotate { degrees: f32 },
}

/// Parse a filter descriptor string into its operation list.
///
/// `"none"` (or an empty string) parses to an empty list. Anything else is a
/// whitespace-separated chain of `name(argument)` functions applied in
/// order, e.g. `"brightness(60%) contrast(150%)"` or `"blur(5px)"`.
/// Unknown function names reject the whole descriptor.
pub fn parse_filter(spec: &str) -> TwinframeResult<Vec<FilterOp>> {
    let spec = spec.trim();
    if spec.is_empty() || spec.eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }

    let mut ops = Vec::new();
    let mut rest = spec;
    while !rest.is_empty() {
        let open = rest.find('(').ok_or_else(|| {
            TwinframeError::filter(format!("expected 'name(arg)' near '{rest}'"))
        })?;
        let close = rest[open..]
            .find(')')
            .map(|i| open + i)
            .ok_or_else(|| TwinframeError::filter(format!("unclosed '(' near '{rest}'")))?;

        let name = rest[..open].trim().to_ascii_lowercase();
        let arg = rest[open + 1..close].trim();
        ops.push(parse_function(&name, arg)?);

        rest = rest[close + 1..].trim_start();
    }
    Ok(ops)
}

fn parse_function(name: &str, arg: &str) -> TwinframeResult<FilterOp> {
    match name {
        "blur" => Ok(FilterOp::Blur {
            sigma: parse_px(arg)?,
        }),
        "brightness" => Ok(FilterOp::Brightness {
            amount: parse_amount(arg, false)?,
        }),
        "contrast" => Ok(FilterOp::Contrast {
            amount: parse_amount(arg, false)?,
        }),
        "saturate" => Ok(FilterOp::Saturate {
            amount: parse_amount(arg, false)?,
        }),
        "grayscale" => Ok(FilterOp::Grayscale {
            amount: parse_amount(arg, true)?,
        }),
        "sepia" => Ok(FilterOp::Sepia {
            amount: parse_amount(arg, true)?,
        }),
        "invert" => Ok(FilterOp::Invert {
            amount: parse_amount(arg, true)?,
        }),
        "opacity" => Ok(FilterOp::Opacity {
            amount: parse_amount(arg, true)?,
        }),
        "hue-rotate" => Ok(FilterOp::HueRotate {
            degrees: parse_angle(arg)?,
        }),
        _ => Err(TwinframeError::filter(format!(
            "unknown filter function '{name}'"
        ))),
    }
}

/// Number or percentage. `clamp_unit` ops (grayscale, sepia, invert,
/// opacity) saturate at 1; the multiplicative ops stay unbounded above 0.
fn parse_amount(arg: &str, clamp_unit: bool) -> TwinframeResult<f32> {
    let (num, scale) = match arg.strip_suffix('%') {
        Some(n) => (n, 0.01f32),
        None => (arg, 1.0f32),
    };
    let v: f32 = num
        .trim()
        .parse()
        .map_err(|_| TwinframeError::filter(format!("invalid filter amount '{arg}'")))?;
    let v = v * scale;
    if !v.is_finite() || v < 0.0 {
        return Err(TwinframeError::filter(format!(
            "filter amount must be finite and >= 0, got '{arg}'"
        )));
    }
    Ok(if clamp_unit { v.min(1.0) } else { v })
}

fn parse_px(arg: &str) -> TwinframeResult<f32> {
    let num = arg.strip_suffix("px").unwrap_or(arg);
    let v: f32 = num
        .trim()
        .parse()
        .map_err(|_| TwinframeError::filter(format!("invalid blur length '{arg}'")))?;
    if !v.is_finite() || v < 0.0 {
        return Err(TwinframeError::filter(format!(
            "blur length must be finite and >= 0, got '{arg}'"
        )));
    }
    Ok(v)
}

fn parse_angle(arg: &str) -> TwinframeResult<f32> {
    let (num, to_degrees) = if let Some(n) = arg.strip_suffix("deg") {
        (n, 1.0f32)
    } else if let Some(n) = arg.strip_suffix("grad") {
        (n, 360.0 / 400.0)
    } else if let Some(n) = arg.strip_suffix("rad") {
        (n, 180.0 / std::f32::consts::PI)
    } else if let Some(n) = arg.strip_suffix("turn") {
        (n, 360.0)
    } else {
        (arg, 1.0)
    };
    let v: f32 = num
        .trim()
        .parse()
        .map_err(|_| TwinframeError::filter(format!("invalid hue-rotate angle '{arg}'")))?;
    if !v.is_finite() {
        return Err(TwinframeError::filter(format!(
            "hue-rotate angle must be finite, got '{arg}'"
        )));
    }
    Ok(v * to_degrees)
}

/// 4×5 color matrix: rows map (r, g, b, a, 1) to one output channel, all in
/// straight-alpha unit space.
type ColorMatrix = [[f32; 5]; 4];

const IDENTITY: ColorMatrix = [
    [1.0, 0.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 0.0, 1.0, 0.0],
];

impl FilterOp {
    /// The op's color matrix, or None for resampling ops (blur).
    fn color_matrix(self) -> Option<ColorMatrix> {
        match self {
            FilterOp::Blur { .. } => None,
            FilterOp::Brightness { amount } => Some(scale_rgb(amount, 0.0)),
            FilterOp::Contrast { amount } => Some(scale_rgb(amount, 0.5 - 0.5 * amount)),
            FilterOp::Invert { amount } => Some(scale_rgb(1.0 - 2.0 * amount, amount)),
            FilterOp::Opacity { amount } => {
                let mut m = IDENTITY;
                m[3][3] = amount;
                Some(m)
            }
            FilterOp::Grayscale { amount } => Some(luminance_mix(
                1.0 - amount,
                [0.2126, 0.7152, 0.0722],
            )),
            FilterOp::Sepia { amount } => {
                let m = 1.0 - amount;
                Some(rgb_matrix([
                    [0.393 + 0.607 * m, 0.769 - 0.769 * m, 0.189 - 0.189 * m],
                    [0.349 - 0.349 * m, 0.686 + 0.314 * m, 0.168 - 0.168 * m],
                    [0.272 - 0.272 * m, 0.534 - 0.534 * m, 0.131 + 0.869 * m],
                ]))
            }
            FilterOp::Saturate { amount } => Some(luminance_mix(amount, [0.213, 0.715, 0.072])),
            FilterOp::HueRotate { degrees } => {
                let (sin, cos) = degrees.to_radians().sin_cos();
                Some(rgb_matrix([
                    [
                        0.213 + cos * 0.787 - sin * 0.213,
                        0.715 - cos * 0.715 - sin * 0.715,
                        0.072 - cos * 0.072 + sin * 0.928,
                    ],
                    [
                        0.213 - cos * 0.213 + sin * 0.143,
                        0.715 + cos * 0.285 + sin * 0.140,
                        0.072 - cos * 0.072 - sin * 0.283,
                    ],
                    [
                        0.213 - cos * 0.213 - sin * 0.787,
                        0.715 - cos * 0.715 + sin * 0.715,
                        0.072 + cos * 0.928 + sin * 0.072,
                    ],
                ]))
            }
        }
    }
}

fn rgb_matrix(rows: [[f32; 3]; 3]) -> ColorMatrix {
    let mut m = IDENTITY;
    for (i, row) in rows.iter().enumerate() {
        m[i] = [row[0], row[1], row[2], 0.0, 0.0];
    }
    m
}

fn scale_rgb(k: f32, bias: f32) -> ColorMatrix {
    let mut m = IDENTITY;
    for row in &mut m[..3] {
        row.iter_mut().for_each(|v| *v = 0.0);
    }
    m[0][0] = k;
    m[1][1] = k;
    m[2][2] = k;
    m[0][4] = bias;
    m[1][4] = bias;
    m[2][4] = bias;
    m
}

/// Mix between the per-channel identity and the weighted luminance vector;
/// the construction shared by grayscale and saturate.
fn luminance_mix(keep: f32, lum: [f32; 3]) -> ColorMatrix {
    let mut m = IDENTITY;
    for row in 0..3 {
        for col in 0..3 {
            let id = if row == col { 1.0 } else { 0.0 };
            m[row][col] = lum[col] + (id - lum[col]) * keep;
        }
    }
    m
}

/// `second ∘ first`: apply `first`, then `second`.
fn compose(second: ColorMatrix, first: ColorMatrix) -> ColorMatrix {
    let mut out = [[0.0f32; 5]; 4];
    for row in 0..4 {
        for col in 0..5 {
            let mut v = 0.0;
            for k in 0..4 {
                v += second[row][k] * first[k][col];
            }
            if col == 4 {
                v += second[row][4];
            }
            out[row][col] = v;
        }
    }
    out
}

fn apply_matrix(buf: &mut [u8], m: ColorMatrix) {
    for px in buf.chunks_exact_mut(4) {
        let a = f32::from(px[3]) / 255.0;
        // Unpremultiply into straight unit space before the matrix.
        let (r, g, b) = if a > 0.0 {
            (
                f32::from(px[0]) / 255.0 / a,
                f32::from(px[1]) / 255.0 / a,
                f32::from(px[2]) / 255.0 / a,
            )
        } else {
            (0.0, 0.0, 0.0)
        };

        let v = [r, g, b, a, 1.0];
        let mut out = [0.0f32; 4];
        for row in 0..4 {
            let mut acc = 0.0;
            for (col, &x) in v.iter().enumerate() {
                acc += m[row][col] * x;
            }
            out[row] = acc.clamp(0.0, 1.0);
        }

        let oa = out[3];
        px[0] = (out[0] * oa * 255.0).round() as u8;
        px[1] = (out[1] * oa * 255.0).round() as u8;
        px[2] = (out[2] * oa * 255.0).round() as u8;
        px[3] = (oa * 255.0).round() as u8;
    }
}

/// Rasterize a parsed filter chain into `buf` in place.
///
/// Consecutive color ops are folded into one matrix before the per-pixel
/// pass; blur ops flush the fold and run as separable passes. Blur sigma is
/// specified in logical pixels and scaled by `scale_factor` so the visual
/// extent is independent of backing density.
pub(crate) fn bake_in_place(
    buf: &mut [u8],
    width: u32,
    height: u32,
    scale_factor: f64,
    ops: &[FilterOp],
) -> TwinframeResult<()> {
    let expected = rgba8_len(width, height)
        .ok_or_else(|| TwinframeError::filter("filter buffer size overflow"))?;
    if buf.len() != expected {
        return Err(TwinframeError::filter(
            "bake expects buf matching width*height*4",
        ));
    }

    let mut pending: Option<ColorMatrix> = None;
    for &op in ops {
        match op.color_matrix() {
            Some(m) => {
                pending = Some(match pending {
                    Some(p) => compose(m, p),
                    None => m,
                });
            }
            None => {
                if let Some(p) = pending.take() {
                    apply_matrix(buf, p);
                }
                let FilterOp::Blur { sigma } = op else {
                    unreachable!("blur is the only non-matrix op");
                };
                let scaled = sigma * scale_factor as f32;
                let blurred = blur_rgba8_premul(buf, width, height, scaled)?;
                buf.copy_from_slice(&blurred);
            }
        }
    }
    if let Some(p) = pending {
        apply_matrix(buf, p);
    }
    Ok(())
}
