use crate::assets::decode::SourceImage;
use crate::engine::CompareEngine;
use crate::foundation::core::Direction;
use crate::foundation::error::{TwinframeError, TwinframeResult};
use crate::raster::draw::{blit_cover, blit_cover_circle, blit_cover_rect};

/// Number of vertical strips in the blinds effect.
pub const STRIP_COUNT: u32 = 10;
/// Horizontal excursion of the wave edge, in backing pixels.
pub const WAVE_AMPLITUDE: f64 = 20.0;
/// Vertical wavelength divisor of the wave edge.
pub const WAVE_FREQUENCY: f64 = 30.0;
/// How fast the wave phase advances with progress.
pub const WAVE_SPEED: f64 = 15.0;

/// The five repaint algorithms for swapping between two images.
///
/// Each run is a complete, idempotent repaint of both surfaces for one
/// `progress` sample, followed by a bake-in-place of the active filter on
/// the cover surface. The engine holds no transition state between calls;
/// pacing, direction, and completion all belong to the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Slide,
    Blinds,
    Dissolve,
    Wipe,
    Wave,
}

impl TransitionKind {
    /// Resolve an effect name (as hosts store it in config) to a kind.
    pub fn parse(name: &str) -> TwinframeResult<Self> {
        let name = name.trim().to_ascii_lowercase();
        if name.is_empty() {
            return Err(TwinframeError::validation(
                "transition kind must be non-empty",
            ));
        }
        match name.as_str() {
            "slide" => Ok(TransitionKind::Slide),
            "blinds" => Ok(TransitionKind::Blinds),
            "dissolve" => Ok(TransitionKind::Dissolve),
            "wipe" => Ok(TransitionKind::Wipe),
            "wave" => Ok(TransitionKind::Wave),
            other => Err(TwinframeError::validation(format!(
                "unknown transition kind '{other}'"
            ))),
        }
    }

    pub(crate) fn run(
        self,
        engine: &mut CompareEngine,
        from: &SourceImage,
        to: &SourceImage,
        progress: f64,
        direction: Direction,
    ) -> TwinframeResult<()> {
        // Out-of-range progress still yields a well-defined frame.
        let progress = if progress.is_finite() {
            progress.clamp(0.0, 1.0)
        } else {
            0.0
        };
        match self {
            TransitionKind::Slide => slide(engine, from, to, progress, direction),
            TransitionKind::Blinds => blinds(engine, from, to, progress, direction),
            TransitionKind::Dissolve => dissolve(engine, from, to, progress),
            TransitionKind::Wipe => wipe(engine, from, to, progress),
            TransitionKind::Wave => wave(engine, from, to, progress, direction),
        }?;
        engine.bake_cover_in_place()
    }
}

fn slide(
    engine: &mut CompareEngine,
    from: &SourceImage,
    to: &SourceImage,
    progress: f64,
    direction: Direction,
) -> TwinframeResult<()> {
    let (w, h) = engine.backing_size();
    let wf = f64::from(w);
    let d = direction.signum();
    let from_offset = -progress * wf * d;
    let to_offset = (wf - progress * wf) * d;
    let crop_from = engine.crop_for(from);
    let crop_to = engine.crop_for(to);

    let (reveal, cover) = engine.surfaces_mut();
    for surface in [reveal, cover] {
        surface.clear();
        blit_cover(surface.data_mut(), w, h, from, crop_from, from_offset)?;
        blit_cover(surface.data_mut(), w, h, to, crop_to, to_offset)?;
    }
    Ok(())
}

/// Column span `[x0, x1)` revealed for strip `i` at the given progress.
///
/// For `Next` the reveal grows from each strip's left edge; for `Previous`
/// it grows from the right edge. Spans are floored so adjacent strips tile
/// the width exactly at progress 1 with no seams.
fn blind_span(
    i: u32,
    strip_width: f64,
    progress: f64,
    direction: Direction,
    width: u32,
) -> (u32, u32) {
    let x = match direction {
        Direction::Next => f64::from(i) * strip_width,
        Direction::Previous => f64::from(STRIP_COUNT - 1 - i) * strip_width,
    };
    let revealed = strip_width * progress;
    let blind_x = match direction {
        Direction::Next => x,
        Direction::Previous => x + (strip_width - revealed),
    };
    let x0 = blind_x.floor().max(0.0) as u32;
    let x1 = ((blind_x + revealed).floor().max(0.0) as u32).min(width);
    (x0.min(width), x1)
}

fn blinds(
    engine: &mut CompareEngine,
    from: &SourceImage,
    to: &SourceImage,
    progress: f64,
    direction: Direction,
) -> TwinframeResult<()> {
    let (w, h) = engine.backing_size();
    let strip_width = f64::from(w) / f64::from(STRIP_COUNT);
    let crop_from = engine.crop_for(from);
    let crop_to = engine.crop_for(to);

    let (reveal, cover) = engine.surfaces_mut();
    for surface in [reveal, cover] {
        blit_cover(surface.data_mut(), w, h, from, crop_from, 0.0)?;
        for i in 0..STRIP_COUNT {
            let (x0, x1) = blind_span(i, strip_width, progress, direction, w);
            if x0 < x1 {
                blit_cover_rect(surface.data_mut(), w, h, to, crop_to, x0, x1)?;
            }
        }
    }
    Ok(())
}

fn dissolve(
    engine: &mut CompareEngine,
    from: &SourceImage,
    to: &SourceImage,
    progress: f64,
) -> TwinframeResult<()> {
    engine.ensure_samples();
    let (w, _h) = engine.backing_size();
    let from_data = engine.image_data(from);
    let to_data = engine.image_data(to);

    let samples = engine.sample_grid();
    let revealed = ((samples.len() as f64) * progress).floor() as usize;

    let mut composed = vec![0u8; from_data.len()];
    for (i, &(x, y)) in samples.iter().enumerate() {
        let idx = ((y * w + x) as usize) * 4;
        let src = if i < revealed { &to_data } else { &from_data };
        composed[idx..idx + 4].copy_from_slice(&src[idx..idx + 4]);
    }

    let (reveal, cover) = engine.surfaces_mut();
    reveal.commit(&composed)?;
    cover.commit(&composed)?;
    Ok(())
}

fn wipe(
    engine: &mut CompareEngine,
    from: &SourceImage,
    to: &SourceImage,
    progress: f64,
) -> TwinframeResult<()> {
    let (w, h) = engine.backing_size();
    let cx = f64::from(w) / 2.0;
    let cy = f64::from(h) / 2.0;
    let max_radius = (cx * cx + cy * cy).sqrt();
    let radius = max_radius * progress;
    let crop_from = engine.crop_for(from);
    let crop_to = engine.crop_for(to);

    let (reveal, cover) = engine.surfaces_mut();
    for surface in [reveal, cover] {
        blit_cover(surface.data_mut(), w, h, from, crop_from, 0.0)?;
        blit_cover_circle(surface.data_mut(), w, h, to, crop_to, cx, cy, radius)?;
    }
    Ok(())
}

/// Row split point for the wave effect: the sine-displaced transition edge,
/// clamped to the row.
fn wave_threshold(y: u32, progress: f64, width: u32, direction: Direction) -> usize {
    let wf = f64::from(width);
    let phase = f64::from(y) / WAVE_FREQUENCY + progress * WAVE_SPEED;
    let wave_offset = phase.sin() * WAVE_AMPLITUDE;
    let mut transition_point = progress * (wf + WAVE_AMPLITUDE * 2.0) - WAVE_AMPLITUDE;
    if direction == Direction::Next {
        transition_point = wf - transition_point;
    }
    (transition_point + wave_offset).round().clamp(0.0, wf) as usize
}

fn wave(
    engine: &mut CompareEngine,
    from: &SourceImage,
    to: &SourceImage,
    progress: f64,
    direction: Direction,
) -> TwinframeResult<()> {
    let (w, h) = engine.backing_size();
    let from_data = engine.image_data(from);
    let to_data = engine.image_data(to);

    // Head of each row comes from one image, tail from the other; the
    // split assignment is inverted for Next so progress 0 always shows
    // `from` alone and progress 1 shows `to` alone.
    let (head, tail) = match direction {
        Direction::Previous => (&to_data, &from_data),
        Direction::Next => (&from_data, &to_data),
    };

    let mut composed = vec![0u8; from_data.len()];
    let row_px = w as usize;
    for y in 0..h {
        let threshold = wave_threshold(y, progress, w, direction);
        let row = (y as usize * row_px) * 4;
        let split = row + threshold * 4;
        let end = row + row_px * 4;
        composed[row..split].copy_from_slice(&head[row..split]);
        composed[split..end].copy_from_slice(&tail[split..end]);
    }

    let (reveal, cover) = engine.surfaces_mut();
    reveal.commit(&composed)?;
    cover.commit(&composed)?;
    Ok(())
}
