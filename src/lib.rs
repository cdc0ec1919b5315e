//! Twinframe is a dual-surface rendering and transition engine for
//! before/after image comparison widgets.
//!
//! The engine keeps two raster surfaces, "reveal" (the unfiltered
//! original) and "cover" (the filtered result), pixel-synchronized with a
//! resizable container. A source image is fitted into both surfaces with
//! fill-crop (`object-fit: cover`) semantics, a post-process filter chain is
//! baked into the cover surface's pixels, and five pixel-level transition
//! algorithms repaint both surfaces while the host swaps images.
//!
//! # Architecture
//!
//! 1. **Fit-crop**: [`cover_crop`] maps (natural size, container size, pan
//!    offset) to a clamped source rectangle.
//! 2. **Surfaces**: [`Surface`] owns a premultiplied RGBA8 backing buffer
//!    sized to `floor(logical size × backing-scale factor)`.
//! 3. **Filter bake**: a filter descriptor string ([`parse_filter`]) is
//!    rasterized into the cover surface's pixels so transitions always read
//!    the filtered look.
//! 4. **Transitions**: [`TransitionKind`] selects one of five repaint
//!    algorithms (Slide, Blinds, Dissolve, Wipe, Wave), each a complete
//!    frame for one `progress` sample.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Frame-synchronized**: every operation completes before returning;
//!   the engine never schedules its own continuation.
//! - **Premultiplied RGBA8** end-to-end in the backing buffers.
//! - **Degrade, don't throw**: a failed repaint must never crash the
//!   surrounding widget; misuse contracts are documented, not enforced.
#![forbid(unsafe_code)]

mod assets;
mod effects;
mod engine;
mod foundation;
mod layout;
mod raster;

pub use assets::decode::{SourceImage, decode_image};
pub use effects::filter::{FilterOp, parse_filter};
pub use effects::samples::{SAMPLE_STEP, generate_sample_grid};
pub use effects::transitions::{
    STRIP_COUNT, TransitionKind, WAVE_AMPLITUDE, WAVE_FREQUENCY, WAVE_SPEED,
};
pub use engine::CompareEngine;
pub use foundation::core::{Direction, Point, Rect, Size, Vec2, Viewport};
pub use foundation::error::{TwinframeError, TwinframeResult};
pub use layout::cover::{CropWindow, PanOffset, cover_crop};
pub use raster::surface::Surface;
