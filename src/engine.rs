use crate::assets::decode::SourceImage;
use crate::effects::filter::{self, FilterOp, parse_filter};
use crate::effects::samples::generate_sample_grid;
use crate::effects::transitions::TransitionKind;
use crate::foundation::core::{Direction, Size, Viewport};
use crate::foundation::error::{TwinframeError, TwinframeResult};
use crate::foundation::math::rgba8_len;
use crate::layout::cover::{CropWindow, PanOffset, cover_crop};
use crate::raster::draw::blit_cover;
use crate::raster::surface::Surface;

/// The dual-surface rendering and transition engine.
///
/// Owns the reveal surface (unfiltered original), the cover surface
/// (filtered result), the active source image, the pan offset, the cached
/// dissolve sample set, and the current filter. Both surfaces are mutated in
/// place and stay pixel-synchronized: identical backing dimensions, repaints
/// always land on both.
///
/// All repaint operations degrade silently: a zero-sized container, a
/// re-entrant filter bake, or an internal raster failure logs and leaves the
/// previous frame intact rather than surfacing an error into the widget's
/// event loop. The one precondition the engine does *not* defend against is
/// an image that is not decode-complete; that contract belongs to the owner.
pub struct CompareEngine {
    reveal: Surface,
    cover: Surface,
    image: SourceImage,
    pan: PanOffset,
    filter_spec: String,
    filter_ops: Vec<FilterOp>,
    samples: Option<Vec<(u32, u32)>>,
    bake_in_flight: bool,
}

impl CompareEngine {
    /// Bind the engine to its two raster targets and the initial image.
    ///
    /// The surfaces must already share backing dimensions; the engine keeps
    /// them twinned from here on. Performs the initial full repaint.
    pub fn new(
        reveal: Surface,
        cover: Surface,
        image: SourceImage,
    ) -> TwinframeResult<CompareEngine> {
        if reveal.width() != cover.width() || reveal.height() != cover.height() {
            return Err(TwinframeError::validation(
                "reveal and cover surfaces must share backing dimensions",
            ));
        }
        let mut engine = CompareEngine {
            reveal,
            cover,
            image,
            pan: PanOffset::default(),
            filter_spec: "none".to_string(),
            filter_ops: Vec::new(),
            samples: None,
            bake_in_flight: false,
        };
        engine.redraw();
        Ok(engine)
    }

    /// Swap the active source image: pan resets to `(0, 0)` and both
    /// surfaces repaint.
    pub fn update_image(&mut self, image: SourceImage) {
        self.image = image;
        self.pan = PanOffset::default();
        self.redraw();
    }

    /// Move the crop window by a pan offset in natural-image pixels and
    /// repaint. Values of any magnitude are legal; the crop clamps them.
    pub fn set_pan_offset(&mut self, x: f64, y: f64) {
        self.pan = PanOffset::new(x, y);
        self.redraw();
    }

    /// Adopt a new backing-scale factor (display change) and repaint.
    pub fn set_scale_factor(&mut self, scale_factor: f64) {
        match Viewport::new(self.reveal.logical_size(), scale_factor) {
            Ok(viewport) => self.repaint_at(viewport),
            Err(err) => tracing::warn!(error = %err, "ignoring bad scale factor"),
        }
    }

    /// Full repaint at the current logical size.
    pub fn redraw(&mut self) {
        let viewport = Viewport {
            logical: self.reveal.logical_size(),
            scale_factor: self.reveal.scale_factor(),
        };
        self.repaint_at(viewport);
    }

    /// Full repaint at an explicit logical size, for callers that know the
    /// new layout before the host's own layout settles.
    #[tracing::instrument(skip(self))]
    pub fn redraw_sized(&mut self, width: f64, height: f64) {
        match Viewport::new(Size::new(width, height), self.reveal.scale_factor()) {
            Ok(viewport) => self.repaint_at(viewport),
            Err(err) => tracing::warn!(error = %err, "ignoring bad redraw size"),
        }
    }

    fn repaint_at(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            // Resize-observer churn mid-layout; keep the previous frame.
            tracing::debug!("zero logical size; redraw skipped");
            return;
        }
        self.reveal.resize(viewport);
        self.cover.resize(viewport);

        let (w, h) = self.backing_size();
        let crop = self.crop_for_image(&self.image);
        self.reveal.clear();
        if let Err(err) = blit_cover(self.reveal.data_mut(), w, h, &self.image, crop, 0.0) {
            tracing::error!(error = %err, "reveal repaint failed");
        }

        self.samples = None;
        self.refresh_cover();
    }

    /// Apply a filter descriptor to the cover surface.
    ///
    /// `"none"` takes the cheap path: the reveal pixels are copied across
    /// unfiltered. Any other descriptor is baked into pixels through a
    /// scratch buffer. A descriptor that fails to parse is logged and the
    /// current filter kept. A call arriving while a bake is in flight is
    /// dropped silently: last writer wins, nothing is queued.
    #[tracing::instrument(skip(self))]
    pub fn apply_filter(&mut self, spec: &str) {
        let ops = match parse_filter(spec) {
            Ok(ops) => ops,
            Err(err) => {
                tracing::warn!(error = %err, "invalid filter spec; keeping current filter");
                return;
            }
        };

        if ops.is_empty() {
            if let Err(err) = self.cover.copy_from(&self.reveal) {
                tracing::error!(error = %err, "cover copy failed");
                return;
            }
            self.filter_spec = "none".to_string();
            self.filter_ops = ops;
            return;
        }

        if self.bake_in_flight {
            tracing::debug!("filter bake already in flight; request dropped");
            return;
        }
        self.bake_in_flight = true;
        let result = self.bake_onto_cover(&ops);
        self.bake_in_flight = false;

        match result {
            Ok(()) => {
                self.filter_spec = spec.trim().to_string();
                self.filter_ops = ops;
            }
            Err(err) => tracing::error!(error = %err, "filter bake failed"),
        }
    }

    /// Re-rasterize the current filter onto the cover surface from the
    /// reveal pixels. Runs after every full repaint.
    fn refresh_cover(&mut self) {
        if self.filter_ops.is_empty() {
            if let Err(err) = self.cover.copy_from(&self.reveal) {
                tracing::error!(error = %err, "cover copy failed");
            }
            return;
        }
        if self.bake_in_flight {
            tracing::debug!("filter bake already in flight; refresh dropped");
            return;
        }
        self.bake_in_flight = true;
        let ops = self.filter_ops.clone();
        let result = self.bake_onto_cover(&ops);
        self.bake_in_flight = false;
        if let Err(err) = result {
            tracing::error!(error = %err, "filter refresh failed");
        }
    }

    /// The bake procedure: scratch buffer sized like the reveal surface,
    /// reveal pixels in, filter rasterized, result committed to the cover.
    fn bake_onto_cover(&mut self, ops: &[FilterOp]) -> TwinframeResult<()> {
        let (w, h) = self.backing_size();
        let mut scratch = self.reveal.data().to_vec();
        filter::bake_in_place(&mut scratch, w, h, self.reveal.scale_factor(), ops)?;
        self.cover.clear();
        self.cover.commit(&scratch)
    }

    /// Apply the current filter directly onto the cover surface's pixels.
    /// Transitions call this after compositing so the filtered look holds
    /// through every intermediate frame, not only at rest.
    pub(crate) fn bake_cover_in_place(&mut self) -> TwinframeResult<()> {
        if self.filter_ops.is_empty() {
            return Ok(());
        }
        let (w, h) = self.backing_size();
        let scale = self.reveal.scale_factor();
        let ops = self.filter_ops.clone();
        filter::bake_in_place(self.cover.data_mut(), w, h, scale, &ops)
    }

    /// One complete repaint of a transition frame: composite `from` and
    /// `to` at `progress` into both surfaces with the chosen algorithm,
    /// then re-bake the active filter on the cover composite.
    pub fn render_transition(
        &mut self,
        kind: TransitionKind,
        from: &SourceImage,
        to: &SourceImage,
        progress: f64,
        direction: Direction,
    ) {
        if let Err(err) = kind.run(self, from, to, progress, direction) {
            tracing::error!(error = %err, ?kind, "transition repaint failed");
        }
    }

    pub fn render_slide_transition(
        &mut self,
        from: &SourceImage,
        to: &SourceImage,
        progress: f64,
        direction: Direction,
    ) {
        self.render_transition(TransitionKind::Slide, from, to, progress, direction);
    }

    pub fn render_blinds_transition(
        &mut self,
        from: &SourceImage,
        to: &SourceImage,
        progress: f64,
        direction: Direction,
    ) {
        self.render_transition(TransitionKind::Blinds, from, to, progress, direction);
    }

    pub fn render_dissolve_transition(
        &mut self,
        from: &SourceImage,
        to: &SourceImage,
        progress: f64,
    ) {
        self.render_transition(TransitionKind::Dissolve, from, to, progress, Direction::Next);
    }

    pub fn render_wipe_transition(&mut self, from: &SourceImage, to: &SourceImage, progress: f64) {
        self.render_transition(TransitionKind::Wipe, from, to, progress, Direction::Next);
    }

    pub fn render_wave_transition(
        &mut self,
        from: &SourceImage,
        to: &SourceImage,
        progress: f64,
        direction: Direction,
    ) {
        self.render_transition(TransitionKind::Wave, from, to, progress, direction);
    }

    /// Build (or rebuild) the dissolve sample set for the current backing
    /// size and cache it until the next full repaint invalidates it.
    pub fn generate_samples(&mut self) -> &[(u32, u32)] {
        let (w, h) = self.backing_size();
        self.samples = Some(generate_sample_grid(w, h));
        self.sample_grid()
    }

    pub(crate) fn ensure_samples(&mut self) {
        if self.samples.is_none() {
            self.generate_samples();
        }
    }

    pub(crate) fn sample_grid(&self) -> &[(u32, u32)] {
        self.samples.as_deref().unwrap_or(&[])
    }

    /// Rasterize `image` at the current backing size with cover-fit
    /// semantics, as transitions and collaborators consume it. Pixels the
    /// image does not land on stay transparent black.
    pub fn image_data(&self, image: &SourceImage) -> Vec<u8> {
        let (w, h) = self.backing_size();
        let mut buf = vec![0u8; rgba8_len(w, h).unwrap_or(0)];
        let crop = self.crop_for_image(image);
        if let Err(err) = blit_cover(&mut buf, w, h, image, crop, 0.0) {
            tracing::error!(error = %err, "image rasterization failed");
        }
        buf
    }

    /// The crop window currently selected for the active image.
    pub fn crop_window(&self) -> CropWindow {
        self.crop_for_image(&self.image)
    }

    pub(crate) fn crop_for(&self, image: &SourceImage) -> CropWindow {
        self.crop_for_image(image)
    }

    fn crop_for_image(&self, image: &SourceImage) -> CropWindow {
        cover_crop(
            f64::from(image.natural_width()),
            f64::from(image.natural_height()),
            self.reveal.logical_size(),
            self.pan,
        )
    }

    pub(crate) fn backing_size(&self) -> (u32, u32) {
        (self.reveal.width(), self.reveal.height())
    }

    pub(crate) fn surfaces_mut(&mut self) -> (&mut Surface, &mut Surface) {
        (&mut self.reveal, &mut self.cover)
    }

    /// The unfiltered surface. Read path for magnifier-style collaborators.
    pub fn reveal(&self) -> &Surface {
        &self.reveal
    }

    /// The filtered surface. Read path for magnifier-style collaborators.
    pub fn cover(&self) -> &Surface {
        &self.cover
    }

    /// The active source image.
    pub fn image(&self) -> &SourceImage {
        &self.image
    }

    /// The filter descriptor currently baked into the cover surface.
    pub fn current_filter(&self) -> &str {
        &self.filter_spec
    }

    pub fn pan_offset(&self) -> PanOffset {
        self.pan
    }
}
