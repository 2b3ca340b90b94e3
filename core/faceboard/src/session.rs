//! Session state: the active template, the render surface, and the upload flow.

use image::RgbaImage;

use crate::assets::AssetStore;
use crate::compose::compose_board;
use crate::error::FaceboardError;
use crate::face_detector::{FaceBox, FaceDetector};
use crate::render::RenderState;
use crate::template::{Template, TemplateCatalog};
use crate::text::{
    draw_text_centered, Typeface, CAPTION_RISE, REFRESH_CAPTION, REFRESH_TITLE, TITLE_BASELINE,
};

/// A decoded photo waiting for detection results.
///
/// Produced by [`Session::begin_upload`]. Hand the grayscale pixels to a
/// detector, then pass the job back to [`Session::finish_upload`] together
/// with the detections. A job outlives neither a template switch nor a
/// selection clear: committing it afterwards fails with `StaleComposite`.
#[derive(Debug, Clone)]
pub struct UploadJob {
    photo: RgbaImage,
    gray: Vec<u8>,
    width: u32,
    height: u32,
    generation: u64,
}

impl UploadJob {
    /// Grayscale detector input, row-major, one byte per pixel.
    pub fn gray(&self) -> &[u8] {
        &self.gray
    }

    /// Photo width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Photo height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }
}

/// What a completed composite consumed and produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompositeReport {
    /// Detections handed in, before any truncation.
    pub faces_detected: usize,

    /// Faces actually painted into slots.
    pub faces_painted: usize,

    /// Slots left showing only the background.
    pub slots_unfilled: usize,
}

/// A single user's board-building state.
///
/// Owns the catalog, the asset store, the selection, and the render surface.
/// All mutation goes through `&mut self`, so operations are strictly ordered.
/// Construct through [`crate::SessionBuilder`].
pub struct Session {
    catalog: TemplateCatalog,
    assets: Box<dyn AssetStore>,
    detector: Option<Box<dyn FaceDetector>>,
    typeface: Typeface,
    width: u32,
    height: u32,
    selected: Option<String>,
    render: RenderState,
    previews: Vec<RgbaImage>,
    generation: u64,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("selected", &self.selected)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Session {
    pub(crate) fn new(
        catalog: TemplateCatalog,
        assets: Box<dyn AssetStore>,
        detector: Option<Box<dyn FaceDetector>>,
        typeface: Typeface,
        width: u32,
        height: u32,
    ) -> Self {
        Session {
            catalog,
            assets,
            detector,
            typeface,
            width,
            height,
            selected: None,
            render: RenderState::new(width, height),
            previews: Vec::new(),
            generation: 0,
        }
    }

    /// Make `id` the active template. The render surface, the preview list,
    /// and any in-flight upload are reset, whether or not the template
    /// actually changed.
    pub fn select_template(&mut self, id: &str) -> Result<(), FaceboardError> {
        if self.catalog.get(id).is_none() {
            return Err(FaceboardError::UnknownTemplate(id.to_string()));
        }
        self.selected = Some(id.to_string());
        self.reset_render();
        log::info!("selected template {id}");
        Ok(())
    }

    /// Return to the no-template state, with the same resets as
    /// [`Session::select_template`].
    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.reset_render();
    }

    fn reset_render(&mut self) {
        self.render.clear();
        self.previews.clear();
        // orphan any upload still waiting on detection results
        self.generation = self.generation.wrapping_add(1);
    }

    /// Decode a photo and prepare detector input.
    ///
    /// Fails with `NoTemplateSelected` before touching the bytes when no
    /// template is active.
    pub fn begin_upload(&self, photo_bytes: &[u8]) -> Result<UploadJob, FaceboardError> {
        if self.selected.is_none() {
            return Err(FaceboardError::NoTemplateSelected);
        }

        let decoded = image::load_from_memory(photo_bytes)
            .map_err(|e| FaceboardError::PhotoDecode(e.to_string()))?;
        let photo = decoded.to_rgba8();
        let (width, height) = photo.dimensions();
        if width == 0 || height == 0 {
            return Err(FaceboardError::ZeroDimensions);
        }

        let gray = image::imageops::grayscale(&photo).into_raw();
        log::debug!("decoded {width}x{height} photo for upload");

        Ok(UploadJob {
            photo,
            gray,
            width,
            height,
            generation: self.generation,
        })
    }

    /// Commit an upload: composite the detections onto the active template
    /// and install the result.
    ///
    /// A job begun before the selection last changed is rejected with
    /// `StaleComposite`. Asset failures leave the previous render state
    /// untouched.
    pub fn finish_upload(
        &mut self,
        job: UploadJob,
        detections: &[FaceBox],
        title: &str,
        caption: &str,
    ) -> Result<CompositeReport, FaceboardError> {
        if job.generation != self.generation {
            log::info!("discarding a stale upload, the selection changed during detection");
            return Err(FaceboardError::StaleComposite);
        }

        let template = self
            .selected
            .as_deref()
            .and_then(|id| self.catalog.get(id))
            .cloned()
            .ok_or(FaceboardError::NoTemplateSelected)?;

        let background = self.assets.resolve(&template.background)?;
        if let Some(overlay) = &template.overlay {
            // Resolved but never painted.
            self.assets.resolve(overlay)?;
        }

        let out = compose_board(
            &template,
            &background,
            &job.photo,
            detections,
            title,
            caption,
            &self.typeface,
            self.width,
            self.height,
        );

        let report = CompositeReport {
            faces_detected: detections.len(),
            faces_painted: out.faces_painted,
            slots_unfilled: template.slots.len() - out.faces_painted,
        };

        self.previews = out.previews;
        self.render.install(out.base, out.display);
        log::info!(
            "composited template {}: {} detected, {} painted, {} slots unfilled",
            template.id,
            report.faces_detected,
            report.faces_painted,
            report.slots_unfilled
        );

        Ok(report)
    }

    /// The whole upload flow in one call, detecting with the session's own
    /// detector. Without a configured detector the composite proceeds with
    /// zero detections.
    pub fn upload_photo(
        &mut self,
        photo_bytes: &[u8],
        title: &str,
        caption: &str,
    ) -> Result<CompositeReport, FaceboardError> {
        let job = self.begin_upload(photo_bytes)?;
        let detections = match &self.detector {
            Some(detector) => detector.detect(job.gray(), job.width(), job.height()),
            None => Vec::new(),
        };
        self.finish_upload(job, &detections, title, caption)
    }

    /// Repaint title and caption over the retained pre-text snapshot.
    ///
    /// Faces and background are not recomputed, and because painting always
    /// starts from the snapshot, repeated refreshes never stack text. On a
    /// blank surface the text lands on a transparent canvas.
    pub fn refresh_text(&mut self, title: &str, caption: &str) {
        let mut display = match self.render.base() {
            Some(base) => base.clone(),
            None => RgbaImage::new(self.width, self.height),
        };

        let center_x = self.width as f32 / 2.0;
        draw_text_centered(
            &mut display,
            &self.typeface,
            title,
            center_x,
            TITLE_BASELINE,
            &REFRESH_TITLE,
        );
        draw_text_centered(
            &mut display,
            &self.typeface,
            caption,
            center_x,
            self.height as f32 - CAPTION_RISE,
            &REFRESH_CAPTION,
        );

        self.render.set_display(display);
    }

    /// The active template, if one is selected.
    pub fn selected_template(&self) -> Option<&Template> {
        self.selected.as_deref().and_then(|id| self.catalog.get(id))
    }

    /// The active template id, if one is selected.
    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The render surface.
    pub fn render(&self) -> &RenderState {
        &self.render
    }

    /// Unmasked preview tiles from the last composite, in slot order.
    pub fn previews(&self) -> &[RgbaImage] {
        &self.previews
    }

    /// The loaded template catalog.
    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    /// Swap the typeface used for titles and captions.
    pub fn set_typeface(&mut self, typeface: Typeface) {
        self.typeface = typeface;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MemoryAssets;
    use crate::render::encode_png;
    use crate::SessionBuilder;
    use image::Rgba;

    const CATALOG: &str = r#"[
        { "id": "solo", "label": "Solo", "background": "solo_bg.png",
          "slots": [{ "x": 40, "y": 60, "width": 100, "height": 100 }] }
    ]"#;

    fn png(width: u32, height: u32, color: Rgba<u8>) -> Vec<u8> {
        encode_png(&RgbaImage::from_pixel(width, height, color)).unwrap()
    }

    fn session() -> Session {
        let assets = MemoryAssets::new();
        assets.insert("solo_bg.png", png(32, 24, Rgba([5, 5, 80, 255])));
        let catalog = TemplateCatalog::from_json(CATALOG).unwrap();
        SessionBuilder::new(catalog, Box::new(assets))
            .canvas_size(320, 240)
            .build()
            .unwrap()
    }

    #[test]
    fn selection_must_exist_in_the_catalog() {
        let mut s = session();
        let err = s.select_template("nope").unwrap_err();
        assert!(matches!(err, FaceboardError::UnknownTemplate(id) if id == "nope"));
        assert!(s.selected_id().is_none());
    }

    #[test]
    fn upload_requires_a_selection() {
        let mut s = session();
        let photo = png(50, 50, Rgba([200, 150, 120, 255]));
        let err = s.upload_photo(&photo, "T", "C").unwrap_err();
        assert!(matches!(err, FaceboardError::NoTemplateSelected));
        assert!(s.render().is_blank());
    }

    #[test]
    fn undecodable_photos_are_rejected() {
        let mut s = session();
        s.select_template("solo").unwrap();
        let err = s.upload_photo(b"junk", "T", "C").unwrap_err();
        assert!(matches!(err, FaceboardError::PhotoDecode(_)));
        assert!(s.render().is_blank());
    }

    #[test]
    fn upload_reports_unfilled_slots() {
        let mut s = session();
        s.select_template("solo").unwrap();
        let photo = png(50, 50, Rgba([200, 150, 120, 255]));
        // no detector configured: composite proceeds with zero detections
        let report = s.upload_photo(&photo, "", "").unwrap();
        assert_eq!(
            report,
            CompositeReport {
                faces_detected: 0,
                faces_painted: 0,
                slots_unfilled: 1
            }
        );
        assert!(s.previews().is_empty());
        assert!(!s.render().is_blank());
    }

    #[test]
    fn refresh_on_a_blank_session_paints_text_only() {
        let mut s = session();
        s.refresh_text("HELLO", "");
        let display = s.render().display().unwrap();
        let white = display
            .pixels()
            .filter(|p| **p == Rgba([255, 255, 255, 255]))
            .count();
        assert!(white > 0);
        assert!(s.render().base().is_none());
    }

    #[test]
    fn clearing_the_selection_resets_everything() {
        let mut s = session();
        s.select_template("solo").unwrap();
        let photo = png(50, 50, Rgba([200, 150, 120, 255]));
        s.upload_photo(&photo, "T", "C").unwrap();
        assert!(!s.render().is_blank());

        s.clear_selection();
        assert!(s.selected_id().is_none());
        assert!(s.render().is_blank());
        assert!(s.previews().is_empty());
    }
}
