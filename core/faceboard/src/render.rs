use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

use crate::error::FaceboardError;

/// The render surface: fixed canvas dimensions plus two retained snapshots.
///
/// `base` holds background and faces with no text painted; `display` is the
/// frame a caller would show, base plus the current title and caption. Text
/// refreshes always start from `base`, so repainting can never stack text on
/// top of earlier text.
#[derive(Debug, Clone)]
pub struct RenderState {
    width: u32,
    height: u32,
    base: Option<RgbaImage>,
    display: Option<RgbaImage>,
}

impl RenderState {
    pub(crate) fn new(width: u32, height: u32) -> Self {
        RenderState {
            width,
            height,
            base: None,
            display: None,
        }
    }

    /// Drop both snapshots, returning to the fully transparent cleared state.
    pub(crate) fn clear(&mut self) {
        self.base = None;
        self.display = None;
    }

    /// Install a freshly composited pair of snapshots.
    pub(crate) fn install(&mut self, base: RgbaImage, display: RgbaImage) {
        self.base = Some(base);
        self.display = Some(display);
    }

    /// Replace only the displayed frame, keeping the base snapshot.
    pub(crate) fn set_display(&mut self, display: RgbaImage) {
        self.display = Some(display);
    }

    /// Canvas width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The pre-text snapshot, if anything has been composited.
    pub fn base(&self) -> Option<&RgbaImage> {
        self.base.as_ref()
    }

    /// The displayed frame, if anything has been painted.
    pub fn display(&self) -> Option<&RgbaImage> {
        self.display.as_ref()
    }

    /// True until something is painted, and again after a clear.
    pub fn is_blank(&self) -> bool {
        self.display.is_none()
    }

    /// Encode the displayed frame as PNG. A blank surface exports as fully
    /// transparent pixels at the canvas size.
    pub fn to_png(&self) -> Result<Vec<u8>, FaceboardError> {
        self.encode_snapshot(self.display.as_ref())
    }

    /// Encode the pre-text base snapshot as PNG.
    pub fn base_to_png(&self) -> Result<Vec<u8>, FaceboardError> {
        self.encode_snapshot(self.base.as_ref())
    }

    fn encode_snapshot(&self, snapshot: Option<&RgbaImage>) -> Result<Vec<u8>, FaceboardError> {
        match snapshot {
            Some(image) => encode_png(image),
            None => encode_png(&RgbaImage::new(self.width, self.height)),
        }
    }
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, FaceboardError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| FaceboardError::EncodeError(e.to_string()))?;
    Ok(bytes)
}

/// Source-over blend of one straight-alpha pixel onto another.
pub(crate) fn source_over(dst: &mut Rgba<u8>, src: Rgba<u8>) {
    if src[3] == 0 {
        return;
    }
    if src[3] == 255 {
        *dst = src;
        return;
    }

    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        *dst = Rgba([0, 0, 0, 0]);
        return;
    }

    for c in 0..3 {
        let sc = src[c] as f32;
        let dc = dst[c] as f32;
        dst[c] = ((sc * sa + dc * da * (1.0 - sa)) / out_a).round() as u8;
    }
    dst[3] = (out_a * 255.0).round() as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_source_replaces_the_destination() {
        let mut dst = Rgba([10, 20, 30, 255]);
        source_over(&mut dst, Rgba([200, 100, 50, 255]));
        assert_eq!(dst, Rgba([200, 100, 50, 255]));
    }

    #[test]
    fn transparent_source_changes_nothing() {
        let mut dst = Rgba([10, 20, 30, 255]);
        source_over(&mut dst, Rgba([200, 100, 50, 0]));
        assert_eq!(dst, Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn half_alpha_mixes_toward_the_source() {
        let mut dst = Rgba([0, 0, 0, 255]);
        source_over(&mut dst, Rgba([255, 255, 255, 128]));
        assert_eq!(dst, Rgba([128, 128, 128, 255]));
    }

    #[test]
    fn blending_onto_transparent_keeps_the_source_color() {
        let mut dst = Rgba([0, 0, 0, 0]);
        source_over(&mut dst, Rgba([90, 60, 30, 128]));
        assert_eq!(dst, Rgba([90, 60, 30, 128]));
    }

    #[test]
    fn png_export_round_trips() {
        let mut img = RgbaImage::new(5, 4);
        for (x, y, px) in img.enumerate_pixels_mut() {
            *px = Rgba([(x * 40) as u8, (y * 60) as u8, 200, 255]);
        }
        let bytes = encode_png(&img).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (5, 4));
        assert_eq!(decoded.get_pixel(3, 2), img.get_pixel(3, 2));
    }

    #[test]
    fn blank_state_exports_transparent_pixels() {
        let state = RenderState::new(8, 6);
        assert!(state.is_blank());
        let bytes = state.to_png().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap().to_rgba8();
        assert_eq!(decoded.dimensions(), (8, 6));
        assert!(decoded.pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn clear_drops_installed_snapshots() {
        let mut state = RenderState::new(4, 4);
        let frame = RgbaImage::from_pixel(4, 4, Rgba([1, 2, 3, 255]));
        state.install(frame.clone(), frame);
        assert!(!state.is_blank());
        assert!(state.base().is_some());

        state.clear();
        assert!(state.is_blank());
        assert!(state.base().is_none());
        assert!(state.display().is_none());
    }
}
