//! Optional SeetaFace detection backend, enabled by the `rustface` feature.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use crate::error::FaceboardError;
use crate::face_detector::{FaceBox, FaceDetector};

/// Face detector backed by the `rustface` crate (SeetaFace engine).
///
/// The detection model is read from a local file before any detection is
/// possible; no model ships with the crate.
pub struct RustfaceDetector {
    model: rustface::Model,
}

impl RustfaceDetector {
    /// Load a SeetaFace model file, e.g. `seeta_fd_frontal_v1.0.bin`.
    pub fn from_model_path(path: impl AsRef<Path>) -> Result<Self, FaceboardError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| FaceboardError::AssetUnavailable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        let model =
            rustface::read_model(Cursor::new(bytes)).map_err(|e| FaceboardError::AssetUnavailable {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;
        Ok(Self { model })
    }
}

impl FaceDetector for RustfaceDetector {
    fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBox> {
        let mut detector = rustface::create_detector_with_model(self.model.clone());
        detector.set_min_face_size(20);
        detector.set_score_thresh(2.0);
        detector.set_pyramid_scale_factor(0.8);
        detector.set_slide_window_step(4, 4);

        let faces = detector.detect(&rustface::ImageData::new(gray, width, height));

        faces
            .iter()
            .map(|face| {
                let bbox = face.bbox();
                FaceBox {
                    x: bbox.x() as f64,
                    y: bbox.y() as f64,
                    width: bbox.width() as f64,
                    height: bbox.height() as f64,
                    confidence: face.score(),
                }
            })
            .collect()
    }
}
