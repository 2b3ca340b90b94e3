//! Template-driven photo boards: pick a template, hand over a group photo,
//! and composite the detected faces into oval slots with a title and caption.
//!
//! # Example
//!
//! ```no_run
//! use faceboard::{FsAssets, SessionBuilder, TemplateCatalog};
//!
//! let catalog = TemplateCatalog::from_json_file("templates.json").unwrap();
//! let mut session = SessionBuilder::new(catalog, Box::new(FsAssets::new("assets")))
//!     .build()
//!     .unwrap();
//!
//! session.select_template("space-crew").unwrap();
//! let photo = std::fs::read("group.jpg").unwrap();
//! let report = session.upload_photo(&photo, "OUR CREW", "SUMMER 2026").unwrap();
//! println!("painted {} faces", report.faces_painted);
//! std::fs::write("board.png", session.render().to_png().unwrap()).unwrap();
//! ```
#![warn(missing_docs)]

mod assets;
mod compose;
mod error;
/// Face detection traits and data types.
pub mod face_detector;
mod geometry;
mod render;
#[cfg(feature = "rustface")]
/// SeetaFace-based face detector backend.
pub mod rustface_backend;
mod session;
mod template;
mod text;

/// Asset resolution trait and the bundled stores.
pub use assets::{AssetStore, FsAssets, MemoryAssets};
/// Error type returned by faceboard operations.
pub use error::FaceboardError;
/// Face detection trait and face bounding-box type.
pub use face_detector::{FaceBox, FaceDetector};
/// PNG encoding helper and the retained render surface.
pub use render::{encode_png, RenderState};
#[cfg(feature = "rustface")]
/// Detector that loads a SeetaFace model from a local path.
pub use rustface_backend::RustfaceDetector;
/// Session controller and its upload flow types.
pub use session::{CompositeReport, Session, UploadJob};
/// Template catalog types.
pub use template::{Slot, Template, TemplateCatalog};
/// Title and caption typeface.
pub use text::Typeface;

/// Most faces a single composite will place, regardless of slot count.
pub const MAX_FACES: usize = 4;

/// Default canvas width in pixels.
pub const DEFAULT_CANVAS_WIDTH: u32 = 800;

/// Default canvas height in pixels.
pub const DEFAULT_CANVAS_HEIGHT: u32 = 600;

/// Builder for a [`Session`].
///
/// Takes the two required collaborators up front, the rest are optional:
/// canvas size (default 800x600), a face detector for the one-call upload
/// flow, and an outline typeface.
pub struct SessionBuilder {
    catalog: TemplateCatalog,
    assets: Box<dyn AssetStore>,
    detector: Option<Box<dyn FaceDetector>>,
    typeface: Typeface,
    width: u32,
    height: u32,
}

impl SessionBuilder {
    /// Start a builder from a loaded catalog and an asset store.
    pub fn new(catalog: TemplateCatalog, assets: Box<dyn AssetStore>) -> Self {
        Self {
            catalog,
            assets,
            detector: None,
            typeface: Typeface::default(),
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
        }
    }

    /// Set the canvas size in pixels (default: 800x600).
    pub fn canvas_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Provide a face detector for [`Session::upload_photo`].
    ///
    /// Without one, `upload_photo` composites with zero detections; the
    /// split `begin_upload`/`finish_upload` flow takes detections from the
    /// caller and never consults this.
    ///
    /// ```no_run
    /// use faceboard::{FaceBox, FaceDetector, FsAssets, SessionBuilder, TemplateCatalog};
    ///
    /// struct MyDetector;
    /// impl FaceDetector for MyDetector {
    ///     fn detect(&self, gray: &[u8], width: u32, height: u32) -> Vec<FaceBox> {
    ///         // Your detection logic here
    ///         vec![]
    ///     }
    /// }
    ///
    /// let catalog = TemplateCatalog::from_json("[]").unwrap();
    /// let session = SessionBuilder::new(catalog, Box::new(FsAssets::new("assets")))
    ///     .face_detector(Box::new(MyDetector))
    ///     .build()
    ///     .unwrap();
    /// ```
    pub fn face_detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    /// Use an outline font for titles and captions instead of the built-in
    /// bitmap face.
    pub fn typeface(mut self, typeface: Typeface) -> Self {
        self.typeface = typeface;
        self
    }

    /// Build the session.
    pub fn build(self) -> Result<Session, FaceboardError> {
        if self.width == 0 || self.height == 0 {
            return Err(FaceboardError::ZeroDimensions);
        }
        Ok(Session::new(
            self.catalog,
            self.assets,
            self.detector,
            self.typeface,
            self.width,
            self.height,
        ))
    }
}
