use faceboard::{
    CompositeReport, FaceBox, FaceboardError, MemoryAssets, Session, SessionBuilder,
    TemplateCatalog, Typeface, UploadJob,
};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

/// A detection box passed from JavaScript, in photo pixel coordinates.
///
/// All fields default to zero, so partial objects parse.
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DetectionInput {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
}

impl From<DetectionInput> for FaceBox {
    fn from(d: DetectionInput) -> Self {
        FaceBox {
            x: d.x,
            y: d.y,
            width: d.width,
            height: d.height,
            confidence: d.confidence,
        }
    }
}

/// Create a JS `Error` with a `code` property.
fn make_error(code: &str, message: &str) -> JsValue {
    let err = js_sys::Error::new(message);
    let _ = js_sys::Reflect::set(&err, &"code".into(), &JsValue::from_str(code));
    JsValue::from(err)
}

/// Convert a `FaceboardError` into a JS `Error` with a machine-readable
/// `code` property.
fn to_js_error(e: FaceboardError) -> JsValue {
    let code = match &e {
        FaceboardError::NoTemplateSelected => "NO_TEMPLATE_SELECTED",
        FaceboardError::UnknownTemplate(_) => "UNKNOWN_TEMPLATE",
        FaceboardError::CatalogParse(_) => "CATALOG_PARSE",
        FaceboardError::InvalidTemplate { .. } => "INVALID_TEMPLATE",
        FaceboardError::AssetUnavailable { .. } => "ASSET_UNAVAILABLE",
        FaceboardError::PhotoDecode(_) => "PHOTO_DECODE",
        FaceboardError::ZeroDimensions => "ZERO_DIMENSIONS",
        FaceboardError::EncodeError(_) => "ENCODE_ERROR",
        FaceboardError::StaleComposite => "STALE_COMPOSITE",
        FaceboardError::FontLoad(_) => "FONT_LOAD",
    };
    make_error(code, &e.to_string())
}

/// Build a plain JS object from a `CompositeReport`.
fn build_report_object(report: &CompositeReport) -> Result<JsValue, JsValue> {
    let obj = js_sys::Object::new();
    js_sys::Reflect::set(
        &obj,
        &"facesDetected".into(),
        &JsValue::from(report.faces_detected as u32),
    )?;
    js_sys::Reflect::set(
        &obj,
        &"facesPainted".into(),
        &JsValue::from(report.faces_painted as u32),
    )?;
    js_sys::Reflect::set(
        &obj,
        &"slotsUnfilled".into(),
        &JsValue::from(report.slots_unfilled as u32),
    )?;
    Ok(JsValue::from(obj))
}

/// Browser-side handle for one board-building session.
///
/// The page fetches artwork itself and registers the bytes here; detection
/// also stays on the page, between `beginUpload` and `finishUpload`.
#[wasm_bindgen]
pub struct Board {
    session: Session,
    assets: MemoryAssets,
    pending: Option<UploadJob>,
}

#[wasm_bindgen]
impl Board {
    /// Create a session from catalog JSON and a canvas size.
    ///
    /// @param catalog_json - JSON array of template descriptors
    /// @param width - canvas width in pixels
    /// @param height - canvas height in pixels
    #[wasm_bindgen(constructor)]
    pub fn new(catalog_json: &str, width: u32, height: u32) -> Result<Board, JsValue> {
        let catalog = TemplateCatalog::from_json(catalog_json).map_err(to_js_error)?;
        let assets = MemoryAssets::new();
        let session = SessionBuilder::new(catalog, Box::new(assets.clone()))
            .canvas_size(width, height)
            .build()
            .map_err(to_js_error)?;
        Ok(Board {
            session,
            assets,
            pending: None,
        })
    }

    /// Register fetched image bytes under a catalog asset path.
    #[wasm_bindgen(js_name = "registerAsset")]
    pub fn register_asset(&self, path: &str, bytes: Vec<u8>) {
        self.assets.insert(path, bytes);
    }

    /// Use a TTF/OTF font for titles and captions instead of the built-in
    /// bitmap face.
    #[wasm_bindgen(js_name = "useFont")]
    pub fn use_font(&mut self, bytes: Vec<u8>) -> Result<(), JsValue> {
        let typeface = Typeface::from_font_bytes(bytes).map_err(to_js_error)?;
        self.session.set_typeface(typeface);
        Ok(())
    }

    /// Catalog entries for building a picker, in catalog order.
    /// Each element is `{ id, label, thumbnail }`.
    pub fn templates(&self) -> Result<js_sys::Array, JsValue> {
        let array = js_sys::Array::new();
        for template in self.session.catalog().iter() {
            let obj = js_sys::Object::new();
            js_sys::Reflect::set(&obj, &"id".into(), &JsValue::from_str(&template.id))?;
            js_sys::Reflect::set(&obj, &"label".into(), &JsValue::from_str(&template.label))?;
            js_sys::Reflect::set(
                &obj,
                &"thumbnail".into(),
                &JsValue::from_str(&template.thumbnail),
            )?;
            array.push(&obj);
        }
        Ok(array)
    }

    /// Make a template active, clearing any previous render and previews.
    #[wasm_bindgen(js_name = "selectTemplate")]
    pub fn select_template(&mut self, id: &str) -> Result<(), JsValue> {
        // a staged upload is kept: committing it later reports STALE_COMPOSITE
        self.session.select_template(id).map_err(to_js_error)
    }

    /// Drop the active template and clear the surface.
    #[wasm_bindgen(js_name = "clearSelection")]
    pub fn clear_selection(&mut self) {
        self.session.clear_selection();
    }

    /// Decode a photo and stage it for detection.
    ///
    /// @param photo - encoded image bytes (PNG, JPEG, WebP, ...)
    /// @returns `{ gray: Uint8Array, width, height }` for the page's detector
    #[wasm_bindgen(js_name = "beginUpload")]
    pub fn begin_upload(&mut self, photo: Vec<u8>) -> Result<JsValue, JsValue> {
        let job = self.session.begin_upload(&photo).map_err(to_js_error)?;

        let obj = js_sys::Object::new();
        js_sys::Reflect::set(&obj, &"gray".into(), &js_sys::Uint8Array::from(job.gray()))?;
        js_sys::Reflect::set(&obj, &"width".into(), &JsValue::from(job.width()))?;
        js_sys::Reflect::set(&obj, &"height".into(), &JsValue::from(job.height()))?;

        self.pending = Some(job);
        Ok(JsValue::from(obj))
    }

    /// Composite the staged photo with the page's detections.
    ///
    /// @param detections - array of `{ x, y, width, height, confidence? }`
    /// @returns `{ facesDetected, facesPainted, slotsUnfilled }`
    #[wasm_bindgen(js_name = "finishUpload")]
    pub fn finish_upload(
        &mut self,
        detections: JsValue,
        title: &str,
        caption: &str,
    ) -> Result<JsValue, JsValue> {
        let job = self
            .pending
            .take()
            .ok_or_else(|| make_error("NO_PENDING_UPLOAD", "no upload in progress"))?;

        let parsed: Vec<DetectionInput> = serde_wasm_bindgen::from_value(detections)
            .map_err(|e| make_error("INVALID_DETECTIONS", &format!("invalid detections: {e}")))?;
        let boxes: Vec<FaceBox> = parsed.into_iter().map(FaceBox::from).collect();

        let report = self
            .session
            .finish_upload(job, &boxes, title, caption)
            .map_err(to_js_error)?;
        build_report_object(&report)
    }

    /// The whole upload in one call, compositing with zero detections.
    /// Any staged upload is discarded.
    #[wasm_bindgen(js_name = "uploadPhoto")]
    pub fn upload_photo(
        &mut self,
        photo: Vec<u8>,
        title: &str,
        caption: &str,
    ) -> Result<JsValue, JsValue> {
        self.pending = None;
        let report = self
            .session
            .upload_photo(&photo, title, caption)
            .map_err(to_js_error)?;
        build_report_object(&report)
    }

    /// Repaint title and caption from the retained pre-text snapshot.
    #[wasm_bindgen(js_name = "refreshText")]
    pub fn refresh_text(&mut self, title: &str, caption: &str) {
        self.session.refresh_text(title, caption);
    }

    /// Export the displayed frame as PNG bytes.
    #[wasm_bindgen(js_name = "toPng")]
    pub fn to_png(&self) -> Result<Vec<u8>, JsValue> {
        self.session.render().to_png().map_err(to_js_error)
    }

    /// Number of preview tiles from the last composite.
    #[wasm_bindgen(js_name = "previewCount")]
    pub fn preview_count(&self) -> usize {
        self.session.previews().len()
    }

    /// One preview tile as PNG bytes.
    #[wasm_bindgen(js_name = "previewPng")]
    pub fn preview_png(&self, index: usize) -> Result<Vec<u8>, JsValue> {
        let tile = self.session.previews().get(index).ok_or_else(|| {
            make_error(
                "PREVIEW_OUT_OF_RANGE",
                &format!("no preview at index {index}"),
            )
        })?;
        faceboard::encode_png(tile).map_err(to_js_error)
    }

    /// The active template id, if any.
    #[wasm_bindgen(js_name = "selectedId")]
    pub fn selected_id(&self) -> Option<String> {
        self.session.selected_id().map(str::to_string)
    }
}
