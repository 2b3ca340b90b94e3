use thiserror::Error;

/// Errors returned by catalog loading, session state changes, and compositing.
#[derive(Debug, Error)]
pub enum FaceboardError {
    #[error("no template selected")]
    NoTemplateSelected,

    #[error("unknown template id: {0}")]
    UnknownTemplate(String),

    #[error("failed to parse template catalog: {0}")]
    CatalogParse(String),

    #[error("invalid template {id}: {reason}")]
    InvalidTemplate { id: String, reason: String },

    #[error("asset {path} unavailable: {reason}")]
    AssetUnavailable { path: String, reason: String },

    #[error("failed to decode photo: {0}")]
    PhotoDecode(String),

    #[error("image dimensions are zero")]
    ZeroDimensions,

    #[error("failed to encode image: {0}")]
    EncodeError(String),

    #[error("stale composite: the selection changed while detection ran")]
    StaleComposite,

    #[error("failed to load font: {0}")]
    FontLoad(String),
}
