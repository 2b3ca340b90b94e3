use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use image::RgbaImage;

use crate::error::FaceboardError;

/// Source of template artwork. Backgrounds, overlays, and thumbnails are
/// referenced by path in the catalog and resolved through this trait, so the
/// same catalog works against a directory on disk or bytes handed over a
/// boundary.
pub trait AssetStore: Send + Sync {
    /// Resolve an asset path to a decoded RGBA image.
    fn resolve(&self, path: &str) -> Result<RgbaImage, FaceboardError>;
}

fn decode_asset(path: &str, bytes: &[u8]) -> Result<RgbaImage, FaceboardError> {
    let decoded = image::load_from_memory(bytes).map_err(|e| FaceboardError::AssetUnavailable {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok(decoded.to_rgba8())
}

/// Asset store backed by a directory on disk. Paths in the catalog are
/// resolved relative to the root.
#[derive(Debug, Clone)]
pub struct FsAssets {
    root: PathBuf,
}

impl FsAssets {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsAssets { root: root.into() }
    }
}

impl AssetStore for FsAssets {
    fn resolve(&self, path: &str) -> Result<RgbaImage, FaceboardError> {
        let full = self.root.join(path);
        log::debug!("resolving asset {}", full.display());
        let bytes = fs::read(&full).map_err(|e| FaceboardError::AssetUnavailable {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        decode_asset(path, &bytes)
    }
}

/// Asset store holding encoded images in memory, keyed by catalog path.
///
/// Clones share the same underlying map, so assets registered through one
/// handle are visible to a session holding another.
#[derive(Debug, Clone, Default)]
pub struct MemoryAssets {
    images: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryAssets {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded image bytes under a catalog path, replacing any
    /// previous entry.
    pub fn insert(&self, path: impl Into<String>, bytes: Vec<u8>) {
        let mut images = self.images.write().unwrap_or_else(|p| p.into_inner());
        images.insert(path.into(), bytes);
    }

    /// Whether a path has been registered.
    pub fn contains(&self, path: &str) -> bool {
        let images = self.images.read().unwrap_or_else(|p| p.into_inner());
        images.contains_key(path)
    }
}

impl AssetStore for MemoryAssets {
    fn resolve(&self, path: &str) -> Result<RgbaImage, FaceboardError> {
        let images = self.images.read().unwrap_or_else(|p| p.into_inner());
        let bytes = images
            .get(path)
            .ok_or_else(|| FaceboardError::AssetUnavailable {
                path: path.to_string(),
                reason: "not registered".to_string(),
            })?;
        decode_asset(path, bytes)
    }
}
