use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::FaceboardError;
use crate::MAX_FACES;

/// A named face position on a template, in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Slot {
    /// Left edge of the slot (canvas pixels).
    pub x: f64,
    /// Top edge of the slot (canvas pixels).
    pub y: f64,
    /// Slot width (canvas pixels).
    pub width: f64,
    /// Slot height (canvas pixels).
    pub height: f64,
}

/// One board template: a background image and the slots faces land in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Template {
    /// Stable identifier used to select the template.
    pub id: String,
    /// Human-readable name shown in a picker.
    pub label: String,
    /// Asset path of the background image, stretched to the canvas.
    pub background: String,
    /// Optional frame image drawn on top of the finished board.
    #[serde(default)]
    pub overlay: Option<String>,
    /// Asset path of the picker thumbnail. Empty when the template has none.
    #[serde(default)]
    pub thumbnail: String,
    /// Face slots in fill order.
    pub slots: Vec<Slot>,
}

/// An ordered collection of templates, loaded from a JSON catalog.
///
/// Catalogs are validated on load; a `TemplateCatalog` in hand always
/// contains well-formed templates with unique ids.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<Template>,
}

impl TemplateCatalog {
    /// Parse a catalog from a JSON array of templates.
    pub fn from_json(json: &str) -> Result<Self, FaceboardError> {
        let templates: Vec<Template> =
            serde_json::from_str(json).map_err(|e| FaceboardError::CatalogParse(e.to_string()))?;
        let catalog = TemplateCatalog { templates };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Read and parse a catalog file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FaceboardError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            FaceboardError::CatalogParse(format!("{}: {}", path.display(), e))
        })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), FaceboardError> {
        let mut seen: HashSet<&str> = HashSet::new();

        for (index, template) in self.templates.iter().enumerate() {
            let fail = |reason: String| {
                let id = if template.id.trim().is_empty() {
                    format!("#{index}")
                } else {
                    template.id.clone()
                };
                Err(FaceboardError::InvalidTemplate { id, reason })
            };

            if template.id.trim().is_empty() {
                return fail("id must not be empty".into());
            }
            if !seen.insert(template.id.as_str()) {
                return fail("duplicate id".into());
            }
            if template.background.trim().is_empty() {
                return fail("background path must not be empty".into());
            }
            if template.slots.is_empty() {
                return fail("template has no slots".into());
            }
            if template.slots.len() > MAX_FACES {
                return fail(format!(
                    "template has {} slots, the limit is {}",
                    template.slots.len(),
                    MAX_FACES
                ));
            }
            for (slot_index, slot) in template.slots.iter().enumerate() {
                if !slot.x.is_finite() || !slot.y.is_finite() {
                    return fail(format!("slot {slot_index} has a non-finite position"));
                }
                if !slot.width.is_finite()
                    || !slot.height.is_finite()
                    || slot.width <= 0.0
                    || slot.height <= 0.0
                {
                    return fail(format!("slot {slot_index} has a non-positive size"));
                }
            }
        }

        Ok(())
    }

    /// Look up a template by id.
    pub fn get(&self, id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == id)
    }

    /// Iterate templates in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Template> {
        self.templates.iter()
    }

    /// Number of templates in the catalog.
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether the catalog holds no templates.
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
