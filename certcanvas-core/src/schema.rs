//! Interchange document for saving and loading templates.
//!
//! ```json
//! { "elements": [...], "backgroundImage": "", "canvasWidth": 1200, "canvasHeight": 900 }
//! ```
//!
//! An empty `backgroundImage` means no background. Selection and zoom are
//! session state and never appear in the document.

use serde::{Deserialize, Serialize};

use crate::error::EditorResult;
use crate::validation::validate_document;
use crate::{Element, Scene};

/// Canonical serialized template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateDocument {
    /// Elements in insertion order.
    pub elements: Vec<Element>,
    /// Background image URI, empty for none.
    #[serde(default)]
    pub background_image: String,
    /// Canvas width in scene units.
    pub canvas_width: f64,
    /// Canvas height in scene units.
    pub canvas_height: f64,
}

impl TemplateDocument {
    /// Build a document from a scene.
    #[must_use]
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            elements: scene.elements().to_vec(),
            background_image: scene.background_image().unwrap_or_default().to_string(),
            canvas_width: scene.canvas_width(),
            canvas_height: scene.canvas_height(),
        }
    }

    /// Validate and materialize the document as a fresh scene with no
    /// selection and zoom 1.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EditorError::InvalidDocument`] if validation fails.
    pub fn into_scene(self) -> EditorResult<Scene> {
        validate_document(&self)?;
        let mut scene = Scene::new(self.canvas_width, self.canvas_height);
        scene.set_background(Some(self.background_image));
        scene.replace_elements(self.elements);
        Ok(scene)
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EditorError::Serialization`] if encoding fails.
    pub fn to_json(&self) -> EditorResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EditorError::Serialization`] if encoding fails.
    pub fn to_json_pretty(&self) -> EditorResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EditorError::Serialization`] for malformed JSON.
    pub fn from_json(json: &str) -> EditorResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
