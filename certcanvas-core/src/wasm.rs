//! WebAssembly bindings for certcanvas-core.
//!
//! This module provides a JavaScript-callable editor when compiled to WASM.
//! Structured values cross the boundary as JSON strings.

use wasm_bindgen::prelude::*;

use crate::interaction::CanvasInteraction;
use crate::layers::LayersPanel;
use crate::properties::{PropertiesPanel, PropertyField};
use crate::{EditorConfig, ElementId, ElementPatch, NewElement, SceneStore, TemplateDocument};

/// Initialize the editor WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();
}

/// Editor instance for WASM.
#[wasm_bindgen]
pub struct WasmEditor {
    store: SceneStore,
    canvas: CanvasInteraction,
}

impl Default for WasmEditor {
    fn default() -> Self {
        Self::new()
    }
}

#[wasm_bindgen]
impl WasmEditor {
    /// Create an editor with the default configuration.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: SceneStore::default(),
            canvas: CanvasInteraction::new(),
        }
    }

    /// Create an editor from a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error string if the configuration is invalid.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<WasmEditor, String> {
        let config = EditorConfig::from_json_str(json).map_err(|e| e.to_string())?;
        Ok(Self {
            store: SceneStore::new(config),
            canvas: CanvasInteraction::new(),
        })
    }

    /// Get the template document as JSON.
    #[wasm_bindgen(js_name = getDocumentJson)]
    #[must_use]
    pub fn get_document_json(&self) -> String {
        self.store.document().to_json().unwrap_or_default()
    }

    /// Replace the scene with a template document.
    ///
    /// # Errors
    ///
    /// Returns an error string if parsing or validation fails.
    #[wasm_bindgen(js_name = loadDocumentJson)]
    pub fn load_document_json(&mut self, json: &str) -> Result<(), String> {
        let document = TemplateDocument::from_json(json).map_err(|e| e.to_string())?;
        self.store.load_document(document).map_err(|e| e.to_string())
    }

    /// Add an element from a toolbar tool and return its ID.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown tool or malformed overrides.
    #[wasm_bindgen(js_name = createElement)]
    pub fn create_element(
        &mut self,
        tool: &str,
        src: Option<String>,
        overrides_json: Option<String>,
    ) -> Result<String, String> {
        let new = NewElement::from_tool(tool, src).map_err(|e| e.to_string())?;
        let overrides = parse_patch(overrides_json.as_deref())?;
        Ok(self.store.create_element(new, &overrides).to_string())
    }

    /// Merge a JSON patch into an element.
    ///
    /// # Errors
    ///
    /// Returns an error string if the patch is malformed.
    #[wasm_bindgen(js_name = updateElement)]
    pub fn update_element(&mut self, id: &str, patch_json: &str) -> Result<(), String> {
        let patch = parse_patch(Some(patch_json))?;
        self.store.update_element(&ElementId::from(id), &patch);
        Ok(())
    }

    /// Delete an element.
    #[wasm_bindgen(js_name = deleteElement)]
    pub fn delete_element(&mut self, id: &str) {
        self.store.delete_element(&ElementId::from(id));
    }

    /// Duplicate an element, returning the clone's ID.
    #[wasm_bindgen(js_name = duplicateElement)]
    pub fn duplicate_element(&mut self, id: &str) -> Option<String> {
        self.store
            .duplicate_element(&ElementId::from(id))
            .map(|id| id.to_string())
    }

    /// Select an element, or clear the selection with `undefined`.
    #[wasm_bindgen(js_name = setSelection)]
    pub fn set_selection(&mut self, id: Option<String>) -> bool {
        self.store.set_selection(id.map(ElementId::from))
    }

    /// Undo the last change.
    pub fn undo(&mut self) -> bool {
        self.store.undo()
    }

    /// Redo the last undone change.
    pub fn redo(&mut self) -> bool {
        self.store.redo()
    }

    /// Whether undo is available.
    #[wasm_bindgen(js_name = canUndo)]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.store.can_undo()
    }

    /// Whether redo is available.
    #[wasm_bindgen(js_name = canRedo)]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.store.can_redo()
    }

    /// Set or clear the background image.
    #[wasm_bindgen(js_name = setBackground)]
    pub fn set_background(&mut self, uri: Option<String>) {
        self.store.set_background(uri);
    }

    /// Zoom in one step.
    #[wasm_bindgen(js_name = zoomIn)]
    pub fn zoom_in(&mut self) {
        self.store.zoom_in();
    }

    /// Zoom out one step.
    #[wasm_bindgen(js_name = zoomOut)]
    pub fn zoom_out(&mut self) {
        self.store.zoom_out();
    }

    /// Current zoom factor.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.store.scene().zoom()
    }

    /// Pointer press in viewport pixels; returns the outcome as JSON.
    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, x: f64, y: f64) -> String {
        let outcome = self.canvas.pointer_down(&mut self.store, x, y);
        serde_json::to_string(&outcome).unwrap_or_default()
    }

    /// Pointer motion in viewport pixels.
    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, x: f64, y: f64) -> bool {
        self.canvas.pointer_move(&mut self.store, x, y)
    }

    /// Pointer release.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self) -> bool {
        self.canvas.pointer_up(&mut self.store)
    }

    /// Pointer left the canvas mid-gesture.
    #[wasm_bindgen(js_name = pointerCancel)]
    pub fn pointer_cancel(&mut self) -> bool {
        self.canvas.pointer_cancel(&mut self.store)
    }

    /// Layers panel rows as JSON.
    #[wasm_bindgen(js_name = getLayersJson)]
    pub fn get_layers_json(&mut self) -> String {
        serde_json::to_string(&LayersPanel::new(&mut self.store).rows()).unwrap_or_default()
    }

    /// Properties panel state as JSON.
    #[wasm_bindgen(js_name = getPropertiesJson)]
    pub fn get_properties_json(&mut self) -> String {
        serde_json::to_string(&PropertiesPanel::new(&mut self.store).form()).unwrap_or_default()
    }

    /// Edit a property of the selected element from a raw input value.
    ///
    /// # Errors
    ///
    /// Returns an error string for an unknown field name.
    #[wasm_bindgen(js_name = editProperty)]
    pub fn edit_property(&mut self, field: &str, raw: &str) -> Result<bool, String> {
        let field: PropertyField =
            serde_json::from_value(serde_json::Value::String(field.to_string()))
                .map_err(|e| e.to_string())?;
        Ok(PropertiesPanel::new(&mut self.store).edit(field, raw))
    }

    /// Commit pending property edits.
    #[wasm_bindgen(js_name = commitProperties)]
    pub fn commit_properties(&mut self) -> bool {
        PropertiesPanel::new(&mut self.store).commit()
    }
}

fn parse_patch(json: Option<&str>) -> Result<ElementPatch, String> {
    json.map_or_else(
        || Ok(ElementPatch::default()),
        |json| serde_json::from_str(json).map_err(|e| e.to_string()),
    )
}
