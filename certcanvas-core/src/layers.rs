//! Layers panel: the scene's elements topmost first, with per-row controls.
//!
//! The panel holds no state of its own. Every control is a store mutation.

use serde::Serialize;

use crate::store::SceneStore;
use crate::{Element, ElementId, ElementKind, ElementPatch, ShapeType};

/// Characters of text content shown in a layer label before truncation.
pub const LABEL_MAX_CHARS: usize = 20;

/// Icon shown next to a layer label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerIcon {
    /// Text element.
    Text,
    /// Image element.
    Image,
    /// Rectangle shape.
    Square,
    /// Circle shape.
    Circle,
    /// Triangle shape.
    Triangle,
    /// Line element.
    Line,
}

/// One row of the layers panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerRow {
    /// Element ID.
    pub id: ElementId,
    /// Display label.
    pub label: String,
    /// Kind icon.
    pub icon: LayerIcon,
    /// Visibility flag.
    pub visible: bool,
    /// Lock flag.
    pub locked: bool,
    /// Whether this row is the selected element.
    pub selected: bool,
    /// Stacking index.
    pub z_index: i64,
}

/// Display label for an element.
///
/// Text layers show their content, cut to [`LABEL_MAX_CHARS`] characters
/// followed by `...` when longer; other kinds show a kind name.
#[must_use]
pub fn layer_label(element: &Element) -> String {
    match element.kind() {
        ElementKind::Text(text) => {
            if text.text.chars().count() > LABEL_MAX_CHARS {
                let head: String = text.text.chars().take(LABEL_MAX_CHARS).collect();
                format!("{head}...")
            } else {
                text.text.clone()
            }
        }
        ElementKind::Image(_) => "Image".to_string(),
        ElementKind::Shape(shape) => match shape.shape_type {
            ShapeType::Rectangle => "Rectangle",
            ShapeType::Circle => "Circle",
            ShapeType::Triangle => "Triangle",
        }
        .to_string(),
        ElementKind::Line(_) => "Line".to_string(),
    }
}

/// Icon for an element.
#[must_use]
pub fn layer_icon(element: &Element) -> LayerIcon {
    match element.kind() {
        ElementKind::Text(_) => LayerIcon::Text,
        ElementKind::Image(_) => LayerIcon::Image,
        ElementKind::Shape(shape) => match shape.shape_type {
            ShapeType::Rectangle => LayerIcon::Square,
            ShapeType::Circle => LayerIcon::Circle,
            ShapeType::Triangle => LayerIcon::Triangle,
        },
        ElementKind::Line(_) => LayerIcon::Line,
    }
}

/// Controlled view over a [`SceneStore`].
#[derive(Debug)]
pub struct LayersPanel<'a> {
    store: &'a mut SceneStore,
}

impl<'a> LayersPanel<'a> {
    /// Attach the panel to a store.
    pub fn new(store: &'a mut SceneStore) -> Self {
        Self { store }
    }

    /// Rows in descending z-order, topmost layer first.
    #[must_use]
    pub fn rows(&self) -> Vec<LayerRow> {
        let scene = self.store.scene();
        let selected = scene.selected_id();
        scene
            .layer_order()
            .into_iter()
            .map(|element| LayerRow {
                id: element.id.clone(),
                label: layer_label(element),
                icon: layer_icon(element),
                visible: element.visible,
                locked: element.locked,
                selected: selected == Some(&element.id),
                z_index: element.z_index,
            })
            .collect()
    }

    /// Clicking a row selects its element.
    pub fn select(&mut self, id: &ElementId) -> bool {
        self.store.set_selection(Some(id.clone()))
    }

    /// Show or hide an element.
    pub fn toggle_visibility(&mut self, id: &ElementId) {
        let Some(visible) = self.store.scene().get(id).map(|e| e.visible) else {
            return;
        };
        self.store.update_element(
            id,
            &ElementPatch {
                visible: Some(!visible),
                ..ElementPatch::default()
            },
        );
    }

    /// Lock or unlock an element.
    pub fn toggle_lock(&mut self, id: &ElementId) {
        let Some(locked) = self.store.scene().get(id).map(|e| e.locked) else {
            return;
        };
        self.store.update_element(
            id,
            &ElementPatch {
                locked: Some(!locked),
                ..ElementPatch::default()
            },
        );
    }

    /// Raise an element by one z-index step.
    pub fn move_up(&mut self, id: &ElementId) {
        if let Some(z_index) = self.store.scene().get(id).map(|e| e.z_index) {
            self.store
                .update_element(id, &ElementPatch::z_index(z_index.saturating_add(1)));
        }
    }

    /// Lower an element by one z-index step, never below zero.
    pub fn move_down(&mut self, id: &ElementId) {
        if let Some(z_index) = self.store.scene().get(id).map(|e| e.z_index) {
            self.store
                .update_element(id, &ElementPatch::z_index(z_index.saturating_sub(1).max(0)));
        }
    }
}
