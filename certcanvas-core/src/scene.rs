//! Scene graph for a certificate template.
//!
//! A [`Scene`] keeps its elements in insertion order. Rendering and the
//! layers list use the z-ordered views, which are stable sorts over that
//! insertion order.

use crate::{Element, ElementId};

/// The editable document plus its editing-session view state.
#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    /// Elements in insertion order.
    elements: Vec<Element>,
    /// Currently selected element, always a member of `elements`.
    selected: Option<ElementId>,
    /// Canvas width in scene units.
    canvas_width: f64,
    /// Canvas height in scene units.
    canvas_height: f64,
    /// Background image URI.
    background_image: Option<String>,
    /// View scale (1.0 = 100%), not part of the document.
    zoom: f64,
}

impl Scene {
    /// Create a new empty scene with the given canvas size.
    #[must_use]
    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            elements: Vec::new(),
            selected: None,
            canvas_width,
            canvas_height,
            background_image: None,
            zoom: 1.0,
        }
    }

    /// Set the background image.
    #[must_use]
    pub fn with_background(mut self, uri: impl Into<String>) -> Self {
        self.background_image = Some(uri.into());
        self
    }

    /// Elements in insertion order.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// Get an element by ID.
    #[must_use]
    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| &e.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| &e.id == id)
    }

    /// Check whether an element with this ID exists.
    #[must_use]
    pub fn contains(&self, id: &ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Get the number of elements in the scene.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    /// Check if the scene is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Elements sorted ascending by z-index, ties kept in insertion order.
    #[must_use]
    pub fn render_order(&self) -> Vec<&Element> {
        let mut ordered: Vec<_> = self.elements.iter().collect();
        ordered.sort_by_key(|e| e.z_index);
        ordered
    }

    /// The exact reverse of [`Scene::render_order`]: topmost layer first.
    #[must_use]
    pub fn layer_order(&self) -> Vec<&Element> {
        let mut ordered = self.render_order();
        ordered.reverse();
        ordered
    }

    /// Find the topmost visible, unlocked element under a scene point.
    ///
    /// Locked elements let the pointer through to whatever lies beneath.
    #[must_use]
    pub fn element_at(&self, x: f64, y: f64) -> Option<&Element> {
        self.layer_order()
            .into_iter()
            .find(|e| e.visible && !e.locked && e.contains_point(x, y))
    }

    /// Convert a viewport point (zoomed pixels) to scene coordinates.
    #[must_use]
    pub fn to_scene_point(&self, x: f64, y: f64) -> (f64, f64) {
        (x / self.zoom, y / self.zoom)
    }

    /// Currently selected element ID.
    #[must_use]
    pub fn selected_id(&self) -> Option<&ElementId> {
        self.selected.as_ref()
    }

    /// Currently selected element.
    #[must_use]
    pub fn selected_element(&self) -> Option<&Element> {
        self.selected.as_ref().and_then(|id| self.get(id))
    }

    /// Canvas width in scene units.
    #[must_use]
    pub fn canvas_width(&self) -> f64 {
        self.canvas_width
    }

    /// Canvas height in scene units.
    #[must_use]
    pub fn canvas_height(&self) -> f64 {
        self.canvas_height
    }

    /// Background image URI, if any.
    #[must_use]
    pub fn background_image(&self) -> Option<&str> {
        self.background_image.as_deref()
    }

    /// Current zoom factor.
    #[must_use]
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub(crate) fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub(crate) fn remove(&mut self, id: &ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| &e.id == id)?;
        if self.selected.as_ref() == Some(id) {
            self.selected = None;
        }
        Some(self.elements.remove(index))
    }

    /// Swap in a new element list, dropping a selection that no longer resolves.
    pub(crate) fn replace_elements(&mut self, elements: Vec<Element>) {
        self.elements = elements;
        if let Some(id) = &self.selected {
            if !self.contains(id) {
                self.selected = None;
            }
        }
    }

    /// Select an existing element or clear the selection.
    ///
    /// Returns `false` (and changes nothing) for an unknown ID.
    pub(crate) fn select(&mut self, id: Option<ElementId>) -> bool {
        match id {
            Some(id) if !self.contains(&id) => false,
            id => {
                self.selected = id;
                true
            }
        }
    }

    pub(crate) fn set_background(&mut self, uri: Option<String>) {
        self.background_image = uri.filter(|u| !u.is_empty());
    }

    pub(crate) fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom;
    }
}
