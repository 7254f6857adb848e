//! Scene store: the only way to change a scene.
//!
//! Every content mutation records exactly one history snapshot. Selection,
//! zoom and background changes are session state and are never recorded.
//!
//! Continuous gestures use a two-phase draft:
//! [`SceneStore::preview_element`] changes the live scene without
//! recording, then [`SceneStore::commit_draft`] records one entry for the
//! whole gesture or [`SceneStore::revert_draft`] restores the pre-gesture
//! elements. Any recorded mutation commits a pending draft first, so a
//! half-finished gesture never leaks into someone else's snapshot.

use tracing::{debug, trace};

use crate::config::EditorConfig;
use crate::error::EditorResult;
use crate::history::History;
use crate::schema::TemplateDocument;
use crate::{Element, ElementId, ElementPatch, NewElement, Placement, Scene};

/// Authoritative scene state plus its undo history.
#[derive(Debug, Clone)]
pub struct SceneStore {
    scene: Scene,
    history: History<Vec<Element>>,
    config: EditorConfig,
    /// Elements as they were before the current draft began.
    draft_origin: Option<Vec<Element>>,
}

impl Default for SceneStore {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl SceneStore {
    /// Create a store with an empty scene sized from `config`.
    #[must_use]
    pub fn new(config: EditorConfig) -> Self {
        let mut scene = Scene::new(config.canvas_width, config.canvas_height);
        scene.set_zoom(config.zoom.clamp(config.zoom.initial));
        let history = config.history_limit.map_or_else(History::new, History::with_limit);
        Self {
            scene,
            history,
            config,
            draft_origin: None,
        }
    }

    /// Create a store hydrated from a saved document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EditorError::InvalidDocument`] if the document
    /// fails validation.
    pub fn from_document(document: TemplateDocument, config: EditorConfig) -> EditorResult<Self> {
        let mut store = Self::new(config);
        store.load_document(document)?;
        Ok(store)
    }

    /// The current scene.
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// The store configuration.
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// The undo history.
    #[must_use]
    pub fn history(&self) -> &History<Vec<Element>> {
        &self.history
    }

    /// Whether undo would change anything.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Whether redo would change anything.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Create an element with kind defaults, stacked on top and centered on
    /// the canvas, then add it.
    pub fn create_element(&mut self, new: NewElement, overrides: &ElementPatch) -> ElementId {
        let placement = Placement {
            canvas_width: self.scene.canvas_width(),
            canvas_height: self.scene.canvas_height(),
            z_index: self.next_z_index(),
        };
        let element = Element::create(new, placement, overrides);
        let id = element.id.clone();
        self.add_element(element);
        id
    }

    /// Append an element and select it.
    pub fn add_element(&mut self, element: Element) {
        self.settle_draft();
        debug!(id = %element.id, kind = ?element.element_type(), "add element");
        let id = element.id.clone();
        self.scene.push(element);
        self.scene.select(Some(id));
        self.record();
    }

    /// Merge `patch` into an element. Unknown IDs are ignored.
    pub fn update_element(&mut self, id: &ElementId, patch: &ElementPatch) {
        self.settle_draft();
        let Some(element) = self.scene.get_mut(id) else {
            trace!(%id, "update of unknown element ignored");
            return;
        };
        let changed = element.apply(patch);
        debug!(%id, changed, "update element");
        self.record();
    }

    /// Remove an element, clearing the selection if it was selected.
    pub fn delete_element(&mut self, id: &ElementId) {
        self.settle_draft();
        if self.scene.remove(id).is_none() {
            trace!(%id, "delete of unknown element ignored");
            return;
        }
        debug!(%id, "delete element");
        self.record();
    }

    /// Clone an element under a new ID, offset and stacked on top, and
    /// select the clone.
    pub fn duplicate_element(&mut self, id: &ElementId) -> Option<ElementId> {
        let z_index = self.next_z_index();
        let Some(copy) = self
            .scene
            .get(id)
            .map(|e| e.duplicate(self.config.duplicate_offset, z_index))
        else {
            trace!(%id, "duplicate of unknown element ignored");
            return None;
        };
        let copy_id = copy.id.clone();
        debug!(%id, copy = %copy_id, "duplicate element");
        self.add_element(copy);
        Some(copy_id)
    }

    /// Select an element or clear the selection. The selection itself is
    /// not recorded, but a pending draft is committed first.
    ///
    /// Returns `false` and keeps the current selection for an unknown ID.
    pub fn set_selection(&mut self, id: Option<ElementId>) -> bool {
        self.settle_draft();
        self.scene.select(id)
    }

    /// Swap in a new element list without recording it. Drops any draft.
    pub fn replace_all(&mut self, elements: Vec<Element>) {
        self.draft_origin = None;
        self.scene.replace_elements(elements);
    }

    /// Step back one history entry and clear the selection.
    ///
    /// Returns whether the scene changed.
    pub fn undo(&mut self) -> bool {
        self.settle_draft();
        let Some(snapshot) = self.history.undo().cloned() else {
            trace!("undo at start of history");
            return false;
        };
        debug!(cursor = ?self.history.cursor(), "undo");
        self.replace_all(snapshot);
        self.scene.select(None);
        true
    }

    /// Step forward one history entry and clear the selection.
    ///
    /// Returns whether the scene changed.
    pub fn redo(&mut self) -> bool {
        self.settle_draft();
        let Some(snapshot) = self.history.redo().cloned() else {
            trace!("redo at end of history");
            return false;
        };
        debug!(cursor = ?self.history.cursor(), "redo");
        self.replace_all(snapshot);
        self.scene.select(None);
        true
    }

    /// Set or clear the background image. Not recorded.
    pub fn set_background(&mut self, uri: Option<String>) {
        debug!(background = ?uri, "set background");
        self.scene.set_background(uri);
    }

    /// Set the zoom factor, clamped to the configured range.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.scene.set_zoom(self.config.zoom.clamp(zoom));
        }
    }

    /// Zoom in by one step.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.scene.zoom() + self.config.zoom.step);
    }

    /// Zoom out by one step.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.scene.zoom() - self.config.zoom.step);
    }

    /// Apply `patch` to the live scene as part of a draft, without recording.
    ///
    /// Returns `false` for an unknown ID.
    pub fn preview_element(&mut self, id: &ElementId, patch: &ElementPatch) -> bool {
        if !self.scene.contains(id) {
            return false;
        }
        if self.draft_origin.is_none() {
            self.draft_origin = Some(self.scene.elements().to_vec());
        }
        if let Some(element) = self.scene.get_mut(id) {
            element.apply(patch);
        }
        trace!(%id, "preview element");
        true
    }

    /// Whether a draft is pending.
    #[must_use]
    pub fn has_draft(&self) -> bool {
        self.draft_origin.is_some()
    }

    /// Finish the pending draft, recording one entry if it changed anything.
    ///
    /// Returns whether an entry was recorded.
    pub fn commit_draft(&mut self) -> bool {
        let Some(origin) = self.draft_origin.take() else {
            return false;
        };
        if origin == self.scene.elements() {
            trace!("draft left the scene unchanged");
            return false;
        }
        debug!("commit draft");
        self.record();
        true
    }

    /// Abandon the pending draft and restore the pre-draft elements.
    ///
    /// Returns whether a draft was pending.
    pub fn revert_draft(&mut self) -> bool {
        let Some(origin) = self.draft_origin.take() else {
            return false;
        };
        debug!("revert draft");
        self.scene.replace_elements(origin);
        true
    }

    /// The scene as an interchange document.
    #[must_use]
    pub fn document(&self) -> TemplateDocument {
        TemplateDocument::from_scene(&self.scene)
    }

    /// Replace the whole scene with a saved document.
    ///
    /// History restarts with the loaded state as its only entry. Zoom is
    /// kept. On error the store is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`crate::EditorError::InvalidDocument`] if the document
    /// fails validation.
    pub fn load_document(&mut self, document: TemplateDocument) -> EditorResult<()> {
        let mut scene = document.into_scene()?;
        scene.set_zoom(self.scene.zoom());
        debug!(elements = scene.element_count(), "load document");
        self.scene = scene;
        self.draft_origin = None;
        self.history.clear();
        self.record();
        Ok(())
    }

    fn next_z_index(&self) -> i64 {
        i64::try_from(self.scene.element_count()).unwrap_or(i64::MAX)
    }

    fn settle_draft(&mut self) {
        if self.has_draft() {
            self.commit_draft();
        }
    }

    fn record(&mut self) {
        self.history.record(self.scene.elements().to_vec());
    }
}
