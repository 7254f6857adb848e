//! # CertCanvas Renderer
//!
//! Maps a certificate [`Scene`] to a positioned render tree and hands it to
//! a backend. Rendering is a pure function of the scene: the same scene and
//! configuration always produce the same tree.
//!
//! ## Backends
//!
//! - **SVG**: standalone document for export and previews
//! - **JSON**: the render tree itself, for a browser view layer

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod error;
pub mod tree;

pub use backend::{json::JsonBackend, svg::SvgBackend, RenderBackend};
pub use error::{RenderError, RenderResult};
pub use tree::{
    Bounds, Chrome, Grid, HandleMarker, ImageFit, NodeContent, RenderNode, RenderTree, TextLine,
};

use certcanvas_core::{handle_positions, Element, HandleConfig, Scene, SceneStore};
use serde::{Deserialize, Serialize};

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Draw a grid over the background.
    pub show_grid: bool,
    /// Grid cell size in scene units.
    pub grid_spacing: f64,
    /// Grid line color.
    pub grid_color: String,
    /// Selection outline color.
    pub selection_color: String,
    /// Handle fill color.
    pub handle_fill: String,
    /// Handle outline color.
    pub handle_stroke: String,
    /// Average glyph advance as a fraction of the font size, used for wrapping.
    pub average_glyph_width: f64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            show_grid: false,
            grid_spacing: 20.0,
            grid_color: "#E5E7EB".to_string(),
            selection_color: "#3B82F6".to_string(),
            handle_fill: "#FFFFFF".to_string(),
            handle_stroke: "#3B82F6".to_string(),
            average_glyph_width: 0.55,
        }
    }
}

/// Builds render trees from scenes.
#[derive(Debug, Clone, Default)]
pub struct CanvasRenderer {
    config: RendererConfig,
}

impl CanvasRenderer {
    /// Create a renderer with the given configuration.
    #[must_use]
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }

    /// Get the renderer configuration.
    #[must_use]
    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Build the render tree for a scene.
    ///
    /// Hidden elements are left out entirely. Nodes follow the scene's
    /// render order, so ties in z-index keep insertion order.
    #[must_use]
    pub fn render(&self, scene: &Scene, handles: &HandleConfig) -> RenderTree {
        let selected = scene.selected_id();
        let nodes: Vec<_> = scene
            .render_order()
            .into_iter()
            .filter(|e| e.visible)
            .map(|e| self.render_element(e, selected == Some(&e.id), handles))
            .collect();

        tracing::trace!(
            "Rendered {} of {} elements",
            nodes.len(),
            scene.element_count()
        );

        RenderTree {
            width: scene.canvas_width(),
            height: scene.canvas_height(),
            zoom: scene.zoom(),
            background: scene.background_image().map(ToString::to_string),
            grid: self.config.show_grid.then(|| Grid {
                spacing: self.config.grid_spacing,
                color: self.config.grid_color.clone(),
            }),
            nodes,
            chrome: Chrome {
                selection_color: self.config.selection_color.clone(),
                handle_fill: self.config.handle_fill.clone(),
                handle_stroke: self.config.handle_stroke.clone(),
            },
        }
    }

    /// Build the render tree for a store's scene with its handle geometry.
    #[must_use]
    pub fn render_store(&self, store: &SceneStore) -> RenderTree {
        self.render(store.scene(), &store.config().handles)
    }

    fn render_element(
        &self,
        element: &Element,
        selected: bool,
        handle_config: &HandleConfig,
    ) -> RenderNode {
        let kind_name = element.element_type();
        tracing::trace!(
            "Render {kind_name:?} {} at ({}, {})",
            element.id,
            element.x,
            element.y
        );

        let interactive = !element.locked;
        let handles = if selected && interactive {
            handle_positions(element, handle_config)
                .into_iter()
                .map(|(handle, x, y)| HandleMarker {
                    handle,
                    x,
                    y,
                    size: handle_config.size,
                })
                .collect()
        } else {
            Vec::new()
        };

        RenderNode {
            id: element.id.clone(),
            bounds: tree::bounds_of(element),
            rotation: element.rotation,
            opacity: element.opacity,
            z_index: element.z_index,
            interactive,
            selected,
            content: tree::layout_content(element, self.config.average_glyph_width),
            handles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certcanvas_core::{ElementPatch, NewElement, ShapeType};

    #[test]
    fn test_default_config() {
        let config = RendererConfig::default();
        assert!(!config.show_grid);
        assert!((config.grid_spacing - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_scene() {
        let store = SceneStore::default();
        let tree = CanvasRenderer::default().render_store(&store);
        assert!(tree.nodes.is_empty());
        assert!((tree.width - 1200.0).abs() < f64::EPSILON);
        assert!(tree.background.is_none());
        assert!(tree.grid.is_none());
    }

    #[test]
    fn test_grid_when_enabled() {
        let renderer = CanvasRenderer::new(RendererConfig {
            show_grid: true,
            ..RendererConfig::default()
        });
        let tree = renderer.render_store(&SceneStore::default());
        assert!(tree
            .grid
            .is_some_and(|g| (g.spacing - 20.0).abs() < f64::EPSILON));
    }

    #[test]
    fn test_hidden_elements_are_omitted() {
        let mut store = SceneStore::default();
        let shown = store.create_element(NewElement::Line, &ElementPatch::default());
        let hidden = store.create_element(
            NewElement::Text,
            &ElementPatch {
                visible: Some(false),
                ..ElementPatch::default()
            },
        );
        let tree = CanvasRenderer::default().render_store(&store);
        assert!(tree.node(&shown).is_some());
        assert!(tree.node(&hidden).is_none());
        assert!(tree.selected().is_none());
    }

    #[test]
    fn test_handles_only_for_selected_unlocked() {
        let mut store = SceneStore::default();
        let a = store.create_element(
            NewElement::Shape(ShapeType::Rectangle),
            &ElementPatch::default(),
        );
        let b = store.create_element(NewElement::Shape(ShapeType::Circle), &ElementPatch::default());
        assert_eq!(store.scene().selected_id(), Some(&b));

        let tree = CanvasRenderer::default().render_store(&store);
        assert_eq!(tree.node(&b).map(|n| n.handles.len()), Some(9));
        assert_eq!(tree.node(&a).map(|n| n.handles.len()), Some(0));

        store.update_element(
            &b,
            &ElementPatch {
                locked: Some(true),
                ..ElementPatch::default()
            },
        );
        let tree = CanvasRenderer::default().render_store(&store);
        let node = tree.node(&b).expect("node");
        assert!(node.selected);
        assert!(!node.interactive);
        assert!(node.handles.is_empty());
    }

    #[test]
    fn test_nodes_follow_z_order() {
        let mut store = SceneStore::default();
        let top = store.create_element(NewElement::Line, &ElementPatch::z_index(5));
        let bottom = store.create_element(NewElement::Line, &ElementPatch::z_index(0));
        let tree = CanvasRenderer::default().render_store(&store);
        let ids: Vec<_> = tree.nodes.iter().map(|n| n.id.clone()).collect();
        assert_eq!(ids, vec![bottom, top]);
    }
}
