//! Rendering backend implementations.

pub mod json;
pub mod svg;

use serde::{Deserialize, Serialize};

use crate::{RenderResult, RenderTree};

/// Available output backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendType {
    /// Standalone SVG document.
    Svg,
    /// Serialized render tree.
    Json,
}

/// Trait for rendering backends.
pub trait RenderBackend {
    /// Get the backend type.
    fn backend_type(&self) -> BackendType;

    /// Render a tree, replacing the previous output.
    ///
    /// # Errors
    ///
    /// Returns an error if the tree cannot be represented by the backend.
    fn render(&mut self, tree: &RenderTree) -> RenderResult<()>;

    /// Output of the last successful render, empty before the first.
    fn output(&self) -> &str;
}
