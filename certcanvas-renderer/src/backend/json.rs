//! JSON backend: the render tree as a document for a browser view layer.

use super::{BackendType, RenderBackend};
use crate::{RenderResult, RenderTree};

/// Serializes render trees to JSON.
#[derive(Debug, Clone, Default)]
pub struct JsonBackend {
    pretty: bool,
    output: String,
}

impl JsonBackend {
    /// Create a backend producing compact JSON.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend producing indented JSON.
    #[must_use]
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            output: String::new(),
        }
    }
}

impl RenderBackend for JsonBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Json
    }

    fn render(&mut self, tree: &RenderTree) -> RenderResult<()> {
        self.output = if self.pretty {
            serde_json::to_string_pretty(tree)?
        } else {
            serde_json::to_string(tree)?
        };
        Ok(())
    }

    fn output(&self) -> &str {
        &self.output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CanvasRenderer;
    use certcanvas_core::{ElementPatch, NewElement, SceneStore};

    #[test]
    fn test_json_output_shape() {
        let mut store = SceneStore::default();
        store.create_element(NewElement::Line, &ElementPatch::default());
        let tree = CanvasRenderer::default().render_store(&store);

        let mut backend = JsonBackend::new();
        assert!(backend.output().is_empty());
        backend.render(&tree).expect("render");

        let value: serde_json::Value = serde_json::from_str(backend.output()).expect("json");
        assert_eq!(value["nodes"][0]["content"]["kind"], "line");
        assert_eq!(value["nodes"][0]["zIndex"], 0);
        assert_eq!(value["nodes"][0]["handles"][0]["handle"], "rotate");
    }
}
