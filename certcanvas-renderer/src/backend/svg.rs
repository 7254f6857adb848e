//! SVG backend.
//!
//! Produces a standalone SVG document sized to the zoomed canvas, with the
//! scene coordinate system as its `viewBox`. Each node becomes a group
//! rotated about its center; text and images are clipped to their box.
//! Handles are drawn last so they sit above every element.

use std::fmt::Write;

use certcanvas_core::{Handle, TextAlign};

use super::{BackendType, RenderBackend};
use crate::tree::{Bounds, HandleMarker, ImageFit, NodeContent, RenderNode};
use crate::{RenderError, RenderResult, RenderTree};

/// Renders trees to SVG markup.
#[derive(Debug, Clone, Default)]
pub struct SvgBackend {
    output_size: Option<(u32, u32)>,
    svg: String,
}

impl SvgBackend {
    /// Create a backend sized to the zoomed canvas.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a fixed output size in pixels, overriding the zoomed canvas size.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::InvalidSize`] if either dimension is zero.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize { width, height });
        }
        self.output_size = Some((width, height));
        Ok(())
    }

    /// Take the rendered document.
    #[must_use]
    pub fn into_svg(self) -> String {
        self.svg
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn output_dimensions(&self, tree: &RenderTree) -> (u32, u32) {
        self.output_size.unwrap_or_else(|| {
            (
                (tree.width * tree.zoom).round().max(1.0) as u32,
                (tree.height * tree.zoom).round().max(1.0) as u32,
            )
        })
    }
}

impl RenderBackend for SvgBackend {
    fn backend_type(&self) -> BackendType {
        BackendType::Svg
    }

    fn render(&mut self, tree: &RenderTree) -> RenderResult<()> {
        if !(tree.width.is_finite() && tree.height.is_finite())
            || tree.width <= 0.0
            || tree.height <= 0.0
        {
            return Err(RenderError::Frame(format!(
                "canvas size {}x{} cannot be drawn",
                tree.width, tree.height
            )));
        }

        let (out_w, out_h) = self.output_dimensions(tree);
        let mut svg = String::with_capacity(4096);
        let _ = write!(
            svg,
            "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{out_w}\" height=\"{out_h}\" viewBox=\"0 0 {} {}\">",
            tree.width, tree.height,
        );

        svg.push_str("<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>");
        if let Some(background) = &tree.background {
            let _ = write!(
                svg,
                "<image x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" href=\"{}\" preserveAspectRatio=\"xMidYMid slice\"/>",
                tree.width,
                tree.height,
                escape_xml(background),
            );
        }
        if let Some(grid) = &tree.grid {
            let s = grid.spacing;
            let _ = write!(
                svg,
                "<defs><pattern id=\"grid\" width=\"{s}\" height=\"{s}\" patternUnits=\"userSpaceOnUse\"><path d=\"M {s} 0 L 0 0 0 {s}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\"/></pattern></defs><rect width=\"100%\" height=\"100%\" fill=\"url(#grid)\"/>",
                escape_xml(&grid.color),
            );
        }

        for (index, node) in tree.nodes.iter().enumerate() {
            render_node_svg(&mut svg, node, index, &tree.chrome.selection_color);
        }
        for marker in tree.nodes.iter().flat_map(|n| &n.handles) {
            render_handle_svg(
                &mut svg,
                marker,
                &tree.chrome.handle_fill,
                &tree.chrome.handle_stroke,
            );
        }

        svg.push_str("</svg>");
        tracing::debug!("SVG frame: {} nodes, {} bytes", tree.nodes.len(), svg.len());
        self.svg = svg;
        Ok(())
    }

    fn output(&self) -> &str {
        &self.svg
    }
}

fn render_node_svg(svg: &mut String, node: &RenderNode, index: usize, selection_color: &str) {
    let b = &node.bounds;
    let (cx, cy) = b.center();

    let _ = write!(svg, "<g data-id=\"{}\"", escape_xml(node.id.as_str()));
    if node.rotation.abs() > f64::EPSILON {
        let _ = write!(svg, " transform=\"rotate({} {cx} {cy})\"", node.rotation);
    }
    if node.opacity < 1.0 {
        let _ = write!(svg, " opacity=\"{}\"", node.opacity);
    }
    if !node.interactive {
        svg.push_str(" data-locked=\"true\"");
    }
    svg.push('>');

    render_content_svg(svg, node, index);

    if node.selected {
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"1\"/>",
            b.x,
            b.y,
            b.width,
            b.height,
            escape_xml(selection_color),
        );
    }

    svg.push_str("</g>");
}

fn render_content_svg(svg: &mut String, node: &RenderNode, index: usize) {
    let b = &node.bounds;
    let clip_id = format!("clip-{index}");
    let clip = |svg: &mut String| {
        let _ = write!(
            svg,
            "<clipPath id=\"{clip_id}\"><rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"/></clipPath>",
            b.x, b.y, b.width, b.height,
        );
    };

    match &node.content {
        NodeContent::Text {
            lines,
            font_size,
            font_family,
            font_weight,
            color,
            align,
        } => {
            clip(svg);
            let _ = write!(
                svg,
                "<text clip-path=\"url(#{clip_id})\" font-size=\"{font_size}\" font-family=\"{}\" font-weight=\"{}\" fill=\"{}\" text-anchor=\"{}\" dominant-baseline=\"middle\">",
                escape_xml(font_family),
                font_weight.as_str(),
                escape_xml(color),
                text_anchor(*align),
            );
            for line in lines {
                let _ = write!(
                    svg,
                    "<tspan x=\"{}\" y=\"{}\">{}</tspan>",
                    line.x,
                    line.y,
                    escape_xml(&line.text),
                );
            }
            svg.push_str("</text>");
        }

        NodeContent::Image { src, fit } => {
            clip(svg);
            render_image_svg(svg, b, src, *fit, &clip_id);
        }

        NodeContent::Rect {
            radius_x,
            radius_y,
            fill,
            stroke,
            stroke_width,
        } => {
            let _ = write!(
                svg,
                "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" rx=\"{radius_x}\" ry=\"{radius_y}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{stroke_width}\"/>",
                b.x,
                b.y,
                b.width,
                b.height,
                escape_xml(fill),
                escape_xml(stroke),
            );
        }

        NodeContent::Polygon {
            points,
            fill,
            stroke,
            stroke_width,
        } => {
            let points: Vec<String> = points.iter().map(|(x, y)| format!("{x},{y}")).collect();
            let _ = write!(
                svg,
                "<polygon points=\"{}\" fill=\"{}\" stroke=\"{}\" stroke-width=\"{stroke_width}\"/>",
                points.join(" "),
                escape_xml(fill),
                escape_xml(stroke),
            );
        }

        NodeContent::Line {
            x1,
            x2,
            y,
            stroke,
            stroke_width,
            dash,
        } => {
            let _ = write!(
                svg,
                "<line x1=\"{x1}\" y1=\"{y}\" x2=\"{x2}\" y2=\"{y}\" stroke=\"{}\" stroke-width=\"{stroke_width}\"",
                escape_xml(stroke),
            );
            if let Some((on, off)) = dash {
                let _ = write!(svg, " stroke-dasharray=\"{on} {off}\"");
            }
            svg.push_str("/>");
        }
    }
}

fn render_image_svg(svg: &mut String, b: &Bounds, src: &str, fit: ImageFit, clip_id: &str) {
    let href = escape_xml(src);
    match fit {
        ImageFit::Cover => {
            let _ = write!(
                svg,
                "<image clip-path=\"url(#{clip_id})\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" href=\"{href}\" preserveAspectRatio=\"xMidYMid slice\"/>",
                b.x, b.y, b.width, b.height,
            );
        }
        ImageFit::Crop {
            scale_x,
            scale_y,
            translate_x,
            translate_y,
        } => {
            let _ = write!(
                svg,
                "<g clip-path=\"url(#{clip_id})\"><image href=\"{href}\" transform=\"translate({} {}) scale({scale_x} {scale_y})\"/></g>",
                b.x + translate_x,
                b.y + translate_y,
            );
        }
    }
}

fn render_handle_svg(svg: &mut String, marker: &HandleMarker, fill: &str, stroke: &str) {
    let half = marker.size / 2.0;
    let fill = escape_xml(fill);
    let stroke = escape_xml(stroke);
    if marker.handle == Handle::Rotate {
        let _ = write!(
            svg,
            "<circle cx=\"{}\" cy=\"{}\" r=\"{half}\" fill=\"{fill}\" stroke=\"{stroke}\"/>",
            marker.x, marker.y,
        );
    } else {
        let _ = write!(
            svg,
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{fill}\" stroke=\"{stroke}\"/>",
            marker.x - half,
            marker.y - half,
            marker.size,
            marker.size,
        );
    }
}

const fn text_anchor(align: TextAlign) -> &'static str {
    match align {
        TextAlign::Left => "start",
        TextAlign::Center => "middle",
        TextAlign::Right => "end",
    }
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CanvasRenderer;
    use certcanvas_core::{ElementPatch, LineType, NewElement, SceneStore};

    fn render(store: &SceneStore) -> String {
        let tree = CanvasRenderer::default().render_store(store);
        let mut backend = SvgBackend::new();
        backend.render(&tree).expect("svg render");
        backend.into_svg()
    }

    #[test]
    fn test_svg_empty_scene() {
        let svg = render(&SceneStore::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("width=\"1200\""));
        assert!(svg.contains("viewBox=\"0 0 1200 900\""));
    }

    #[test]
    fn test_svg_zoom_scales_output() {
        let mut store = SceneStore::default();
        store.set_zoom(0.5);
        let svg = render(&store);
        assert!(svg.contains("width=\"600\" height=\"450\""));
        assert!(svg.contains("viewBox=\"0 0 1200 900\""));
    }

    #[test]
    fn test_svg_escapes_text() {
        let mut store = SceneStore::default();
        store.create_element(
            NewElement::Text,
            &ElementPatch {
                text: Some("Smith & <Sons>".to_string()),
                ..ElementPatch::default()
            },
        );
        let svg = render(&store);
        assert!(svg.contains("Smith &amp; &lt;Sons&gt;"));
        assert!(!svg.contains("<Sons>"));
    }

    #[test]
    fn test_svg_rotation_about_center() {
        let mut store = SceneStore::default();
        store.create_element(
            NewElement::Line,
            &ElementPatch {
                rotation: Some(90.0),
                ..ElementPatch::frame(0.0, 0.0, 100.0, 2.0)
            },
        );
        let svg = render(&store);
        assert!(svg.contains("transform=\"rotate(90 50 1)\""));
    }

    #[test]
    fn test_svg_dash_patterns() {
        let mut store = SceneStore::default();
        store.create_element(
            NewElement::Line,
            &ElementPatch {
                line_type: Some(LineType::Dashed),
                ..ElementPatch::default()
            },
        );
        let svg = render(&store);
        assert!(svg.contains("stroke-dasharray=\"10 5\""));
    }

    #[test]
    fn test_resize_rejects_zero() {
        let mut backend = SvgBackend::new();
        assert!(matches!(
            backend.resize(0, 10),
            Err(RenderError::InvalidSize { width: 0, height: 10 })
        ));
        backend.resize(300, 200).expect("resize");
        backend
            .render(&CanvasRenderer::default().render_store(&SceneStore::default()))
            .expect("render");
        assert!(backend.output().contains("width=\"300\" height=\"200\""));
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a\"b'c"), "a&quot;b&apos;c");
    }
}
