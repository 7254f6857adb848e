//! Render tree: the positioned, backend-neutral view of a scene.
//!
//! ```text
//! Scene ──render_order()──▶ visible elements ──layout──▶ RenderNode
//!                                                      │
//!   Text  ─▶ wrapped lines, anchor, vertical centering │
//!   Image ─▶ cover, or crop scale + translate          │
//!   Shape ─▶ rect (circle = 50% radius) or polygon     │
//!   Line  ─▶ horizontal stroke through the center      │
//! ```
//!
//! Coordinates are scene units. Rotation is applied by the backend about
//! the node's center, except for handle markers which are already rotated.

use certcanvas_core::{
    Element, ElementId, ElementKind, FontWeight, Handle, ImageContent, LineStyle, LineType,
    ShapeStyle, ShapeType, TextAlign, TextContent,
};
use serde::Serialize;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT: f64 = 1.2;

/// Dash pattern for dashed lines: `(dash, gap)`.
pub const DASHED_PATTERN: (f64, f64) = (10.0, 5.0);

/// Dash pattern for dotted lines: `(dash, gap)`.
pub const DOTTED_PATTERN: (f64, f64) = (2.0, 2.0);

/// Triangle vertices in a 100x100 box.
const TRIANGLE_POINTS: [(f64, f64); 3] = [(50.0, 10.0), (90.0, 90.0), (10.0, 90.0)];

/// Axis-aligned box before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Bounds {
    /// Center of the box.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Background grid overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grid {
    /// Cell size in scene units.
    pub spacing: f64,
    /// Stroke color.
    pub color: String,
}

/// A complete frame, ready for a backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderTree {
    /// Canvas width in scene units.
    pub width: f64,
    /// Canvas height in scene units.
    pub height: f64,
    /// Viewport zoom factor.
    pub zoom: f64,
    /// Background image URI.
    pub background: Option<String>,
    /// Optional grid overlay.
    pub grid: Option<Grid>,
    /// Visible elements, bottom to top.
    pub nodes: Vec<RenderNode>,
    /// Colors for selection chrome.
    pub chrome: Chrome,
}

impl RenderTree {
    /// Find the node for an element.
    #[must_use]
    pub fn node(&self, id: &ElementId) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// The selected node, if it is visible.
    #[must_use]
    pub fn selected(&self) -> Option<&RenderNode> {
        self.nodes.iter().find(|n| n.selected)
    }
}

/// Colors used for the selection outline and handles.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Chrome {
    /// Selection outline color.
    pub selection_color: String,
    /// Handle fill.
    pub handle_fill: String,
    /// Handle outline.
    pub handle_stroke: String,
}

/// One visible element.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderNode {
    /// Element the node was built from.
    pub id: ElementId,
    /// Unrotated box.
    pub bounds: Bounds,
    /// Clockwise rotation about the box center, in degrees.
    pub rotation: f64,
    /// Opacity in `[0, 1]`.
    pub opacity: f64,
    /// Stacking index.
    pub z_index: i64,
    /// Whether the element accepts drag and resize.
    pub interactive: bool,
    /// Whether the element is selected.
    pub selected: bool,
    /// Kind-specific drawing.
    pub content: NodeContent,
    /// Selection handles in scene coordinates; empty unless selected and unlocked.
    pub handles: Vec<HandleMarker>,
}

/// A selection handle affordance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HandleMarker {
    /// Which handle.
    pub handle: Handle,
    /// Center x in scene coordinates.
    pub x: f64,
    /// Center y in scene coordinates.
    pub y: f64,
    /// Side length.
    pub size: f64,
}

/// A laid-out line of text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextLine {
    /// Line content.
    pub text: String,
    /// Anchor x; meaning depends on the alignment.
    pub x: f64,
    /// Vertical middle of the line.
    pub y: f64,
}

/// How an image fills its box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "fit", rename_all = "camelCase")]
pub enum ImageFit {
    /// Scale to cover the box, centered.
    Cover,
    /// Map the crop rectangle exactly onto the box.
    #[serde(rename_all = "camelCase")]
    Crop {
        /// Horizontal scale, box width over crop width.
        scale_x: f64,
        /// Vertical scale, box height over crop height.
        scale_y: f64,
        /// Horizontal offset of the image origin from the box, scaled.
        translate_x: f64,
        /// Vertical offset of the image origin from the box, scaled.
        translate_y: f64,
    },
}

/// Kind-specific drawing instructions.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NodeContent {
    /// Wrapped, aligned text clipped to the box.
    #[serde(rename_all = "camelCase")]
    Text {
        /// Lines, top to bottom.
        lines: Vec<TextLine>,
        /// Font size.
        font_size: f64,
        /// CSS font family list.
        font_family: String,
        /// Font weight.
        font_weight: FontWeight,
        /// Fill color.
        color: String,
        /// Horizontal alignment.
        align: TextAlign,
    },
    /// An image clipped to the box.
    Image {
        /// Image URI.
        src: String,
        /// Fill mode.
        fit: ImageFit,
    },
    /// A rectangle with optional rounded corners.
    #[serde(rename_all = "camelCase")]
    Rect {
        /// Horizontal corner radius.
        radius_x: f64,
        /// Vertical corner radius.
        radius_y: f64,
        /// Fill color.
        fill: String,
        /// Stroke color.
        stroke: String,
        /// Stroke width.
        stroke_width: f64,
    },
    /// A closed polygon in scene coordinates.
    #[serde(rename_all = "camelCase")]
    Polygon {
        /// Vertices.
        points: Vec<(f64, f64)>,
        /// Fill color.
        fill: String,
        /// Stroke color.
        stroke: String,
        /// Stroke width.
        stroke_width: f64,
    },
    /// A horizontal stroke.
    #[serde(rename_all = "camelCase")]
    Line {
        /// Start x.
        x1: f64,
        /// End x.
        x2: f64,
        /// Shared y.
        y: f64,
        /// Stroke color.
        stroke: String,
        /// Stroke width.
        stroke_width: f64,
        /// Dash and gap lengths; `None` for a solid line.
        dash: Option<(f64, f64)>,
    },
}

/// Lay out an element's content inside its box.
#[must_use]
pub fn layout_content(element: &Element, glyph_width: f64) -> NodeContent {
    let bounds = bounds_of(element);
    match element.kind() {
        ElementKind::Text(text) => layout_text(text, &bounds, glyph_width),
        ElementKind::Image(image) => layout_image(image, &bounds),
        ElementKind::Shape(shape) => layout_shape(shape, &bounds),
        ElementKind::Line(line) => layout_line(line, &bounds),
    }
}

pub(crate) fn bounds_of(element: &Element) -> Bounds {
    Bounds {
        x: element.x,
        y: element.y,
        width: element.width,
        height: element.height,
    }
}

fn layout_text(text: &TextContent, bounds: &Bounds, glyph_width: f64) -> NodeContent {
    let max_chars = chars_per_line(bounds.width, text.font_size * glyph_width);
    let wrapped = wrap_text(&text.text, max_chars);

    let line_height = text.font_size * LINE_HEIGHT;
    #[allow(clippy::cast_precision_loss)]
    let block = line_height * wrapped.len() as f64;
    let top = bounds.y + (bounds.height - block) / 2.0;
    let x = match text.text_align {
        TextAlign::Left => bounds.x,
        TextAlign::Center => bounds.x + bounds.width / 2.0,
        TextAlign::Right => bounds.x + bounds.width,
    };

    let lines = wrapped
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            #[allow(clippy::cast_precision_loss)]
            let y = top + line_height * (i as f64 + 0.5);
            TextLine { text, x, y }
        })
        .collect();

    NodeContent::Text {
        lines,
        font_size: text.font_size,
        font_family: text.font_family.clone(),
        font_weight: text.font_weight,
        color: text.color.clone(),
        align: text.text_align,
    }
}

/// How many average glyphs fit across a box, at least one.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn chars_per_line(width: f64, glyph: f64) -> usize {
    let fit = (width / glyph).floor();
    if fit.is_finite() && fit >= 1.0 {
        fit as usize
    } else {
        1
    }
}

/// Greedy word wrap honouring explicit newlines.
///
/// Words longer than a line are broken across lines.
#[must_use]
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0usize;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > max_chars {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            if line_len > 0 && line_len + 1 + word.len() > max_chars {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line_len += word.len();
            line.extend(word);
        }

        lines.push(line);
    }

    lines
}

fn layout_image(image: &ImageContent, bounds: &Bounds) -> NodeContent {
    let fit = image.crop().map_or(ImageFit::Cover, |crop| {
        let scale_x = bounds.width / crop.width;
        let scale_y = bounds.height / crop.height;
        ImageFit::Crop {
            scale_x,
            scale_y,
            translate_x: -crop.x * scale_x,
            translate_y: -crop.y * scale_y,
        }
    });
    NodeContent::Image {
        src: image.src.clone(),
        fit,
    }
}

fn layout_shape(shape: &ShapeStyle, bounds: &Bounds) -> NodeContent {
    let fill = shape.fill_color.clone();
    let stroke = shape.stroke_color.clone();
    let stroke_width = shape.stroke_width;
    match shape.shape_type {
        ShapeType::Rectangle => NodeContent::Rect {
            radius_x: 0.0,
            radius_y: 0.0,
            fill,
            stroke,
            stroke_width,
        },
        ShapeType::Circle => NodeContent::Rect {
            radius_x: bounds.width / 2.0,
            radius_y: bounds.height / 2.0,
            fill,
            stroke,
            stroke_width,
        },
        ShapeType::Triangle => NodeContent::Polygon {
            points: TRIANGLE_POINTS
                .iter()
                .map(|&(px, py)| {
                    (
                        bounds.x + bounds.width * px / 100.0,
                        bounds.y + bounds.height * py / 100.0,
                    )
                })
                .collect(),
            fill,
            stroke,
            stroke_width,
        },
    }
}

fn layout_line(line: &LineStyle, bounds: &Bounds) -> NodeContent {
    let dash = match line.line_type {
        LineType::Solid => None,
        LineType::Dashed => Some(DASHED_PATTERN),
        LineType::Dotted => Some(DOTTED_PATTERN),
    };
    NodeContent::Line {
        x1: bounds.x,
        x2: bounds.x + bounds.width,
        y: bounds.y + bounds.height / 2.0,
        stroke: line.stroke_color.clone(),
        stroke_width: line.stroke_width,
        dash,
    }
}
