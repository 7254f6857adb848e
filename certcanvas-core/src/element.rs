//! Canvas elements - the building blocks of certificate templates.
//!
//! An [`Element`] is an absolutely positioned box with a rotation, an opacity,
//! visibility and lock flags, a stacking index and kind-specific content.
//! The kind is fixed at creation; changing it means deleting the element and
//! creating a new one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest width or height an element may have, in scene units.
pub const MIN_ELEMENT_SIZE: f64 = 1.0;

/// Smallest font size a text element may have.
pub const MIN_TEXT_FONT_SIZE: f64 = 1.0;

/// Unique identifier for an element.
///
/// Ids are opaque strings so that documents produced elsewhere load
/// unchanged; freshly created elements get a random UUID-based id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(String);

impl ElementId {
    /// Create a new unique element ID.
    #[must_use]
    pub fn new() -> Self {
        Self(format!("element_{}", Uuid::new_v4().simple()))
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ElementId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Error returned when a style keyword is not recognised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant {
    /// Which enumeration was being parsed.
    pub expected: &'static str,
    /// The rejected input.
    pub found: String,
}

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {}: {:?}", self.expected, self.found)
    }
}

impl std::error::Error for UnknownVariant {}

/// Declares a lowercase keyword enum with string conversions.
macro_rules! keyword_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal,
        { $($(#[$vmeta:meta])* $variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in presentation order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The keyword used in documents and forms.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        expected: $label,
                        found: other.to_string(),
                    }),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

keyword_enum! {
    /// Font weight of a text element.
    FontWeight, "font weight", {
        /// Regular weight.
        #[default]
        Normal => "normal",
        /// Bold weight.
        Bold => "bold",
        /// Lighter than the inherited weight.
        Lighter => "lighter",
        /// Bolder than the inherited weight.
        Bolder => "bolder",
    }
}

keyword_enum! {
    /// Horizontal alignment of text within its box.
    TextAlign, "text alignment", {
        /// Flush left.
        Left => "left",
        /// Centered.
        #[default]
        Center => "center",
        /// Flush right.
        Right => "right",
    }
}

keyword_enum! {
    /// Geometry of a shape element.
    ShapeType, "shape type", {
        /// Axis-aligned box.
        #[default]
        Rectangle => "rectangle",
        /// Box with fully rounded corners.
        Circle => "circle",
        /// Triangle inscribed in the box.
        Triangle => "triangle",
    }
}

keyword_enum! {
    /// Dash pattern of a line element.
    LineType, "line type", {
        /// Continuous stroke.
        #[default]
        Solid => "solid",
        /// Long dashes.
        Dashed => "dashed",
        /// Short dashes.
        Dotted => "dotted",
    }
}

/// Text element content and typography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextContent {
    /// Text to display.
    pub text: String,
    /// Font size in scene units.
    pub font_size: f64,
    /// CSS-style font family list.
    pub font_family: String,
    /// Font weight.
    pub font_weight: FontWeight,
    /// Text color as hex.
    pub color: String,
    /// Horizontal alignment.
    pub text_align: TextAlign,
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            text: "New text".to_string(),
            font_size: 24.0,
            font_family: "Arial, sans-serif".to_string(),
            font_weight: FontWeight::Normal,
            color: "#000000".to_string(),
            text_align: TextAlign::Center,
        }
    }
}

/// A rectangle of the source image that should fill the element bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropRect {
    /// Left edge in source image pixels.
    pub x: f64,
    /// Top edge in source image pixels.
    pub y: f64,
    /// Width in source image pixels.
    pub width: f64,
    /// Height in source image pixels.
    pub height: f64,
}

/// Image element source and optional crop window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageContent {
    /// Image URI or data URI.
    pub src: String,
    /// Crop window left edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_x: Option<f64>,
    /// Crop window top edge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_y: Option<f64>,
    /// Crop window width.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_width: Option<f64>,
    /// Crop window height.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop_height: Option<f64>,
}

impl ImageContent {
    /// The crop window, if one with a usable size is set.
    ///
    /// A missing origin defaults to the image's top-left corner.
    #[must_use]
    pub fn crop(&self) -> Option<CropRect> {
        match (self.crop_width, self.crop_height) {
            (Some(width), Some(height)) if width > 0.0 && height > 0.0 => Some(CropRect {
                x: self.crop_x.unwrap_or(0.0),
                y: self.crop_y.unwrap_or(0.0),
                width,
                height,
            }),
            _ => None,
        }
    }
}

/// Shape element style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShapeStyle {
    /// Geometry.
    pub shape_type: ShapeType,
    /// Fill color as hex.
    pub fill_color: String,
    /// Outline color as hex.
    pub stroke_color: String,
    /// Outline width, zero for none.
    pub stroke_width: f64,
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self {
            shape_type: ShapeType::Rectangle,
            fill_color: "#3B82F6".to_string(),
            stroke_color: "#1E40AF".to_string(),
            stroke_width: 2.0,
        }
    }
}

/// Line element style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LineStyle {
    /// Stroke color as hex.
    pub stroke_color: String,
    /// Stroke width.
    pub stroke_width: f64,
    /// Dash pattern.
    pub line_type: LineType,
}

impl Default for LineStyle {
    fn default() -> Self {
        Self {
            stroke_color: "#000000".to_string(),
            stroke_width: 2.0,
            line_type: LineType::Solid,
        }
    }
}

/// The content an element carries, tagged by `type` in documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    /// A text label.
    Text(TextContent),
    /// A raster or vector image.
    Image(ImageContent),
    /// A filled and stroked shape.
    Shape(ShapeStyle),
    /// A horizontal rule.
    Line(LineStyle),
}

/// Kind of an element without its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    /// Text element.
    Text,
    /// Image element.
    Image,
    /// Shape element.
    Shape,
    /// Line element.
    Line,
}

impl ElementKind {
    /// The kind tag of this content.
    #[must_use]
    pub const fn element_type(&self) -> ElementType {
        match self {
            Self::Text(_) => ElementType::Text,
            Self::Image(_) => ElementType::Image,
            Self::Shape(_) => ElementType::Shape,
            Self::Line(_) => ElementType::Line,
        }
    }
}

/// What to create, as chosen from the toolbar.
#[derive(Debug, Clone, PartialEq)]
pub enum NewElement {
    /// A text element with the default caption.
    Text,
    /// An image element showing `src`.
    Image {
        /// Image URI or data URI.
        src: String,
    },
    /// A shape element.
    Shape(ShapeType),
    /// A horizontal line.
    Line,
}

impl NewElement {
    /// Toolbar tool names, in toolbar order.
    pub const TOOLS: [&'static str; 6] = ["text", "image", "rectangle", "circle", "triangle", "line"];

    /// Resolve a toolbar tool name. `image` takes its source from `src`,
    /// empty when absent.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownVariant`] for a name not in [`NewElement::TOOLS`].
    pub fn from_tool(tool: &str, src: Option<String>) -> Result<Self, UnknownVariant> {
        match tool.trim() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image {
                src: src.unwrap_or_default(),
            }),
            "line" => Ok(Self::Line),
            other => other.parse().map(Self::Shape).map_err(|_| UnknownVariant {
                expected: "tool",
                found: other.to_string(),
            }),
        }
    }

    /// Default `(width, height)` for the kind.
    #[must_use]
    pub const fn default_size(&self) -> (f64, f64) {
        match self {
            Self::Text => (300.0, 50.0),
            Self::Image { .. } => (200.0, 200.0),
            Self::Shape(_) => (150.0, 150.0),
            Self::Line => (200.0, 2.0),
        }
    }

    fn into_kind(self) -> ElementKind {
        match self {
            Self::Text => ElementKind::Text(TextContent::default()),
            Self::Image { src } => ElementKind::Image(ImageContent {
                src,
                ..ImageContent::default()
            }),
            Self::Shape(shape_type) => ElementKind::Shape(ShapeStyle {
                shape_type,
                ..ShapeStyle::default()
            }),
            Self::Line => ElementKind::Line(LineStyle::default()),
        }
    }
}

/// Where a new element lands: the canvas it is centered in and its stacking index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Canvas width in scene units.
    pub canvas_width: f64,
    /// Canvas height in scene units.
    pub canvas_height: f64,
    /// Stacking index of the new element.
    pub z_index: i64,
}

/// A canvas element with content and geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// Unique identifier.
    pub id: ElementId,
    /// Element content, fixed for the element's lifetime.
    #[serde(flatten)]
    kind: ElementKind,
    /// Left edge in scene units.
    pub x: f64,
    /// Top edge in scene units.
    pub y: f64,
    /// Width in scene units.
    pub width: f64,
    /// Height in scene units.
    pub height: f64,
    /// Clockwise rotation about the center, in degrees.
    #[serde(default)]
    pub rotation: f64,
    /// Opacity from 0.0 to 1.0.
    #[serde(default = "Element::default_opacity")]
    pub opacity: f64,
    /// Locked elements cannot be dragged, resized or rotated.
    #[serde(default)]
    pub locked: bool,
    /// Hidden elements are not rendered.
    #[serde(default = "Element::default_visible")]
    pub visible: bool,
    /// Stacking order; higher renders on top.
    #[serde(default)]
    pub z_index: i64,
}

impl Element {
    const fn default_opacity() -> f64 {
        1.0
    }

    const fn default_visible() -> bool {
        true
    }

    /// Create an element at the origin with the given content and size.
    #[must_use]
    pub fn new(kind: ElementKind, width: f64, height: f64) -> Self {
        Self {
            id: ElementId::new(),
            kind,
            x: 0.0,
            y: 0.0,
            width: width.max(MIN_ELEMENT_SIZE),
            height: height.max(MIN_ELEMENT_SIZE),
            rotation: 0.0,
            opacity: 1.0,
            locked: false,
            visible: true,
            z_index: 0,
        }
    }

    /// Create an element with kind defaults, centered on the canvas, then
    /// apply `overrides`.
    ///
    /// Explicit `x`/`y` overrides win over centering; centering uses the
    /// size after overrides.
    #[must_use]
    pub fn create(new: NewElement, placement: Placement, overrides: &ElementPatch) -> Self {
        let (width, height) = new.default_size();
        let mut element = Self::new(new.into_kind(), width, height);
        element.z_index = placement.z_index;
        element.apply(overrides);
        if overrides.x.is_none() {
            element.x = (placement.canvas_width - element.width) / 2.0;
        }
        if overrides.y.is_none() {
            element.y = (placement.canvas_height - element.height) / 2.0;
        }
        element
    }

    /// Set the position.
    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Set the stacking index.
    #[must_use]
    pub fn with_z_index(mut self, z_index: i64) -> Self {
        self.z_index = z_index;
        self
    }

    /// Element content.
    #[must_use]
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    /// Kind tag.
    #[must_use]
    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Center of the element box.
    #[must_use]
    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Map a scene point into the element's unrotated frame.
    #[must_use]
    pub fn to_local(&self, x: f64, y: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        let (sin, cos) = (-self.rotation.to_radians()).sin_cos();
        let (dx, dy) = (x - cx, y - cy);
        (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
    }

    /// Map a point in the element's unrotated frame back into the scene.
    #[must_use]
    pub fn to_scene(&self, x: f64, y: f64) -> (f64, f64) {
        let (cx, cy) = self.center();
        let (sin, cos) = self.rotation.to_radians().sin_cos();
        let (dx, dy) = (x - cx, y - cy);
        (cx + dx * cos - dy * sin, cy + dx * sin + dy * cos)
    }

    /// Check if a scene point lies within the rotated element box.
    #[must_use]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        let (lx, ly) = self.to_local(x, y);
        lx >= self.x && lx <= self.x + self.width && ly >= self.y && ly <= self.y + self.height
    }

    /// Clone under a new id, shifted by `offset` on both axes.
    #[must_use]
    pub fn duplicate(&self, offset: f64, z_index: i64) -> Self {
        Self {
            id: ElementId::new(),
            x: self.x + offset,
            y: self.y + offset,
            z_index,
            ..self.clone()
        }
    }

    /// Merge the set fields of `patch` into this element.
    ///
    /// Fields that do not belong to this element's kind are ignored, as are
    /// non-finite numbers. Sizes are clamped to [`MIN_ELEMENT_SIZE`], font
    /// size to [`MIN_TEXT_FONT_SIZE`], opacity to `0.0..=1.0` and rotation is
    /// wrapped into `0.0..360.0`. Returns whether any field changed.
    pub fn apply(&mut self, patch: &ElementPatch) -> bool {
        let before = self.clone();

        set(&mut self.x, finite(patch.x));
        set(&mut self.y, finite(patch.y));
        set(&mut self.width, finite(patch.width).map(|w| w.max(MIN_ELEMENT_SIZE)));
        set(&mut self.height, finite(patch.height).map(|h| h.max(MIN_ELEMENT_SIZE)));
        set(&mut self.rotation, finite(patch.rotation).map(normalize_rotation));
        set(&mut self.opacity, finite(patch.opacity).map(|o| o.clamp(0.0, 1.0)));
        set(&mut self.locked, patch.locked);
        set(&mut self.visible, patch.visible);
        set(&mut self.z_index, patch.z_index);

        match &mut self.kind {
            ElementKind::Text(text) => {
                set(&mut text.text, patch.text.clone());
                set(
                    &mut text.font_size,
                    finite(patch.font_size).map(|f| f.max(MIN_TEXT_FONT_SIZE)),
                );
                set(&mut text.font_family, patch.font_family.clone());
                set(&mut text.font_weight, patch.font_weight);
                set(&mut text.color, patch.color.clone());
                set(&mut text.text_align, patch.text_align);
            }
            ElementKind::Image(image) => {
                set(&mut image.src, patch.src.clone());
                for (field, value) in [
                    (&mut image.crop_x, patch.crop_x),
                    (&mut image.crop_y, patch.crop_y),
                    (&mut image.crop_width, patch.crop_width),
                    (&mut image.crop_height, patch.crop_height),
                ] {
                    if let Some(value) = finite(value) {
                        *field = Some(value);
                    }
                }
            }
            ElementKind::Shape(shape) => {
                set(&mut shape.shape_type, patch.shape_type);
                set(&mut shape.fill_color, patch.fill_color.clone());
                set(&mut shape.stroke_color, patch.stroke_color.clone());
                set(&mut shape.stroke_width, finite(patch.stroke_width).map(|w| w.max(0.0)));
            }
            ElementKind::Line(line) => {
                set(&mut line.stroke_color, patch.stroke_color.clone());
                set(&mut line.stroke_width, finite(patch.stroke_width).map(|w| w.max(0.0)));
                set(&mut line.line_type, patch.line_type);
            }
        }

        *self != before
    }
}

/// Wrap an angle in degrees into `0.0..360.0`.
#[must_use]
pub fn normalize_rotation(degrees: f64) -> f64 {
    let wrapped = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn set<T>(field: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *field = value;
    }
}

/// A partial update to an element; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)] // Field names mirror the element attributes they replace
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub opacity: Option<f64>,
    pub locked: Option<bool>,
    pub visible: Option<bool>,
    pub z_index: Option<i64>,

    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub font_weight: Option<FontWeight>,
    pub color: Option<String>,
    pub text_align: Option<TextAlign>,

    pub src: Option<String>,
    pub crop_x: Option<f64>,
    pub crop_y: Option<f64>,
    pub crop_width: Option<f64>,
    pub crop_height: Option<f64>,

    pub shape_type: Option<ShapeType>,
    pub fill_color: Option<String>,
    pub stroke_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub line_type: Option<LineType>,
}

impl ElementPatch {
    /// Patch that moves an element.
    #[must_use]
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    /// Patch that moves and resizes an element.
    #[must_use]
    pub fn frame(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Patch that changes the stacking index.
    #[must_use]
    pub fn z_index(z_index: i64) -> Self {
        Self {
            z_index: Some(z_index),
            ..Self::default()
        }
    }

    /// Check whether the patch sets nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn placement() -> Placement {
        Placement {
            canvas_width: 1200.0,
            canvas_height: 900.0,
            z_index: 3,
        }
    }

    #[test]
    fn test_text_defaults() {
        let element = Element::create(NewElement::Text, placement(), &ElementPatch::default());
        let ElementKind::Text(text) = element.kind() else {
            panic!("expected text, got {:?}", element.kind());
        };
        assert_eq!(text.text, "New text");
        assert!((text.font_size - 24.0).abs() < f64::EPSILON);
        assert_eq!(text.font_family, "Arial, sans-serif");
        assert_eq!(text.font_weight, FontWeight::Normal);
        assert_eq!(text.color, "#000000");
        assert_eq!(text.text_align, TextAlign::Center);
        assert!((element.width - 300.0).abs() < f64::EPSILON);
        assert!((element.height - 50.0).abs() < f64::EPSILON);
        assert_eq!(element.z_index, 3);
        assert!(element.visible);
        assert!(!element.locked);
        assert!((element.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_create_centers_in_canvas() {
        let element = Element::create(
            NewElement::Shape(ShapeType::Circle),
            placement(),
            &ElementPatch::default(),
        );
        assert!((element.x - 525.0).abs() < f64::EPSILON);
        assert!((element.y - 375.0).abs() < f64::EPSILON);
        assert_eq!(
            element.kind(),
            &ElementKind::Shape(ShapeStyle {
                shape_type: ShapeType::Circle,
                ..ShapeStyle::default()
            })
        );
    }

    #[test]
    fn test_create_applies_overrides() {
        let overrides = ElementPatch {
            text: Some("Certificate of Merit".to_string()),
            x: Some(10.0),
            width: Some(500.0),
            ..ElementPatch::default()
        };
        let element = Element::create(NewElement::Text, placement(), &overrides);
        assert!((element.x - 10.0).abs() < f64::EPSILON);
        assert!((element.width - 500.0).abs() < f64::EPSILON);
        assert!((element.y - 425.0).abs() < f64::EPSILON);
        let ElementKind::Text(text) = element.kind() else {
            panic!("expected text");
        };
        assert_eq!(text.text, "Certificate of Merit");
    }

    #[test]
    fn test_line_and_image_defaults() {
        let line = Element::create(NewElement::Line, placement(), &ElementPatch::default());
        assert!((line.height - 2.0).abs() < f64::EPSILON);
        assert_eq!(line.kind(), &ElementKind::Line(LineStyle::default()));

        let image = Element::create(
            NewElement::Image {
                src: "ipfs://logo".to_string(),
            },
            placement(),
            &ElementPatch::default(),
        );
        assert!((image.width - 200.0).abs() < f64::EPSILON);
        let ElementKind::Image(content) = image.kind() else {
            panic!("expected image");
        };
        assert_eq!(content.src, "ipfs://logo");
        assert!(content.crop().is_none());
    }

    #[test]
    fn test_apply_ignores_foreign_fields() {
        let mut line = Element::create(NewElement::Line, placement(), &ElementPatch::default());
        let before = line.clone();
        let changed = line.apply(&ElementPatch {
            font_size: Some(40.0),
            fill_color: Some("#FF0000".to_string()),
            ..ElementPatch::default()
        });
        assert!(!changed);
        assert_eq!(line, before);
    }

    #[test]
    fn test_apply_clamps_size_and_opacity() {
        let mut element = Element::create(NewElement::Text, placement(), &ElementPatch::default());
        element.apply(&ElementPatch {
            width: Some(-5.0),
            height: Some(0.0),
            opacity: Some(1.7),
            ..ElementPatch::default()
        });
        assert!((element.width - MIN_ELEMENT_SIZE).abs() < f64::EPSILON);
        assert!((element.height - MIN_ELEMENT_SIZE).abs() < f64::EPSILON);
        assert!((element.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_ignores_non_finite_numbers() {
        let mut text = Element::create(NewElement::Text, placement(), &ElementPatch::default());
        let before = text.clone();
        let changed = text.apply(&ElementPatch {
            x: Some(f64::NAN),
            y: Some(f64::INFINITY),
            width: Some(f64::NAN),
            height: Some(f64::NEG_INFINITY),
            rotation: Some(f64::NAN),
            opacity: Some(f64::NAN),
            font_size: Some(f64::INFINITY),
            ..ElementPatch::default()
        });
        assert!(!changed);
        assert_eq!(text, before);

        let mut image = Element::new(ElementKind::Image(ImageContent::default()), 100.0, 100.0);
        let changed = image.apply(&ElementPatch {
            crop_x: Some(f64::NAN),
            crop_y: Some(5.0),
            crop_width: Some(f64::INFINITY),
            ..ElementPatch::default()
        });
        assert!(changed);
        let ElementKind::Image(content) = image.kind() else {
            panic!("expected image");
        };
        assert_eq!(content.crop_x, None);
        assert_eq!(content.crop_y, Some(5.0));
        assert_eq!(content.crop_width, None);

        let mut shape = Element::create(
            NewElement::Shape(ShapeType::Rectangle),
            placement(),
            &ElementPatch::default(),
        );
        let before = shape.clone();
        assert!(!shape.apply(&ElementPatch {
            stroke_width: Some(f64::NAN),
            ..ElementPatch::default()
        }));
        assert_eq!(shape, before);
    }

    #[test]
    fn test_apply_wraps_rotation_and_floors_font_size() {
        let mut element = Element::create(NewElement::Text, placement(), &ElementPatch::default());
        element.apply(&ElementPatch {
            rotation: Some(-90.0),
            font_size: Some(-12.0),
            ..ElementPatch::default()
        });
        assert!((element.rotation - 270.0).abs() < f64::EPSILON);
        let ElementKind::Text(text) = element.kind() else {
            panic!("expected text");
        };
        assert!((text.font_size - MIN_TEXT_FONT_SIZE).abs() < f64::EPSILON);

        element.apply(&ElementPatch {
            rotation: Some(725.0),
            ..ElementPatch::default()
        });
        assert!((element.rotation - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_offsets_and_renames() {
        let original = Element::create(NewElement::Text, placement(), &ElementPatch::default())
            .with_position(100.0, 100.0);
        let copy = original.duplicate(20.0, 7);
        assert_ne!(copy.id, original.id);
        assert!((copy.x - 120.0).abs() < f64::EPSILON);
        assert!((copy.y - 120.0).abs() < f64::EPSILON);
        assert_eq!(copy.z_index, 7);
        assert_eq!(copy.kind(), original.kind());
    }

    #[test]
    fn test_contains_point_respects_rotation() {
        let mut element = Element::new(ElementKind::Line(LineStyle::default()), 200.0, 2.0)
            .with_position(0.0, 99.0);
        // Horizontal: the far right end is inside, a point above the center is not.
        assert!(element.contains_point(199.0, 100.0));
        assert!(!element.contains_point(100.0, 50.0));

        element.rotation = 90.0;
        // Vertical now: the point above the center is inside, the right end is not.
        assert!(element.contains_point(100.0, 50.0));
        assert!(!element.contains_point(199.0, 100.0));
    }

    #[test]
    fn test_to_scene_inverts_to_local() {
        let mut element = Element::new(ElementKind::Shape(ShapeStyle::default()), 80.0, 40.0)
            .with_position(10.0, 20.0);
        element.rotation = 33.0;
        let (lx, ly) = element.to_local(75.0, 12.0);
        let (x, y) = element.to_scene(lx, ly);
        assert!((x - 75.0).abs() < 1e-9);
        assert!((y - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_normalize_rotation() {
        assert!((normalize_rotation(370.0) - 10.0).abs() < 1e-9);
        assert!((normalize_rotation(-90.0) - 270.0).abs() < 1e-9);
        assert!(normalize_rotation(360.0).abs() < 1e-9);
        assert!((normalize_rotation(45.0) - 45.0).abs() < 1e-9);
    }

    #[test]
    fn test_crop_requires_size() {
        let mut image = ImageContent {
            src: "data:image/png;base64,AAAA".to_string(),
            crop_x: Some(10.0),
            ..ImageContent::default()
        };
        assert!(image.crop().is_none());
        image.crop_width = Some(50.0);
        image.crop_height = Some(25.0);
        assert_eq!(
            image.crop(),
            Some(CropRect {
                x: 10.0,
                y: 0.0,
                width: 50.0,
                height: 25.0
            })
        );
    }

    #[test]
    fn test_element_json_shape() {
        let element = Element::create(NewElement::Text, placement(), &ElementPatch::default());
        let value = serde_json::to_value(&element).expect("serialize");
        assert_eq!(value["type"], "text");
        assert_eq!(value["fontSize"], 24.0);
        assert_eq!(value["textAlign"], "center");
        assert_eq!(value["zIndex"], 3);
        assert!(value.get("kind").is_none());

        let back: Element = serde_json::from_value(value).expect("deserialize");
        assert_eq!(back, element);
    }

    #[test]
    fn test_from_tool() {
        assert_eq!(NewElement::from_tool("text", None), Ok(NewElement::Text));
        assert_eq!(
            NewElement::from_tool("triangle", None),
            Ok(NewElement::Shape(ShapeType::Triangle))
        );
        assert_eq!(
            NewElement::from_tool("image", Some("ipfs://x".to_string())),
            Ok(NewElement::Image {
                src: "ipfs://x".to_string()
            })
        );
        assert!(NewElement::from_tool("star", None).is_err());
        for tool in NewElement::TOOLS {
            assert!(NewElement::from_tool(tool, None).is_ok());
        }
    }

    #[test]
    fn test_keyword_parsing() {
        assert_eq!("dashed".parse::<LineType>(), Ok(LineType::Dashed));
        assert_eq!(" bold ".parse::<FontWeight>(), Ok(FontWeight::Bold));
        assert!("hexagon".parse::<ShapeType>().is_err());
        assert_eq!(TextAlign::ALL.len(), 3);
        assert_eq!(TextAlign::default(), TextAlign::Center);
    }
}
