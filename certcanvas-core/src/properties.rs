//! Properties panel: a form over the selected element.
//!
//! Field edits arrive as raw input strings and are parsed leniently: a
//! number field that does not parse, or parses to zero where zero makes no
//! sense, falls back to a fixed value instead of rejecting the keystroke.
//! Under [`CommitPolicy::Immediate`] every edit is one history entry; under
//! [`CommitPolicy::OnCommit`] edits are drafts until [`PropertiesPanel::commit`].

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config::CommitPolicy;
use crate::element::normalize_rotation;
use crate::store::SceneStore;
use crate::{
    Element, ElementId, ElementKind, ElementPatch, ElementType, FontWeight, LineType, ShapeType,
    TextAlign,
};

/// Font family choices offered for text elements.
pub const FONT_FAMILIES: [&str; 8] = [
    "Arial, sans-serif",
    "Georgia, serif",
    "Times New Roman, serif",
    "Helvetica, sans-serif",
    "Verdana, sans-serif",
    "Courier New, monospace",
    "Impact, sans-serif",
    "Comic Sans MS, cursive",
];

/// Font weight choices offered for text elements.
pub const FONT_WEIGHTS: [FontWeight; 3] = [FontWeight::Normal, FontWeight::Bold, FontWeight::Lighter];

/// Smallest font size the form accepts.
pub const MIN_FONT_SIZE: f64 = 8.0;
/// Largest font size the form accepts.
pub const MAX_FONT_SIZE: f64 = 200.0;
/// Largest stroke width the form accepts.
pub const MAX_STROKE_WIDTH: f64 = 20.0;

/// An editable attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[allow(missing_docs)] // Variants mirror element attributes
pub enum PropertyField {
    X,
    Y,
    Width,
    Height,
    Rotation,
    Opacity,
    ZIndex,
    Visible,
    Locked,
    Text,
    FontFamily,
    FontSize,
    FontWeight,
    TextAlign,
    Color,
    Src,
    CropX,
    CropY,
    CropWidth,
    CropHeight,
    ShapeType,
    FillColor,
    StrokeColor,
    StrokeWidth,
    LineType,
}

impl PropertyField {
    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
            Self::Width => "Width",
            Self::Height => "Height",
            Self::Rotation => "Rotation (°)",
            Self::Opacity => "Opacity",
            Self::ZIndex => "Z-Index",
            Self::Visible => "Visible",
            Self::Locked => "Locked",
            Self::Text => "Content",
            Self::FontFamily => "Font",
            Self::FontSize => "Size",
            Self::FontWeight => "Weight",
            Self::TextAlign => "Alignment",
            Self::Color => "Color",
            Self::Src => "Source",
            Self::CropX => "Crop X",
            Self::CropY => "Crop Y",
            Self::CropWidth => "Crop width",
            Self::CropHeight => "Crop height",
            Self::ShapeType => "Shape",
            Self::FillColor => "Fill color",
            Self::StrokeColor => "Stroke color",
            Self::StrokeWidth => "Stroke width",
            Self::LineType => "Line style",
        }
    }

    /// Whether the field is meaningful for an element kind.
    #[must_use]
    pub const fn applies_to(self, kind: ElementType) -> bool {
        match self {
            Self::X
            | Self::Y
            | Self::Width
            | Self::Height
            | Self::Rotation
            | Self::Opacity
            | Self::ZIndex
            | Self::Visible
            | Self::Locked => true,
            Self::Text
            | Self::FontFamily
            | Self::FontSize
            | Self::FontWeight
            | Self::TextAlign
            | Self::Color => matches!(kind, ElementType::Text),
            Self::Src | Self::CropX | Self::CropY | Self::CropWidth | Self::CropHeight => {
                matches!(kind, ElementType::Image)
            }
            Self::ShapeType | Self::FillColor => matches!(kind, ElementType::Shape),
            Self::StrokeColor | Self::StrokeWidth => {
                matches!(kind, ElementType::Shape | ElementType::Line)
            }
            Self::LineType => matches!(kind, ElementType::Line),
        }
    }

    /// Input control for the field.
    #[must_use]
    pub fn input(self) -> InputKind {
        let number = |min: Option<f64>, max: Option<f64>, step: f64| InputKind::Number { min, max, step };
        match self {
            Self::X | Self::Y | Self::ZIndex => number(None, None, 1.0),
            Self::Width | Self::Height | Self::CropWidth | Self::CropHeight => number(Some(1.0), None, 1.0),
            Self::CropX | Self::CropY => number(Some(0.0), None, 1.0),
            Self::Rotation => number(Some(0.0), Some(360.0), 1.0),
            Self::Opacity => number(Some(0.0), Some(1.0), 0.1),
            Self::FontSize => number(Some(MIN_FONT_SIZE), Some(MAX_FONT_SIZE), 1.0),
            Self::StrokeWidth => number(Some(0.0), Some(MAX_STROKE_WIDTH), 1.0),
            Self::Visible | Self::Locked => InputKind::Toggle,
            Self::Text | Self::Src => InputKind::Text,
            Self::Color | Self::FillColor | Self::StrokeColor => InputKind::Color,
            Self::FontFamily => InputKind::Choice {
                options: FONT_FAMILIES.iter().map(ToString::to_string).collect(),
            },
            Self::FontWeight => InputKind::Choice {
                options: FONT_WEIGHTS.iter().map(ToString::to_string).collect(),
            },
            Self::TextAlign => choices(TextAlign::ALL),
            Self::ShapeType => choices(ShapeType::ALL),
            Self::LineType => choices(LineType::ALL),
        }
    }
}

fn choices<T: ToString>(all: &[T]) -> InputKind {
    InputKind::Choice {
        options: all.iter().map(ToString::to_string).collect(),
    }
}

/// Kind of form control.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum InputKind {
    /// Numeric input with optional bounds.
    Number {
        /// Lower bound.
        min: Option<f64>,
        /// Upper bound.
        max: Option<f64>,
        /// Spinner increment.
        step: f64,
    },
    /// Free text.
    Text,
    /// Color picker taking a hex string.
    Color,
    /// On/off switch taking `true` or `false`.
    Toggle,
    /// One of a fixed list of values.
    Choice {
        /// Accepted values.
        options: Vec<String>,
    },
}

/// One field of the form with its current value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    /// Which attribute.
    pub field: PropertyField,
    /// Display label.
    pub label: &'static str,
    /// Current value as shown in the input.
    pub value: String,
    /// Control kind.
    pub input: InputKind,
}

/// A titled group of fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormSection {
    /// Section heading.
    pub title: &'static str,
    /// Fields in display order.
    pub fields: Vec<FormField>,
}

/// What the panel shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PanelState {
    /// Nothing selected: placeholder.
    Empty,
    /// Form for the selected element.
    Editing {
        /// Selected element.
        id: ElementId,
        /// Its kind.
        element_type: ElementType,
        /// Form sections.
        sections: Vec<FormSection>,
    },
}

/// Controlled form over the selection of a [`SceneStore`].
#[derive(Debug)]
pub struct PropertiesPanel<'a> {
    store: &'a mut SceneStore,
}

impl<'a> PropertiesPanel<'a> {
    /// Attach the panel to a store.
    pub fn new(store: &'a mut SceneStore) -> Self {
        Self { store }
    }

    /// Describe the form for the current selection.
    #[must_use]
    pub fn form(&self) -> PanelState {
        let Some(element) = self.store.scene().selected_element() else {
            return PanelState::Empty;
        };
        let field = |field: PropertyField| FormField {
            field,
            label: field.label(),
            value: current_value(element, field),
            input: field.input(),
        };
        let section = |title: &'static str, fields: &[PropertyField]| FormSection {
            title,
            fields: fields.iter().copied().map(&field).collect(),
        };

        let mut sections = vec![
            section(
                "Position & size",
                &[PropertyField::X, PropertyField::Y, PropertyField::Width, PropertyField::Height],
            ),
            section("Transform", &[PropertyField::Rotation, PropertyField::Opacity]),
        ];
        let kind_section = match element.element_type() {
            ElementType::Text => section(
                "Text",
                &[
                    PropertyField::Text,
                    PropertyField::FontFamily,
                    PropertyField::FontSize,
                    PropertyField::FontWeight,
                    PropertyField::TextAlign,
                    PropertyField::Color,
                ],
            ),
            ElementType::Image => section(
                "Image",
                &[
                    PropertyField::Src,
                    PropertyField::CropX,
                    PropertyField::CropY,
                    PropertyField::CropWidth,
                    PropertyField::CropHeight,
                ],
            ),
            ElementType::Shape => section(
                "Shape",
                &[
                    PropertyField::ShapeType,
                    PropertyField::FillColor,
                    PropertyField::StrokeColor,
                    PropertyField::StrokeWidth,
                ],
            ),
            ElementType::Line => section(
                "Line",
                &[PropertyField::StrokeColor, PropertyField::StrokeWidth, PropertyField::LineType],
            ),
        };
        sections.push(kind_section);
        sections.push(section(
            "Layer",
            &[PropertyField::ZIndex, PropertyField::Visible, PropertyField::Locked],
        ));

        PanelState::Editing {
            id: element.id.clone(),
            element_type: element.element_type(),
            sections,
        }
    }

    /// Apply a raw input value to the selected element.
    ///
    /// Returns `false` when nothing is selected, the field does not belong
    /// to the element's kind, or the value is rejected outright.
    pub fn edit(&mut self, field: PropertyField, raw: &str) -> bool {
        let Some(element) = self.store.scene().selected_element() else {
            return false;
        };
        if !field.applies_to(element.element_type()) {
            trace!(?field, "field does not apply to selection");
            return false;
        }
        let id = element.id.clone();
        let Some(patch) = parse_field(field, raw) else {
            trace!(?field, raw, "rejected property input");
            return false;
        };

        match self.store.config().commit_policy {
            CommitPolicy::Immediate => {
                self.store.update_element(&id, &patch);
                true
            }
            CommitPolicy::OnCommit => self.store.preview_element(&id, &patch),
        }
    }

    /// Flip a boolean field of the selected element.
    pub fn toggle(&mut self, field: PropertyField) -> bool {
        let Some(element) = self.store.scene().selected_element() else {
            return false;
        };
        let value = match field {
            PropertyField::Visible => !element.visible,
            PropertyField::Locked => !element.locked,
            _ => return false,
        };
        self.edit(field, if value { "true" } else { "false" })
    }

    /// Finish pending edits (blur or Enter). Records one entry if they
    /// changed anything.
    pub fn commit(&mut self) -> bool {
        self.store.commit_draft()
    }

    /// Discard pending edits (Escape).
    pub fn cancel(&mut self) -> bool {
        self.store.revert_draft()
    }

    /// Duplicate the selected element.
    pub fn duplicate(&mut self) -> Option<ElementId> {
        let id = self.store.scene().selected_id()?.clone();
        self.store.duplicate_element(&id)
    }

    /// Delete the selected element.
    pub fn delete(&mut self) -> bool {
        let Some(id) = self.store.scene().selected_id().cloned() else {
            return false;
        };
        self.store.delete_element(&id);
        true
    }
}

fn current_value(element: &Element, field: PropertyField) -> String {
    let number = |v: f64| v.to_string();
    let optional = |v: Option<f64>| v.map(|v| v.to_string()).unwrap_or_default();
    match (field, element.kind()) {
        (PropertyField::X, _) => number(element.x),
        (PropertyField::Y, _) => number(element.y),
        (PropertyField::Width, _) => number(element.width),
        (PropertyField::Height, _) => number(element.height),
        (PropertyField::Rotation, _) => number(element.rotation),
        (PropertyField::Opacity, _) => number(element.opacity),
        (PropertyField::ZIndex, _) => element.z_index.to_string(),
        (PropertyField::Visible, _) => element.visible.to_string(),
        (PropertyField::Locked, _) => element.locked.to_string(),
        (PropertyField::Text, ElementKind::Text(t)) => t.text.clone(),
        (PropertyField::FontFamily, ElementKind::Text(t)) => t.font_family.clone(),
        (PropertyField::FontSize, ElementKind::Text(t)) => number(t.font_size),
        (PropertyField::FontWeight, ElementKind::Text(t)) => t.font_weight.to_string(),
        (PropertyField::TextAlign, ElementKind::Text(t)) => t.text_align.to_string(),
        (PropertyField::Color, ElementKind::Text(t)) => t.color.clone(),
        (PropertyField::Src, ElementKind::Image(i)) => i.src.clone(),
        (PropertyField::CropX, ElementKind::Image(i)) => optional(i.crop_x),
        (PropertyField::CropY, ElementKind::Image(i)) => optional(i.crop_y),
        (PropertyField::CropWidth, ElementKind::Image(i)) => optional(i.crop_width),
        (PropertyField::CropHeight, ElementKind::Image(i)) => optional(i.crop_height),
        (PropertyField::ShapeType, ElementKind::Shape(s)) => s.shape_type.to_string(),
        (PropertyField::FillColor, ElementKind::Shape(s)) => s.fill_color.clone(),
        (PropertyField::StrokeColor, ElementKind::Shape(s)) => s.stroke_color.clone(),
        (PropertyField::StrokeWidth, ElementKind::Shape(s)) => number(s.stroke_width),
        (PropertyField::StrokeColor, ElementKind::Line(l)) => l.stroke_color.clone(),
        (PropertyField::StrokeWidth, ElementKind::Line(l)) => number(l.stroke_width),
        (PropertyField::LineType, ElementKind::Line(l)) => l.line_type.to_string(),
        _ => String::new(),
    }
}

/// Leading-integer parse: optional sign then digits, anything after is
/// ignored. `"12.7px"` is 12, `"px"` is `None`.
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    let value: i64 = digits[..end].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Integer input where zero and garbage both mean `fallback`.
#[allow(clippy::cast_precision_loss)] // Form integers are far below 2^52
fn int_or(raw: &str, fallback: f64) -> f64 {
    match parse_leading_int(raw) {
        Some(0) | None => fallback,
        Some(v) => v as f64,
    }
}

fn parse_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_field(field: PropertyField, raw: &str) -> Option<ElementPatch> {
    let mut patch = ElementPatch::default();
    match field {
        PropertyField::X => patch.x = Some(int_or(raw, 0.0)),
        PropertyField::Y => patch.y = Some(int_or(raw, 0.0)),
        PropertyField::Width => patch.width = Some(int_or(raw, 1.0).max(1.0)),
        PropertyField::Height => patch.height = Some(int_or(raw, 1.0).max(1.0)),
        PropertyField::Rotation => {
            #[allow(clippy::cast_precision_loss)]
            let degrees = parse_leading_int(raw)? as f64;
            patch.rotation = Some(normalize_rotation(degrees));
        }
        PropertyField::Opacity => patch.opacity = Some(parse_float(raw)?.clamp(0.0, 1.0)),
        PropertyField::ZIndex => patch.z_index = Some(parse_leading_int(raw).unwrap_or(0)),
        PropertyField::Visible => patch.visible = Some(raw.trim().parse().ok()?),
        PropertyField::Locked => patch.locked = Some(raw.trim().parse().ok()?),
        PropertyField::Text => patch.text = Some(raw.to_string()),
        PropertyField::FontFamily => patch.font_family = Some(raw.trim().to_string()).filter(|f| !f.is_empty()),
        PropertyField::FontSize => {
            patch.font_size = Some(int_or(raw, 16.0).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE));
        }
        PropertyField::FontWeight => patch.font_weight = Some(raw.parse().ok()?),
        PropertyField::TextAlign => patch.text_align = Some(raw.parse().ok()?),
        PropertyField::Color => patch.color = Some(raw.trim().to_string()),
        PropertyField::Src => patch.src = Some(raw.trim().to_string()),
        PropertyField::CropX => patch.crop_x = Some(int_or(raw, 0.0).max(0.0)),
        PropertyField::CropY => patch.crop_y = Some(int_or(raw, 0.0).max(0.0)),
        PropertyField::CropWidth => patch.crop_width = Some(int_or(raw, 1.0).max(1.0)),
        PropertyField::CropHeight => patch.crop_height = Some(int_or(raw, 1.0).max(1.0)),
        PropertyField::ShapeType => patch.shape_type = Some(raw.parse().ok()?),
        PropertyField::FillColor => patch.fill_color = Some(raw.trim().to_string()),
        PropertyField::StrokeColor => patch.stroke_color = Some(raw.trim().to_string()),
        PropertyField::StrokeWidth => {
            patch.stroke_width = Some(int_or(raw, 0.0).clamp(0.0, MAX_STROKE_WIDTH));
        }
        PropertyField::LineType => patch.line_type = Some(raw.parse().ok()?),
    }
    (!patch.is_empty()).then_some(patch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EditorConfig, NewElement};

    fn store_with(new: NewElement) -> (SceneStore, ElementId) {
        let mut store = SceneStore::default();
        let id = store.create_element(new, &ElementPatch::default());
        (store, id)
    }

    fn get(store: &SceneStore, id: &ElementId) -> Element {
        store.scene().get(id).cloned().expect("element present")
    }

    #[test]
    fn test_empty_state() {
        let mut store = SceneStore::default();
        let panel = PropertiesPanel::new(&mut store);
        assert_eq!(panel.form(), PanelState::Empty);
    }

    #[test]
    fn test_form_sections_for_text() {
        let (mut store, id) = store_with(NewElement::Text);
        let panel = PropertiesPanel::new(&mut store);
        let PanelState::Editing {
            id: form_id,
            element_type,
            sections,
        } = panel.form()
        else {
            panic!("expected a form");
        };
        assert_eq!(form_id, id);
        assert_eq!(element_type, ElementType::Text);
        let titles: Vec<_> = sections.iter().map(|s| s.title).collect();
        assert_eq!(titles, vec!["Position & size", "Transform", "Text", "Layer"]);

        let font_size = sections[2]
            .fields
            .iter()
            .find(|f| f.field == PropertyField::FontSize)
            .expect("font size field");
        assert_eq!(font_size.value, "24");
        let InputKind::Choice { options } = &sections[2].fields[1].input else {
            panic!("font family should be a choice");
        };
        assert_eq!(options.len(), FONT_FAMILIES.len());
    }

    #[test]
    fn test_numeric_fallbacks() {
        let (mut store, id) = store_with(NewElement::Text);
        let mut panel = PropertiesPanel::new(&mut store);
        assert!(panel.edit(PropertyField::X, "abc"));
        assert!(panel.edit(PropertyField::Width, ""));
        assert!(panel.edit(PropertyField::Height, "-40"));
        assert!(panel.edit(PropertyField::FontSize, "0"));
        assert!(panel.edit(PropertyField::Y, "12.9px"));

        let element = get(&store, &id);
        assert!(element.x.abs() < f64::EPSILON);
        assert!((element.y - 12.0).abs() < f64::EPSILON);
        assert!((element.width - 1.0).abs() < f64::EPSILON);
        assert!((element.height - 1.0).abs() < f64::EPSILON);
        let ElementKind::Text(text) = element.kind() else {
            panic!("expected text");
        };
        assert!((text.font_size - 16.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rotation_wraps_and_opacity_clamps() {
        let (mut store, id) = store_with(NewElement::Line);
        let mut panel = PropertiesPanel::new(&mut store);
        assert!(panel.edit(PropertyField::Rotation, "450"));
        assert!(panel.edit(PropertyField::Opacity, "1.8"));
        assert!(!panel.edit(PropertyField::Opacity, "half"));
        let element = get(&store, &id);
        assert!((element.rotation - 90.0).abs() < f64::EPSILON);
        assert!((element.opacity - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_foreign_field_rejected() {
        let (mut store, _) = store_with(NewElement::Line);
        let len = store.history().len();
        let mut panel = PropertiesPanel::new(&mut store);
        assert!(!panel.edit(PropertyField::FontSize, "40"));
        assert!(!panel.edit(PropertyField::LineType, "wavy"));
        assert!(panel.edit(PropertyField::LineType, "dotted"));
        assert_eq!(store.history().len(), len + 1);
    }

    #[test]
    fn test_immediate_policy_records_every_edit() {
        let (mut store, _) = store_with(NewElement::Text);
        let mut panel = PropertiesPanel::new(&mut store);
        for raw in ["H", "He", "Hel"] {
            panel.edit(PropertyField::Text, raw);
        }
        assert_eq!(store.history().len(), 4);
    }

    #[test]
    fn test_on_commit_policy_coalesces() {
        let config = EditorConfig {
            commit_policy: CommitPolicy::OnCommit,
            ..EditorConfig::default()
        };
        let mut store = SceneStore::new(config);
        let id = store.create_element(NewElement::Text, &ElementPatch::default());
        let mut panel = PropertiesPanel::new(&mut store);
        for raw in ["H", "He", "Hel", "Hello"] {
            assert!(panel.edit(PropertyField::Text, raw));
        }
        assert!(panel.commit());
        assert_eq!(store.history().len(), 2);
        let ElementKind::Text(text) = get(&store, &id).kind().clone() else {
            panic!("expected text");
        };
        assert_eq!(text.text, "Hello");
    }

    #[test]
    fn test_on_commit_cancel_reverts() {
        let config = EditorConfig {
            commit_policy: CommitPolicy::OnCommit,
            ..EditorConfig::default()
        };
        let mut store = SceneStore::new(config);
        let id = store.create_element(NewElement::Line, &ElementPatch::default());
        let before = get(&store, &id);
        let mut panel = PropertiesPanel::new(&mut store);
        panel.edit(PropertyField::StrokeWidth, "9");
        assert!(panel.cancel());
        assert_eq!(get(&store, &id), before);
    }

    #[test]
    fn test_toggle_and_actions() {
        let (mut store, id) = store_with(NewElement::Shape(ShapeType::Triangle));
        let mut panel = PropertiesPanel::new(&mut store);
        assert!(panel.toggle(PropertyField::Locked));
        assert!(!panel.toggle(PropertyField::Width));
        let copy = panel.duplicate().expect("duplicate");
        assert!(panel.delete());
        assert!(store.scene().get(&copy).is_none());
        assert!(store.scene().get(&id).map(|e| e.locked).unwrap_or(false));
        assert!(store.scene().selected_id().is_none());
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("  42"), Some(42));
        assert_eq!(parse_leading_int("-7abc"), Some(-7));
        assert_eq!(parse_leading_int("3.9"), Some(3));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int("-"), None);
    }
}
