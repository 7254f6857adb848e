//! Validation for template documents coming from outside the editor.
//!
//! Documents produced by the store's own mutations are valid by
//! construction. Anything read from storage or handed over by another
//! program goes through [`validate_document`] before it reaches a scene.

use std::collections::HashSet;

use thiserror::Error;

use crate::element::{ElementKind, MIN_ELEMENT_SIZE};
use crate::schema::TemplateDocument;
use crate::Element;

/// Maximum elements per template.
pub const MAX_ELEMENTS_PER_TEMPLATE: usize = 10_000;
/// Maximum text content length in elements.
pub const MAX_TEXT_CONTENT_LEN: usize = 1_048_576; // 1MB
/// Maximum length for element IDs.
pub const MAX_ELEMENT_ID_LEN: usize = 128;

/// Validation error types.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Canvas width or height is not a positive finite number.
    #[error("canvas size must be positive, got {width}x{height}")]
    InvalidCanvasSize {
        /// Declared width.
        width: f64,
        /// Declared height.
        height: f64,
    },
    /// Too many elements in the document.
    #[error("too many elements (max {MAX_ELEMENTS_PER_TEMPLATE})")]
    TooManyElements,
    /// Element ID is empty or exceeds maximum length.
    #[error("element id must be 1-{MAX_ELEMENT_ID_LEN} chars: {0:?}")]
    InvalidElementId(String),
    /// Two elements share an ID.
    #[error("duplicate element id: {0}")]
    DuplicateElementId(String),
    /// Element width or height is below the minimum.
    #[error("element {0} is smaller than {MIN_ELEMENT_SIZE}x{MIN_ELEMENT_SIZE}")]
    ElementTooSmall(String),
    /// Opacity outside `0.0..=1.0`.
    #[error("element {0} has opacity outside 0..1")]
    OpacityOutOfRange(String),
    /// A geometry or style number is NaN or infinite.
    #[error("element {id} has a non-finite {field}")]
    NonFinite {
        /// Offending element.
        id: String,
        /// Offending attribute.
        field: &'static str,
    },
    /// Text content exceeds maximum length.
    #[error("text content too long (max {MAX_TEXT_CONTENT_LEN} bytes)")]
    TextContentTooLong,
}

/// Validate canvas dimensions.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidCanvasSize`] unless both dimensions
/// are finite and greater than zero.
pub fn validate_canvas_size(width: f64, height: f64) -> Result<(), ValidationError> {
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::InvalidCanvasSize { width, height })
    }
}

/// Validate a single element's geometry and content.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found for this element.
pub fn validate_element(element: &Element) -> Result<(), ValidationError> {
    let id = element.id.as_str();
    if id.is_empty() || id.len() > MAX_ELEMENT_ID_LEN {
        return Err(ValidationError::InvalidElementId(id.to_string()));
    }

    let numbers = [
        ("x", element.x),
        ("y", element.y),
        ("width", element.width),
        ("height", element.height),
        ("rotation", element.rotation),
        ("opacity", element.opacity),
    ];
    for (field, value) in numbers {
        if !value.is_finite() {
            return Err(ValidationError::NonFinite {
                id: id.to_string(),
                field,
            });
        }
    }

    if element.width < MIN_ELEMENT_SIZE || element.height < MIN_ELEMENT_SIZE {
        return Err(ValidationError::ElementTooSmall(id.to_string()));
    }
    if !(0.0..=1.0).contains(&element.opacity) {
        return Err(ValidationError::OpacityOutOfRange(id.to_string()));
    }

    match element.kind() {
        ElementKind::Text(text) => {
            if text.text.len() > MAX_TEXT_CONTENT_LEN {
                return Err(ValidationError::TextContentTooLong);
            }
            if !text.font_size.is_finite() {
                return Err(ValidationError::NonFinite {
                    id: id.to_string(),
                    field: "fontSize",
                });
            }
        }
        ElementKind::Shape(shape) if !shape.stroke_width.is_finite() => {
            return Err(ValidationError::NonFinite {
                id: id.to_string(),
                field: "strokeWidth",
            });
        }
        ElementKind::Line(line) if !line.stroke_width.is_finite() => {
            return Err(ValidationError::NonFinite {
                id: id.to_string(),
                field: "strokeWidth",
            });
        }
        _ => {}
    }
    Ok(())
}

/// Validate a whole template document.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found: canvas size, element
/// count, then per-element checks and ID uniqueness in document order.
pub fn validate_document(document: &TemplateDocument) -> Result<(), ValidationError> {
    validate_canvas_size(document.canvas_width, document.canvas_height)?;
    if document.elements.len() > MAX_ELEMENTS_PER_TEMPLATE {
        return Err(ValidationError::TooManyElements);
    }

    let mut seen = HashSet::with_capacity(document.elements.len());
    for element in &document.elements {
        validate_element(element)?;
        if !seen.insert(element.id.as_str()) {
            return Err(ValidationError::DuplicateElementId(element.id.to_string()));
        }
    }
    Ok(())
}
