//! Selection handle geometry.
//!
//! A selected, unlocked element shows eight resize handles on its corners
//! and edge midpoints plus a rotation handle above the top edge. Handles
//! live in the element's unrotated frame and are rotated with it.

use serde::Serialize;

use crate::config::HandleConfig;
use crate::Element;

/// One of the nine selection handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Handle {
    /// Top-left corner.
    TopLeft,
    /// Top edge midpoint.
    Top,
    /// Top-right corner.
    TopRight,
    /// Right edge midpoint.
    Right,
    /// Bottom-right corner.
    BottomRight,
    /// Bottom edge midpoint.
    Bottom,
    /// Bottom-left corner.
    BottomLeft,
    /// Left edge midpoint.
    Left,
    /// Rotation knob above the top edge.
    Rotate,
}

impl Handle {
    /// Every handle, rotation knob first so it wins hit-testing.
    pub const ALL: [Self; 9] = [
        Self::Rotate,
        Self::TopLeft,
        Self::Top,
        Self::TopRight,
        Self::Right,
        Self::BottomRight,
        Self::Bottom,
        Self::BottomLeft,
        Self::Left,
    ];

    /// Whether dragging this handle moves the left edge.
    #[must_use]
    pub const fn moves_left(self) -> bool {
        matches!(self, Self::TopLeft | Self::Left | Self::BottomLeft)
    }

    /// Whether dragging this handle moves the right edge.
    #[must_use]
    pub const fn moves_right(self) -> bool {
        matches!(self, Self::TopRight | Self::Right | Self::BottomRight)
    }

    /// Whether dragging this handle moves the top edge.
    #[must_use]
    pub const fn moves_top(self) -> bool {
        matches!(self, Self::TopLeft | Self::Top | Self::TopRight)
    }

    /// Whether dragging this handle moves the bottom edge.
    #[must_use]
    pub const fn moves_bottom(self) -> bool {
        matches!(self, Self::BottomLeft | Self::Bottom | Self::BottomRight)
    }

    /// Handle center in the element's unrotated frame.
    #[must_use]
    pub fn local_position(self, element: &Element, config: &HandleConfig) -> (f64, f64) {
        let (left, top) = (element.x, element.y);
        let (right, bottom) = (element.x + element.width, element.y + element.height);
        let (mid_x, mid_y) = element.center();
        match self {
            Self::TopLeft => (left, top),
            Self::Top => (mid_x, top),
            Self::TopRight => (right, top),
            Self::Right => (right, mid_y),
            Self::BottomRight => (right, bottom),
            Self::Bottom => (mid_x, bottom),
            Self::BottomLeft => (left, bottom),
            Self::Left => (left, mid_y),
            Self::Rotate => (mid_x, top - config.rotation_offset),
        }
    }

    /// Handle center in scene coordinates.
    #[must_use]
    pub fn position(self, element: &Element, config: &HandleConfig) -> (f64, f64) {
        let (x, y) = self.local_position(element, config);
        element.to_scene(x, y)
    }
}

/// All handle centers of an element in scene coordinates.
#[must_use]
pub fn handle_positions(element: &Element, config: &HandleConfig) -> Vec<(Handle, f64, f64)> {
    Handle::ALL
        .iter()
        .map(|&handle| {
            let (x, y) = handle.position(element, config);
            (handle, x, y)
        })
        .collect()
}

/// The handle under a scene point, if any.
#[must_use]
pub fn handle_at(element: &Element, config: &HandleConfig, x: f64, y: f64) -> Option<Handle> {
    let (lx, ly) = element.to_local(x, y);
    let half = config.size / 2.0;
    Handle::ALL.into_iter().find(|handle| {
        let (hx, hy) = handle.local_position(element, config);
        (lx - hx).abs() <= half && (ly - hy).abs() <= half
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ElementKind, ShapeStyle};

    fn square() -> Element {
        Element::new(ElementKind::Shape(ShapeStyle::default()), 100.0, 100.0)
            .with_position(100.0, 100.0)
    }

    #[test]
    fn test_positions_unrotated() {
        let config = HandleConfig::default();
        let element = square();
        assert_eq!(Handle::TopLeft.position(&element, &config), (100.0, 100.0));
        assert_eq!(Handle::Right.position(&element, &config), (200.0, 150.0));
        assert_eq!(Handle::Rotate.position(&element, &config), (150.0, 76.0));
        assert_eq!(handle_positions(&element, &config).len(), 9);
    }

    #[test]
    fn test_positions_follow_rotation() {
        let config = HandleConfig::default();
        let mut element = square();
        element.rotation = 90.0;
        // Rotating 90 degrees clockwise carries the top midpoint to the right edge.
        let (x, y) = Handle::Top.position(&element, &config);
        assert!((x - 200.0).abs() < 1e-9);
        assert!((y - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_handle_at() {
        let config = HandleConfig::default();
        let element = square();
        assert_eq!(handle_at(&element, &config, 203.0, 198.0), Some(Handle::BottomRight));
        assert_eq!(handle_at(&element, &config, 150.0, 80.0), Some(Handle::Rotate));
        assert_eq!(handle_at(&element, &config, 150.0, 150.0), None);
    }

    #[test]
    fn test_edge_flags() {
        assert!(Handle::TopLeft.moves_left() && Handle::TopLeft.moves_top());
        assert!(!Handle::Top.moves_left() && !Handle::Top.moves_right());
        assert!(Handle::BottomRight.moves_right() && Handle::BottomRight.moves_bottom());
        assert!(!Handle::Rotate.moves_top());
    }
}
