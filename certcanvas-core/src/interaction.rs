//! Pointer input on the canvas: selection, drag, resize and rotate.
//!
//! Pointer coordinates arrive in viewport pixels and are divided by the
//! zoom factor before hit-testing. Every gesture previews its changes as a
//! store draft and records a single history entry on pointer-up.
//!
//! ```text
//!            pointer_down
//!   Idle ───────────────────> Dragging / Resizing / Rotating
//!    ^                                 │ pointer_move: preview
//!    └──── pointer_up: commit ─────────┤
//!    └──── pointer_cancel: revert or commit (per config)
//! ```

use serde::Serialize;
use tracing::{debug, trace};

use crate::config::DragCancelPolicy;
use crate::element::{normalize_rotation, MIN_ELEMENT_SIZE};
use crate::handles::{handle_at, Handle};
use crate::store::SceneStore;
use crate::{ElementId, ElementPatch};

/// The box an element had when a gesture began.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Frame {
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    rotation: f64,
}

/// Gesture in progress.
#[derive(Debug, Clone, PartialEq)]
enum Gesture {
    Idle,
    Dragging {
        id: ElementId,
        start: (f64, f64),
        origin: Frame,
    },
    Resizing {
        id: ElementId,
        handle: Handle,
        start: (f64, f64),
        origin: Frame,
    },
    Rotating {
        id: ElementId,
        center: (f64, f64),
    },
}

/// What a pointer-down did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "id", rename_all = "snake_case")]
pub enum PointerDown {
    /// Empty canvas: the selection was cleared.
    Cleared,
    /// An element was selected and a drag started.
    Dragging(ElementId),
    /// A resize handle of the selected element was grabbed.
    Resizing(ElementId),
    /// The rotation handle of the selected element was grabbed.
    Rotating(ElementId),
}

/// Pointer state machine for one canvas.
#[derive(Debug, Clone)]
pub struct CanvasInteraction {
    gesture: Gesture,
}

impl Default for CanvasInteraction {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasInteraction {
    /// Create an idle interaction.
    #[must_use]
    pub fn new() -> Self {
        Self {
            gesture: Gesture::Idle,
        }
    }

    /// Whether a gesture is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.gesture != Gesture::Idle
    }

    /// Element targeted by the gesture in progress.
    #[must_use]
    pub fn active_element(&self) -> Option<&ElementId> {
        match &self.gesture {
            Gesture::Idle => None,
            Gesture::Dragging { id, .. }
            | Gesture::Resizing { id, .. }
            | Gesture::Rotating { id, .. } => Some(id),
        }
    }

    /// Handle a pointer press at viewport coordinates.
    ///
    /// Handles of the selected element are checked first, then elements
    /// from the top of the stack down. Locked elements are not hit, so the
    /// press falls through to whatever lies beneath. A press on empty canvas
    /// clears the selection. A pending draft from another editor is
    /// committed before the new gesture starts.
    pub fn pointer_down(&mut self, store: &mut SceneStore, x: f64, y: f64) -> PointerDown {
        if self.is_active() {
            // A press without a release in between: the old gesture was lost.
            self.pointer_cancel(store);
        }
        store.commit_draft();
        let (sx, sy) = store.scene().to_scene_point(x, y);
        let handles = store.config().handles;

        let grabbed = store
            .scene()
            .selected_element()
            .filter(|e| e.visible && !e.locked)
            .and_then(|e| handle_at(e, &handles, sx, sy).map(|h| (e, h)));
        if let Some((element, handle)) = grabbed {
            let id = element.id.clone();
            let origin = frame_of(element);
            debug!(%id, ?handle, "handle grabbed");
            return if handle == Handle::Rotate {
                self.gesture = Gesture::Rotating {
                    id: id.clone(),
                    center: element.center(),
                };
                PointerDown::Rotating(id)
            } else {
                self.gesture = Gesture::Resizing {
                    id: id.clone(),
                    handle,
                    start: (sx, sy),
                    origin,
                };
                PointerDown::Resizing(id)
            };
        }

        let Some(hit) = store.scene().element_at(sx, sy) else {
            trace!(x = sx, y = sy, "press on empty canvas");
            store.set_selection(None);
            return PointerDown::Cleared;
        };
        let id = hit.id.clone();
        let origin = frame_of(hit);
        store.set_selection(Some(id.clone()));

        debug!(%id, "drag started");
        self.gesture = Gesture::Dragging {
            id: id.clone(),
            start: (sx, sy),
            origin,
        };
        PointerDown::Dragging(id)
    }

    /// Handle pointer motion at viewport coordinates.
    ///
    /// Returns whether the scene was updated.
    pub fn pointer_move(&mut self, store: &mut SceneStore, x: f64, y: f64) -> bool {
        let (sx, sy) = store.scene().to_scene_point(x, y);
        let (id, patch) = match &self.gesture {
            Gesture::Idle => return false,
            Gesture::Dragging { id, start, origin } => (
                id.clone(),
                ElementPatch::position(origin.x + sx - start.0, origin.y + sy - start.1),
            ),
            Gesture::Resizing {
                id,
                handle,
                start,
                origin,
            } => (id.clone(), resize(*handle, *origin, *start, (sx, sy))),
            Gesture::Rotating { id, center } => {
                let degrees = (sy - center.1).atan2(sx - center.0).to_degrees() + 90.0;
                (
                    id.clone(),
                    ElementPatch {
                        rotation: Some(normalize_rotation(degrees)),
                        ..ElementPatch::default()
                    },
                )
            }
        };

        if store.preview_element(&id, &patch) {
            true
        } else {
            trace!(%id, "gesture target vanished");
            self.gesture = Gesture::Idle;
            false
        }
    }

    /// Handle a pointer release: the gesture becomes one history entry.
    ///
    /// Returns whether an entry was recorded.
    pub fn pointer_up(&mut self, store: &mut SceneStore) -> bool {
        if std::mem::replace(&mut self.gesture, Gesture::Idle) == Gesture::Idle {
            return false;
        }
        store.commit_draft()
    }

    /// Handle a gesture that ended without a release, such as the pointer
    /// leaving the canvas. Follows the configured [`DragCancelPolicy`].
    ///
    /// Returns whether the scene changed.
    pub fn pointer_cancel(&mut self, store: &mut SceneStore) -> bool {
        if std::mem::replace(&mut self.gesture, Gesture::Idle) == Gesture::Idle {
            return false;
        }
        match store.config().drag_cancel {
            DragCancelPolicy::Revert => {
                debug!("gesture cancelled, reverting");
                store.revert_draft()
            }
            DragCancelPolicy::Commit => {
                debug!("gesture cancelled, committing");
                store.commit_draft()
            }
        }
    }
}

fn frame_of(element: &crate::Element) -> Frame {
    Frame {
        x: element.x,
        y: element.y,
        width: element.width,
        height: element.height,
        rotation: element.rotation,
    }
}

/// New frame for a resize, computed in the element's unrotated frame.
///
/// The edge opposite the grabbed handle stays put in local coordinates.
fn resize(handle: Handle, origin: Frame, start: (f64, f64), current: (f64, f64)) -> ElementPatch {
    let (sin, cos) = (-origin.rotation.to_radians()).sin_cos();
    let (dx, dy) = (current.0 - start.0, current.1 - start.1);
    let (local_dx, local_dy) = (dx * cos - dy * sin, dx * sin + dy * cos);

    let (mut x, mut width) = (origin.x, origin.width);
    if handle.moves_left() {
        width = (origin.width - local_dx).max(MIN_ELEMENT_SIZE);
        x = origin.x + origin.width - width;
    } else if handle.moves_right() {
        width = (origin.width + local_dx).max(MIN_ELEMENT_SIZE);
    }

    let (mut y, mut height) = (origin.y, origin.height);
    if handle.moves_top() {
        height = (origin.height - local_dy).max(MIN_ELEMENT_SIZE);
        y = origin.y + origin.height - height;
    } else if handle.moves_bottom() {
        height = (origin.height + local_dy).max(MIN_ELEMENT_SIZE);
    }

    ElementPatch::frame(x, y, width, height)
}
