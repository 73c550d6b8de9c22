//! Pointer interaction state for dragging elements around the canvas.
//!
//! ```text
//!            PointerDown (on element, not on controls)
//!   ┌──────┐ ─────────────────────────────────────────► ┌──────────┐
//!   │ Idle │                                            │ Dragging │ ◄─┐
//!   └──────┘ ◄───────────────────────────────────────── └──────────┘ ──┘
//!                    PointerUp / PointerLeave               PointerMove
//! ```

use serde::{Deserialize, Serialize};

use super::ElementId;

/// A point in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Current drag state of a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum Interaction {
    #[default]
    Idle,
    Dragging {
        element: ElementId,
        /// Pointer position minus element position at grab time.
        offset: Point,
    },
}

impl Interaction {
    pub fn is_dragging(&self) -> bool {
        matches!(self, Interaction::Dragging { .. })
    }
}

/// A decoded pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PointerEvent {
    Down {
        element: ElementId,
        at: Point,
        /// The press landed on the element's control buttons.
        #[serde(default, rename = "onControls")]
        on_controls: bool,
    },
    Move {
        at: Point,
    },
    Up,
    Leave,
}

/// What a pointer event did.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerOutcome {
    Ignored,
    DragStarted { element: ElementId },
    Moved { element: ElementId, x: f64, y: f64 },
    DragEnded { element: ElementId },
}

/// Keep-out margin at the right and bottom canvas edges, in pixels.
pub const DRAG_MARGIN: f64 = 50.0;

/// Element position for a pointer at `at`, clamped so the element's origin
/// stays within `[0, bound - DRAG_MARGIN]` on each axis.
pub fn drag_target(at: Point, offset: Point, width: f64, height: f64) -> Point {
    let clamp = |v: f64, bound: f64| v.min(bound - DRAG_MARGIN).max(0.0);
    Point::new(clamp(at.x - offset.x, width), clamp(at.y - offset.y, height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_target_inside() {
        let p = drag_target(Point::new(100.0, 120.0), Point::new(10.0, 5.0), 420.0, 594.0);
        assert_eq!(p, Point::new(90.0, 115.0));
    }

    #[test]
    fn test_drag_target_clamps() {
        let offset = Point::new(0.0, 0.0);
        assert_eq!(
            drag_target(Point::new(-40.0, -1.0), offset, 420.0, 594.0),
            Point::new(0.0, 0.0)
        );
        assert_eq!(
            drag_target(Point::new(1000.0, 1000.0), offset, 420.0, 594.0),
            Point::new(370.0, 544.0)
        );
    }

    #[test]
    fn test_tiny_canvas_pins_to_origin() {
        let p = drag_target(Point::new(30.0, 30.0), Point::default(), 40.0, 40.0);
        assert_eq!(p, Point::new(0.0, 0.0));
    }

    #[test]
    fn test_pointer_event_json() {
        let ev: PointerEvent = serde_json::from_str(
            r#"{"kind": "down", "element": 7, "at": {"x": 1, "y": 2}, "onControls": true}"#,
        )
        .unwrap();
        assert_eq!(
            ev,
            PointerEvent::Down {
                element: ElementId(7),
                at: Point::new(1.0, 2.0),
                on_controls: true
            }
        );
        let ev: PointerEvent = serde_json::from_str(r#"{"kind": "leave"}"#).unwrap();
        assert_eq!(ev, PointerEvent::Leave);
    }

    #[test]
    fn test_interaction_json() {
        let dragging = Interaction::Dragging {
            element: ElementId(3),
            offset: Point::new(1.0, 2.0),
        };
        assert_eq!(
            serde_json::to_value(dragging).unwrap(),
            serde_json::json!({"state": "dragging", "element": 3, "offset": {"x": 1.0, "y": 2.0}})
        );
        assert_eq!(
            serde_json::to_value(Interaction::Idle).unwrap(),
            serde_json::json!({"state": "idle"})
        );
    }
}
