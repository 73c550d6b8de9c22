//! # Visual Canvas
//!
//! The visual builder's model: an ordered list of [`CanvasElement`]s on an
//! A4 page measured in canvas pixels (2 px per mm), the selected element,
//! and an explicit [`Interaction`] state for dragging.
//!
//! Every mutation regenerates the canvas's jsPDF source, so [`Canvas::code`]
//! is always current.
//!
//! ```
//! use pickslip::canvas::{Canvas, Point, PointerEvent};
//!
//! let mut canvas = Canvas::new();
//! let id = canvas.add("text")?;
//! canvas.pointer(PointerEvent::Down { element: id, at: Point::new(25.0, 35.0), on_controls: false });
//! canvas.pointer(PointerEvent::Move { at: Point::new(105.0, 75.0) });
//! canvas.pointer(PointerEvent::Up);
//!
//! let el = canvas.element(id).unwrap();
//! assert_eq!((el.x, el.y), (100.0, 70.0));
//! assert!(canvas.code().contains("doc.text(data.text"));
//! # Ok::<(), pickslip::PickslipError>(())
//! ```

mod interaction;
mod types;

pub use interaction::*;
pub use types::*;

use std::collections::HashSet;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::PickslipError;
use crate::generate::{self, CodegenOptions};

/// Default canvas width in pixels (A4 width at 2 px/mm).
pub const CANVAS_WIDTH: f64 = 420.0;

/// Default canvas height in pixels (A4 height at 2 px/mm).
pub const CANVAS_HEIGHT: f64 = 594.0;

/// Canvas pixels to PDF millimeters.
pub const PX_TO_MM: f64 = 0.5;

/// Numeric element identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

impl ElementId {
    /// Last three characters of the decimal form.
    pub fn suffix(self) -> String {
        let digits = self.0.to_string();
        digits[digits.len().saturating_sub(3)..].to_string()
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Suffixes only stay unique while fewer elements exist than 3-digit suffixes.
const SUFFIX_SPACE: usize = 1000;

/// Reject element lists where two elements share an id or a three-digit
/// suffix. Generated variable names are built from the suffix.
pub fn check_unique_ids(elements: &[CanvasElement]) -> Result<(), PickslipError> {
    let mut ids = HashSet::new();
    let mut suffixes = HashSet::new();
    for element in elements {
        if !ids.insert(element.id) {
            return Err(PickslipError::InvalidInput(format!(
                "duplicate element id {}",
                element.id
            )));
        }
        let suffix = element.id.suffix();
        if !suffixes.insert(suffix.clone()) {
            return Err(PickslipError::InvalidInput(format!(
                "element id {} reuses suffix {}",
                element.id, suffix
            )));
        }
    }
    Ok(())
}

/// The visual builder state.
#[derive(Debug, Clone, Serialize)]
pub struct Canvas {
    elements: Vec<CanvasElement>,
    selected: Option<ElementId>,
    width: f64,
    height: f64,
    interaction: Interaction,
    #[serde(skip)]
    options: CodegenOptions,
    #[serde(skip)]
    code: String,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::with_size(CANVAS_WIDTH, CANVAS_HEIGHT)
    }

    pub fn with_size(width: f64, height: f64) -> Self {
        let mut canvas = Self {
            elements: Vec::new(),
            selected: None,
            width,
            height,
            interaction: Interaction::Idle,
            options: CodegenOptions::default(),
            code: String::new(),
        };
        canvas.regenerate();
        canvas
    }

    /// Elements in paint order.
    pub fn elements(&self) -> &[CanvasElement] {
        &self.elements
    }

    pub fn element(&self, id: ElementId) -> Option<&CanvasElement> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn selected(&self) -> Option<ElementId> {
        self.selected
    }

    pub fn interaction(&self) -> Interaction {
        self.interaction
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Generated source for the current elements.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn set_options(&mut self, options: CodegenOptions) {
        self.options = options;
        self.regenerate();
    }

    /// Add an element with editor defaults and select it.
    pub fn add(&mut self, type_name: &str) -> Result<ElementId, PickslipError> {
        let id = self.allocate_id();
        let element = default_element(type_name, id).ok_or_else(|| {
            PickslipError::InvalidInput(format!("unknown element type: {}", type_name))
        })?;
        self.elements.push(element);
        self.selected = Some(id);
        self.regenerate();
        Ok(id)
    }

    /// Remove an element. Selection is cleared.
    pub fn remove(&mut self, id: ElementId) -> Result<CanvasElement, PickslipError> {
        let index = self.index_of(id)?;
        let removed = self.elements.remove(index);
        self.selected = None;
        if matches!(self.interaction, Interaction::Dragging { element, .. } if element == id) {
            self.interaction = Interaction::Idle;
        }
        self.regenerate();
        Ok(removed)
    }

    /// Select an element, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<ElementId>) -> Result<(), PickslipError> {
        if let Some(id) = id {
            self.index_of(id)?;
        }
        self.selected = id;
        Ok(())
    }

    /// Apply a typed partial update to an element.
    pub fn update(
        &mut self,
        id: ElementId,
        patch: &ElementPatch,
    ) -> Result<&CanvasElement, PickslipError> {
        let index = self.index_of(id)?;
        patch.apply(&mut self.elements[index])?;
        self.regenerate();
        Ok(&self.elements[index])
    }

    /// Feed one pointer event through the drag state machine.
    pub fn pointer(&mut self, event: PointerEvent) -> PointerOutcome {
        match (self.interaction, event) {
            (
                _,
                PointerEvent::Down {
                    element,
                    at,
                    on_controls: false,
                },
            ) => {
                let Some(target) = self.element(element) else {
                    return PointerOutcome::Ignored;
                };
                let offset = Point::new(at.x - target.x, at.y - target.y);
                self.selected = Some(element);
                self.interaction = Interaction::Dragging { element, offset };
                PointerOutcome::DragStarted { element }
            }
            (Interaction::Dragging { element, offset }, PointerEvent::Move { at }) => {
                let to = drag_target(at, offset, self.width, self.height);
                // The dragged element may have been removed through the API
                if self.update(element, &ElementPatch::position(to.x, to.y)).is_err() {
                    self.interaction = Interaction::Idle;
                    return PointerOutcome::Ignored;
                }
                PointerOutcome::Moved {
                    element,
                    x: to.x,
                    y: to.y,
                }
            }
            (Interaction::Dragging { element, .. }, PointerEvent::Up | PointerEvent::Leave) => {
                self.interaction = Interaction::Idle;
                PointerOutcome::DragEnded { element }
            }
            _ => PointerOutcome::Ignored,
        }
    }

    fn index_of(&self, id: ElementId) -> Result<usize, PickslipError> {
        self.elements
            .iter()
            .position(|e| e.id == id)
            .ok_or(PickslipError::UnknownElement(id))
    }

    /// Time-based id, unique on this canvas, with a suffix no other element
    /// uses while the suffix space lasts.
    fn allocate_id(&self) -> ElementId {
        let mut rng = rand::rng();
        let base = chrono::Utc::now().timestamp_millis().max(0) as u64 * 1000;
        let check_suffix = self.elements.len() < SUFFIX_SPACE;
        loop {
            let id = ElementId(base + rng.random_range(0..1000u64));
            let taken = self.elements.iter().any(|e| {
                e.id == id || (check_suffix && e.id.suffix() == id.suffix())
            });
            if !taken {
                return id;
            }
        }
    }

    fn regenerate(&mut self) {
        self.code = generate::visual_code(&self.elements, &self.options);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn down(element: ElementId, x: f64, y: f64) -> PointerEvent {
        PointerEvent::Down {
            element,
            at: Point::new(x, y),
            on_controls: false,
        }
    }

    fn moved(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move { at: Point::new(x, y) }
    }

    #[test]
    fn test_suffix() {
        assert_eq!(ElementId(1_700_000_000_123_456).suffix(), "456");
        assert_eq!(ElementId(1_700_000_000_123_007).suffix(), "007");
        assert_eq!(ElementId(42).suffix(), "42");
    }

    #[test]
    fn test_check_unique_ids() {
        let ids = |ids: &[u64]| -> Vec<CanvasElement> {
            ids.iter()
                .map(|&id| default_element("table", ElementId(id)).unwrap())
                .collect()
        };
        assert!(check_unique_ids(&ids(&[1_000_123, 1_000_456])).is_ok());
        assert!(check_unique_ids(&[]).is_ok());

        let err = check_unique_ids(&ids(&[7, 7])).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: duplicate element id 7");

        let err = check_unique_ids(&ids(&[1_000_123, 2_000_123])).unwrap_err();
        assert!(matches!(err, PickslipError::InvalidInput(_)));
        assert!(err.to_string().contains("reuses suffix 123"));
    }

    #[test]
    fn test_set_options_regenerates() {
        let mut canvas = Canvas::new();
        canvas.add("text").unwrap();
        canvas.set_options(CodegenOptions {
            function_name: Some("makeLabel".into()),
            include_imports: false,
            ..Default::default()
        });
        assert!(canvas.code().starts_with("export async function makeLabel(data = {}) {"));
    }

    #[test]
    fn test_empty_canvas_code_is_placeholder() {
        let canvas = Canvas::new();
        assert_eq!(canvas.code(), generate::EMPTY_CANVAS_CODE);
        assert_eq!(canvas.size(), (420.0, 594.0));
    }

    #[test]
    fn test_add_selects_and_regenerates() {
        let mut canvas = Canvas::new();
        let id = canvas.add("barcode").unwrap();
        assert_eq!(canvas.selected(), Some(id));
        assert_eq!(canvas.elements().len(), 1);
        assert!(canvas.code().contains("import JsBarcode from 'jsbarcode';"));
        assert!(canvas.code().contains(&format!("data.barcodeData{}", id.suffix())));
    }

    #[test]
    fn test_add_unknown_type() {
        let mut canvas = Canvas::new();
        assert!(matches!(
            canvas.add("sticker"),
            Err(PickslipError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_ids_and_suffixes_unique() {
        let mut canvas = Canvas::new();
        for _ in 0..50 {
            canvas.add("text").unwrap();
        }
        let mut suffixes: Vec<_> = canvas.elements().iter().map(|e| e.id.suffix()).collect();
        suffixes.sort();
        suffixes.dedup();
        assert_eq!(suffixes.len(), 50);
    }

    #[test]
    fn test_remove_clears_selection() {
        let mut canvas = Canvas::new();
        let a = canvas.add("text").unwrap();
        let b = canvas.add("qrcode").unwrap();
        canvas.select(Some(a)).unwrap();
        let removed = canvas.remove(b).unwrap();
        assert_eq!(removed.id, b);
        assert_eq!(canvas.selected(), None);
        assert!(!canvas.code().contains("QRCode"));
        assert!(matches!(
            canvas.remove(b),
            Err(PickslipError::UnknownElement(id)) if id == b
        ));
    }

    #[test]
    fn test_select_unknown_fails() {
        let mut canvas = Canvas::new();
        assert!(canvas.select(Some(ElementId(9))).is_err());
        assert!(canvas.select(None).is_ok());
    }

    #[test]
    fn test_update_regenerates() {
        let mut canvas = Canvas::new();
        let id = canvas.add("text").unwrap();
        canvas
            .update(
                id,
                &ElementPatch {
                    content: Some("Ship to".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(canvas.code().contains("|| 'Ship to', 10, 15);"));
    }

    #[test]
    fn test_drag_moves_with_offset() {
        let mut canvas = Canvas::new();
        let id = canvas.add("text").unwrap(); // at (20, 30)

        assert_eq!(canvas.pointer(down(id, 25.0, 40.0)), PointerOutcome::DragStarted { element: id });
        assert_eq!(
            canvas.interaction(),
            Interaction::Dragging {
                element: id,
                offset: Point::new(5.0, 10.0)
            }
        );

        assert_eq!(
            canvas.pointer(moved(105.0, 210.0)),
            PointerOutcome::Moved {
                element: id,
                x: 100.0,
                y: 200.0
            }
        );
        assert!(canvas.code().contains(", 50, 100);"));

        assert_eq!(canvas.pointer(PointerEvent::Up), PointerOutcome::DragEnded { element: id });
        assert_eq!(canvas.interaction(), Interaction::Idle);
    }

    #[test]
    fn test_drag_clamps_to_bounds() {
        let mut canvas = Canvas::new();
        let id = canvas.add("image").unwrap();
        canvas.pointer(down(id, 20.0, 100.0));

        canvas.pointer(moved(5000.0, 5000.0));
        let el = canvas.element(id).unwrap();
        assert_eq!((el.x, el.y), (370.0, 544.0));

        canvas.pointer(moved(-5000.0, -5000.0));
        let el = canvas.element(id).unwrap();
        assert_eq!((el.x, el.y), (0.0, 0.0));
    }

    #[test]
    fn test_move_while_idle_ignored() {
        let mut canvas = Canvas::new();
        let id = canvas.add("text").unwrap();
        assert_eq!(canvas.pointer(moved(200.0, 200.0)), PointerOutcome::Ignored);
        assert_eq!(canvas.element(id).unwrap().x, 20.0);
        assert_eq!(canvas.pointer(PointerEvent::Leave), PointerOutcome::Ignored);
    }

    #[test]
    fn test_down_on_controls_ignored() {
        let mut canvas = Canvas::new();
        let id = canvas.add("text").unwrap();
        canvas.select(None).unwrap();
        let outcome = canvas.pointer(PointerEvent::Down {
            element: id,
            at: Point::new(20.0, 30.0),
            on_controls: true,
        });
        assert_eq!(outcome, PointerOutcome::Ignored);
        assert_eq!(canvas.selected(), None);
        assert!(!canvas.interaction().is_dragging());
    }

    #[test]
    fn test_down_on_unknown_element_ignored() {
        let mut canvas = Canvas::new();
        assert_eq!(canvas.pointer(down(ElementId(1), 0.0, 0.0)), PointerOutcome::Ignored);
    }

    #[test]
    fn test_leave_ends_drag() {
        let mut canvas = Canvas::new();
        let id = canvas.add("text").unwrap();
        canvas.pointer(down(id, 20.0, 30.0));
        assert_eq!(canvas.pointer(PointerEvent::Leave), PointerOutcome::DragEnded { element: id });
        assert_eq!(canvas.pointer(moved(100.0, 100.0)), PointerOutcome::Ignored);
    }

    #[test]
    fn test_removing_dragged_element_ends_drag() {
        let mut canvas = Canvas::new();
        let id = canvas.add("text").unwrap();
        canvas.pointer(down(id, 20.0, 30.0));
        canvas.remove(id).unwrap();
        assert_eq!(canvas.interaction(), Interaction::Idle);
    }

    #[test]
    fn test_serialized_view() {
        let mut canvas = Canvas::new();
        canvas.add("table").unwrap();
        let json = serde_json::to_value(&canvas).unwrap();
        assert_eq!(json["width"], 420.0);
        assert_eq!(json["interaction"]["state"], "idle");
        assert_eq!(json["elements"][0]["type"], "table");
        assert!(json.get("code").is_none());
    }
}
