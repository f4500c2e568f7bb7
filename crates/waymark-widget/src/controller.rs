//! Drag and minimize handling for the tour widget.

use serde::{Deserialize, Serialize};
use tracing::trace;
use waymark_core::geometry::{Point, Size};

use crate::clamp::{clamp_position, max_position};

/// Size of the expanded tour card.
pub const DEFAULT_WIDGET_SIZE: Size = Size::new(360.0, 220.0);

/// Gap kept between the docked widget and the viewport edges.
pub const DOCK_MARGIN: f64 = 24.0;

/// What the pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerTarget {
    /// The widget's draggable surface.
    Surface,
    /// A button, link or input inside the widget.
    Control,
}

/// Reference frame captured when a drag begins.
#[derive(Debug, Clone, Copy)]
struct DragFrame {
    pointer_origin: Point,
    widget_origin: Point,
}

/// Position, drag state and minimized flag of the tour widget.
#[derive(Debug, Clone)]
pub struct WidgetController {
    position: Point,
    widget: Size,
    viewport: Size,
    drag: Option<DragFrame>,
    minimized: bool,
}

impl WidgetController {
    /// Creates a widget docked to the bottom-right corner of `viewport`.
    #[must_use]
    pub fn docked(viewport: Size, widget: Size) -> Self {
        let max = max_position(viewport, widget);
        let position = Point::new((max.x - DOCK_MARGIN).max(0.0), (max.y - DOCK_MARGIN).max(0.0));
        Self {
            position,
            widget,
            viewport,
            drag: None,
            minimized: false,
        }
    }

    /// Starts a drag at `pointer`. Ignored when the pointer went down on an
    /// interactive control, so the control still receives its click.
    /// Returns `true` if a drag began.
    pub fn begin_drag(&mut self, pointer: Point, target: PointerTarget) -> bool {
        if target == PointerTarget::Control {
            return false;
        }
        self.drag = Some(DragFrame {
            pointer_origin: pointer,
            widget_origin: self.position,
        });
        true
    }

    /// Moves the widget with the pointer. Returns the new position, or `None`
    /// when no drag is in progress.
    pub fn update_drag(&mut self, pointer: Point) -> Option<Point> {
        let frame = self.drag?;
        self.position = clamp_position(
            frame.widget_origin,
            pointer - frame.pointer_origin,
            self.viewport,
            self.widget,
        );
        trace!(x = self.position.x, y = self.position.y, "widget dragged");
        Some(self.position)
    }

    /// Ends the drag; later pointer movement has no effect until the next
    /// `begin_drag`.
    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Flips the minimized flag and returns its new value.
    pub fn toggle_minimize(&mut self) -> bool {
        self.minimized = !self.minimized;
        self.minimized
    }

    /// Applies a new viewport size and pulls the widget back inside it.
    pub fn resize_viewport(&mut self, viewport: Size) -> Point {
        self.viewport = viewport;
        self.position = clamp_position(self.position, Point::default(), viewport, self.widget);
        if let Some(frame) = self.drag.as_mut() {
            frame.widget_origin = self.position;
        }
        self.position
    }

    /// Current top-left corner.
    #[must_use]
    pub fn position(&self) -> Point {
        self.position
    }

    /// Returns `true` while minimized.
    #[must_use]
    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    /// Returns `true` while a drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }
}
