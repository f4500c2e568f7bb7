//! Waymark — Tour Widget.
//!
//! Geometry of the floating tour card: drag gestures, viewport clamping and
//! the minimized flag. Nothing here knows about steps.

pub mod clamp;
pub mod controller;

pub use clamp::{clamp_position, max_position};
pub use controller::{PointerTarget, WidgetController, DEFAULT_WIDGET_SIZE, DOCK_MARGIN};
