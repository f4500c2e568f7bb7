//! Position clamping.

use waymark_core::geometry::{Point, Size};

/// Largest legal top-left corner for a widget of `widget` size inside
/// `viewport`. Never negative: a widget larger than the viewport pins to the
/// origin.
#[must_use]
pub fn max_position(viewport: Size, widget: Size) -> Point {
    Point::new(
        (viewport.width - widget.width).max(0.0),
        (viewport.height - widget.height).max(0.0),
    )
}

/// Moves `origin` by `delta` and keeps the result inside
/// `[0, vw − ww] × [0, vh − wh]`.
#[must_use]
pub fn clamp_position(origin: Point, delta: Point, viewport: Size, widget: Size) -> Point {
    let max = max_position(viewport, widget);
    let moved = origin + delta;
    Point::new(clamp_axis(moved.x, max.x), clamp_axis(moved.y, max.y))
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max)
}
