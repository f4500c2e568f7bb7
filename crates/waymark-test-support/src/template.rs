//! Canned templates.

use waymark_core::model::{TourStep, TourTemplate};

/// A three-step template whose steps live on `/`, `/devotionals` and
/// `/prayers`, under scenario id `three-step`.
#[must_use]
pub fn three_step_template() -> TourTemplate {
    TourTemplate::new(
        "three-step",
        vec![
            TourStep::new("welcome", "Welcome", "Start here.", "/"),
            TourStep::new(
                "devotionals",
                "Devotionals",
                "Read **today's** devotional.",
                "/devotionals",
            ),
            TourStep::new("prayers", "Prayers", "Share a request.", "/prayers"),
        ],
    )
}
