//! Template resolution and the built-in default tour.

use waymark_core::model::{AnchorPosition, TourStep, TourTemplate};
use waymark_core::ports::TemplateRegistry;

/// Scenario id of the built-in tour.
pub const DEFAULT_SCENARIO_ID: &str = "default";

/// Where a tour's template comes from.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    /// Use this template as-is.
    Explicit(TourTemplate),
    /// Look the scenario up in the registry, falling back to the default.
    Scenario(String),
    /// Use the built-in tour.
    Default,
}

/// Resolves `source` to exactly one template.
///
/// Deterministic for a given source and registry snapshot.
#[must_use]
pub fn resolve_template(source: TemplateSource, registry: &dyn TemplateRegistry) -> TourTemplate {
    match source {
        TemplateSource::Explicit(template) => template,
        TemplateSource::Scenario(scenario_id) => {
            registry.resolve(&scenario_id).unwrap_or_else(|| {
                tracing::debug!(
                    %scenario_id,
                    "no template registered for scenario, using default tour"
                );
                default_tour()
            })
        }
        TemplateSource::Default => default_tour(),
    }
}

/// The built-in tour of the community app.
#[must_use]
pub fn default_tour() -> TourTemplate {
    TourTemplate::new(
        DEFAULT_SCENARIO_ID,
        vec![
            TourStep::new(
                "welcome",
                "Welcome",
                "This short tour walks you through **daily devotionals**, prayer, study guides and your profile.",
                "/",
            )
            .anchored(AnchorPosition::Center),
            TourStep::new(
                "devotionals",
                "Daily devotionals",
                "A new devotional is published every morning. Open one to read the passage and its reflection.",
                "/devotionals",
            ),
            TourStep::new(
                "prayer-wall",
                "Prayer wall",
                "Share a prayer request or lift up someone else's. Requests can be posted *anonymously*.",
                "/prayers",
            )
            .anchored(AnchorPosition::Right),
            TourStep::new(
                "study-guides",
                "Study guides",
                "Work through a guide at your own pace. Progress is saved after every lesson.",
                "/study-guides",
            ),
            TourStep::new(
                "questions",
                "Ask a question",
                "Send a question to the pastoral team and browse answers to questions others have asked.",
                "/questions",
            )
            .anchored(AnchorPosition::Left),
            TourStep::new(
                "profile",
                "Your profile",
                "Manage notifications and restart this tour any time from your profile.",
                "/profile",
            )
            .anchored(AnchorPosition::Top),
            TourStep::new(
                "finish",
                "You're all set",
                "Finish the tour to receive your welcome certificate.",
                "/profile",
            )
            .anchored(AnchorPosition::Center),
        ],
    )
}
