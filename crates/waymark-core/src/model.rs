//! Tour model: steps, templates and the identifiers they carry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TourError;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw string.
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Returns the raw string.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_owned())
            }
        }
    };
}

string_id!(
    /// Unique identifier of a step within a template.
    StepId
);
string_id!(
    /// Scenario identifier; doubles as the template identity.
    TemplateId
);
string_id!(
    /// Route or address the host surface can navigate to.
    Location
);
string_id!(
    /// Voice requested from the narration synthesizer.
    VoiceId
);

/// Where the tour card prefers to sit relative to its highlighted target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorPosition {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
    Center,
}

/// One unit of guided-tour content bound to a target location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourStep {
    /// Step identifier, unique within its template.
    pub id: StepId,
    /// Heading shown on the tour card.
    pub title: String,
    /// Body text. Inline Markdown is allowed.
    pub description: String,
    /// Location the host must show while this step is active.
    pub target_location: Location,
    /// Preferred card placement.
    #[serde(default)]
    pub preferred_anchor: AnchorPosition,
    /// Text read aloud instead of the title and description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narration: Option<String>,
}

impl TourStep {
    /// Creates a step with the default anchor and no narration override.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        target_location: impl Into<String>,
    ) -> Self {
        Self {
            id: StepId::new(id),
            title: title.into(),
            description: description.into(),
            target_location: Location::new(target_location),
            preferred_anchor: AnchorPosition::default(),
            narration: None,
        }
    }

    /// Sets the preferred anchor.
    #[must_use]
    pub fn anchored(mut self, anchor: AnchorPosition) -> Self {
        self.preferred_anchor = anchor;
        self
    }
}

/// A named, ordered sequence of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TourTemplate {
    /// Scenario this template serves.
    pub scenario_id: TemplateId,
    /// Steps in presentation order.
    pub ordered_steps: Vec<TourStep>,
}

impl TourTemplate {
    /// Creates a template. Validation happens when the template is loaded
    /// into a registry or started, not here.
    #[must_use]
    pub fn new(scenario_id: impl Into<String>, ordered_steps: Vec<TourStep>) -> Self {
        Self {
            scenario_id: TemplateId::new(scenario_id),
            ordered_steps,
        }
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ordered_steps.len()
    }

    /// Returns `true` if the template has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ordered_steps.is_empty()
    }

    /// Index of the terminal step, `None` for an empty template.
    #[must_use]
    pub fn terminal_index(&self) -> Option<usize> {
        self.ordered_steps.len().checked_sub(1)
    }

    /// Returns the step at `index`.
    #[must_use]
    pub fn step(&self, index: usize) -> Option<&TourStep> {
        self.ordered_steps.get(index)
    }

    /// Checks the structural invariants: at least one step and unique step
    /// ids.
    ///
    /// # Errors
    ///
    /// Returns `TourError::TemplateEmpty` for an empty template and
    /// `TourError::InvalidTemplate` for duplicate step ids.
    pub fn validate(&self) -> Result<(), TourError> {
        if self.ordered_steps.is_empty() {
            return Err(TourError::TemplateEmpty(self.scenario_id.to_string()));
        }
        let mut seen = std::collections::HashSet::new();
        for step in &self.ordered_steps {
            if !seen.insert(&step.id) {
                return Err(TourError::InvalidTemplate(format!(
                    "template `{}` repeats step id `{}`",
                    self.scenario_id, step.id
                )));
            }
        }
        Ok(())
    }
}
