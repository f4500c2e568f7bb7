//! Names of the persisted per-identity tour flags.

use std::fmt;

use crate::model::TemplateId;

/// Key prefix for completed-template flags.
const TEMPLATE_COMPLETED_PREFIX: &str = "tour.completed.";

/// A boolean flag persisted through the `FlagStore`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FlagName {
    /// The user has seen (finished, skipped or closed) the tour.
    HasSeenTour,
    /// The user finished the given template through its last step.
    TemplateCompleted(TemplateId),
}

impl FlagName {
    /// Storage key for this flag.
    #[must_use]
    pub fn key(&self) -> String {
        match self {
            Self::HasSeenTour => "tour.has_seen".to_owned(),
            Self::TemplateCompleted(id) => format!("{TEMPLATE_COMPLETED_PREFIX}{id}"),
        }
    }
}

impl fmt::Display for FlagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}
