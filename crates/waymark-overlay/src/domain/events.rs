//! Events recorded by the tour overlay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use waymark_core::event::{DomainEvent, EventMetadata};
use waymark_core::geometry::Point;
use waymark_core::model::{Location, StepId, TemplateId};
use waymark_sequencer::domain::events::CompletionPath;

use super::state::Notice;

/// Event payload variants for the tour overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TourEventKind {
    /// The tour was mounted and started on step 0.
    TourStarted {
        scenario_id: TemplateId,
        step_count: usize,
    },
    /// A step was entered.
    StepChanged {
        from: Option<usize>,
        to: usize,
        step_id: StepId,
    },
    /// Navigation to a step's location was requested.
    NavigationRequested { location: Location },
    /// Navigation settled on the requested location.
    NavigationSettled { location: Location },
    /// Navigation failed; the step shows at the current location.
    NavigationFailed { location: Location, reason: String },
    /// The auto-advance timer was armed for a step.
    AutoAdvanceArmed { step_index: usize, cycle: u64 },
    /// The auto-advance timer fired.
    AutoAdvanceFired { step_index: usize },
    /// Narration of a step was requested.
    NarrationRequested { playback: u64, step_index: usize },
    /// Narration audio began playing.
    NarrationStarted { playback: u64 },
    /// Narration audio played to the end.
    NarrationFinished { playback: u64 },
    /// Narration was halted before it finished.
    NarrationStopped { playback: u64 },
    /// A transient notice was raised.
    NoticeRaised { notice: Notice },
    /// The widget was minimized or restored.
    MinimizeToggled { minimized: bool },
    /// A drag moved the widget.
    WidgetMoved { position: Point },
    /// The terminal step was completed.
    TourCompleted {
        template_id: TemplateId,
        path: CompletionPath,
    },
    /// The tour was skipped or closed.
    TourClosed { step_index: usize },
    /// The host surface was torn down mid-tour. Nothing is persisted.
    TourUnmounted { step_index: usize },
    /// The completion certificate was requested.
    CertificateRequested {
        template_id: TemplateId,
        completed_at: DateTime<Utc>,
    },
    /// A flag could not be persisted after retrying.
    PersistenceDegraded { flag: String },
}

/// Domain event envelope for the tour overlay.
#[derive(Debug, Clone)]
pub struct TourEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: TourEventKind,
}

impl TourEventKind {
    /// Type name recorded in the envelope.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::TourStarted { .. } => "tour.started",
            Self::StepChanged { .. } => "tour.step_changed",
            Self::NavigationRequested { .. } => "tour.navigation_requested",
            Self::NavigationSettled { .. } => "tour.navigation_settled",
            Self::NavigationFailed { .. } => "tour.navigation_failed",
            Self::AutoAdvanceArmed { .. } => "tour.auto_advance_armed",
            Self::AutoAdvanceFired { .. } => "tour.auto_advance_fired",
            Self::NarrationRequested { .. } => "tour.narration_requested",
            Self::NarrationStarted { .. } => "tour.narration_started",
            Self::NarrationFinished { .. } => "tour.narration_finished",
            Self::NarrationStopped { .. } => "tour.narration_stopped",
            Self::NoticeRaised { .. } => "tour.notice_raised",
            Self::MinimizeToggled { .. } => "tour.minimize_toggled",
            Self::WidgetMoved { .. } => "tour.widget_moved",
            Self::TourCompleted { .. } => "tour.completed",
            Self::TourClosed { .. } => "tour.closed",
            Self::TourUnmounted { .. } => "tour.unmounted",
            Self::CertificateRequested { .. } => "tour.certificate_requested",
            Self::PersistenceDegraded { .. } => "tour.persistence_degraded",
        }
    }
}

impl DomainEvent for TourEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("TourEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
