//! Runtime state owned by the orchestrator, and its read-only projection.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use waymark_core::geometry::Point;
use waymark_core::model::{Location, TemplateId, TourStep};

/// The single transient notice the overlay may show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Notice {
    /// Narration could not be synthesized or played.
    NarrationUnavailable,
}

/// Where the tour is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TourPhase {
    Active,
    Completed,
    Closed,
    /// The host surface went away before the tour ended.
    Unmounted,
}

/// Mutable state of one running tour. Only the orchestrator writes it.
#[derive(Debug, Clone)]
pub struct TourRuntimeState {
    pub phase: TourPhase,
    pub current_step_index: usize,
    pub visible: bool,
    pub minimized: bool,
    pub auto_advance_armed: bool,
    pub narration_active: bool,
    pub navigating: bool,
    pub current_location: Location,
    pub widget_position: Point,
    pub notice: Option<Notice>,
    pub has_seen_tour: bool,
    pub last_completed_template_id: Option<TemplateId>,
}

impl TourRuntimeState {
    /// State at mount time, before step 0 is entered.
    #[must_use]
    pub fn mounted(
        current_location: Location,
        widget_position: Point,
        has_seen_tour: bool,
    ) -> Self {
        Self {
            phase: TourPhase::Active,
            current_step_index: 0,
            visible: true,
            minimized: false,
            auto_advance_armed: false,
            narration_active: false,
            navigating: false,
            current_location,
            widget_position,
            notice: None,
            has_seen_tour,
            last_completed_template_id: None,
        }
    }
}

/// Read-only view of a tour for hosts to render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TourSnapshot {
    pub session_id: Uuid,
    pub scenario_id: TemplateId,
    pub phase: TourPhase,
    pub step_index: usize,
    pub step_count: usize,
    /// The step on screen, `None` once the tour is over.
    pub step: Option<TourStep>,
    pub visible: bool,
    pub minimized: bool,
    pub auto_advance_armed: bool,
    pub narration_active: bool,
    pub navigating: bool,
    pub current_location: Location,
    pub widget_position: Point,
    pub notice: Option<Notice>,
    pub has_seen_tour: bool,
    pub last_completed_template_id: Option<TemplateId>,
}
