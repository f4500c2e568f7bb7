//! Launch gate: decides whether a tour is shown and mounts it.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use waymark_core::error::TourError;
use waymark_core::flags::FlagName;
use waymark_core::geometry::Size;
use waymark_core::model::Location;
use waymark_core::ports::TemplateRegistry;
use waymark_sequencer::domain::templates::{TemplateSource, resolve_template};

use super::orchestrator::{TourDependencies, TourMount, TourOrchestrator};
use crate::domain::settings::TourSettings;

/// When a launch request actually shows the tour.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaunchMode {
    /// First-visit launch: only if the user has not seen the tour.
    #[default]
    IfUnseen,
    /// Explicit replay: always.
    Always,
}

/// Everything needed to decide on and mount a tour.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub identity: Uuid,
    pub source: TemplateSource,
    pub mode: LaunchMode,
    pub viewport: Size,
    pub location: Location,
}

/// Reads the `has_seen_tour` flag and, if the tour should show, resolves the
/// template and starts it. Returns `Ok(None)` when the tour is suppressed.
///
/// A failed flag read counts as "not seen": showing the tour again is
/// preferable to never showing it.
///
/// # Errors
///
/// Returns `TourError::TemplateEmpty` or `TourError::InvalidTemplate` if the
/// resolved template fails validation.
pub async fn launch_tour(
    request: LaunchRequest,
    settings: TourSettings,
    registry: &dyn TemplateRegistry,
    deps: TourDependencies,
) -> Result<Option<TourOrchestrator>, TourError> {
    let has_seen_tour = match deps
        .flag_store
        .get_flag(request.identity, &FlagName::HasSeenTour)
        .await
    {
        Ok(seen) => seen,
        Err(e) => {
            warn!(
                identity = %request.identity,
                error = %e,
                "could not read has_seen_tour, assuming unseen"
            );
            false
        }
    };

    if request.mode == LaunchMode::IfUnseen && has_seen_tour {
        info!(identity = %request.identity, "tour already seen, not launching");
        return Ok(None);
    }

    let template = resolve_template(request.source, registry);
    let mount = TourMount {
        identity: request.identity,
        session_id: Uuid::new_v4(),
        viewport: request.viewport,
        location: request.location,
        has_seen_tour,
    };
    TourOrchestrator::start(template, mount, settings, deps).map(Some)
}
