//! Routes for launching and driving guided tours.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;
use waymark_core::error::TourError;
use waymark_core::event::DomainEvent;
use waymark_core::geometry::Size;
use waymark_core::model::Location;
use waymark_core::ports::{AudioOutput, CompletionPresenter, NarrationSynthesizer, Navigator};
use waymark_overlay::application::launch::{LaunchMode, LaunchRequest, launch_tour};
use waymark_overlay::application::orchestrator::TourDependencies;
use waymark_overlay::application::session::{TourCommand, spawn_session};
use waymark_overlay::domain::events::TourEvent;
use waymark_overlay::domain::state::TourSnapshot;
use waymark_sequencer::domain::templates::TemplateSource;

use crate::adapters::{
    BrowserSpeechSynthesizer, Certificate, CertificatePresenter, ClientAudioOutput, ClientNavigator,
};
use crate::error::ApiError;
use crate::state::{AppState, SessionEntry};

/// Request body for `POST /api/v1/tours`.
#[derive(Debug, Deserialize)]
pub struct LaunchTourRequest {
    /// Signed-in identity the tour's flags belong to.
    pub identity: Uuid,
    /// Scenario to look up; the built-in tour when absent.
    #[serde(default)]
    pub scenario_id: Option<String>,
    #[serde(default)]
    pub mode: LaunchMode,
    pub viewport: Size,
    /// Path the client is showing.
    pub location: String,
    /// Overrides the server's auto-advance default for this tour.
    #[serde(default)]
    pub auto_advance: Option<bool>,
}

/// Response body for `POST /api/v1/tours`.
#[derive(Debug, Serialize)]
pub struct LaunchTourResponse {
    pub launched: bool,
    pub tour: Option<TourSnapshot>,
}

/// A recorded event as served to clients.
#[derive(Debug, Serialize)]
pub struct EventView {
    pub event_id: Uuid,
    pub event_type: &'static str,
    pub sequence_number: i64,
    pub occurred_at: DateTime<Utc>,
    pub payload: serde_json::Value,
}

impl From<&TourEvent> for EventView {
    fn from(event: &TourEvent) -> Self {
        let meta = event.metadata();
        Self {
            event_id: meta.event_id,
            event_type: event.event_type(),
            sequence_number: meta.sequence_number,
            occurred_at: meta.occurred_at,
            payload: event.to_payload(),
        }
    }
}

/// Response body for `POST /api/v1/tours/{session_id}/commands`.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    pub snapshot: TourSnapshot,
    pub events: Vec<EventView>,
}

/// Request body for `POST /api/v1/tours/{session_id}/narration/ended`.
#[derive(Debug, Deserialize)]
pub struct NarrationEnded {
    pub token: u64,
}

/// Request body for `POST /api/v1/tours/{session_id}/narration/failed`.
#[derive(Debug, Deserialize)]
pub struct NarrationFailed {
    pub token: u64,
    pub reason: String,
}

/// Stops a session's tour as its host surface goes away. Nothing is
/// persisted.
async fn unmount(entry: &SessionEntry) {
    let session_id = entry.handle.session_id();
    match entry.handle.send(TourCommand::Unmount).await {
        Ok(_) => tracing::info!(%session_id, "tour session unmounted"),
        Err(e) => tracing::debug!(%session_id, error = %e, "tour session already ended"),
    }
}

/// POST /api/v1/tours
#[instrument(skip(state))]
async fn launch(
    State(state): State<AppState>,
    Json(request): Json<LaunchTourRequest>,
) -> Result<(StatusCode, Json<LaunchTourResponse>), ApiError> {
    let pruned = state.prune_ended();
    if pruned > 0 {
        tracing::debug!(pruned, "ended tour sessions pruned");
    }
    for previous in state.take_sessions_for(request.identity) {
        unmount(&previous).await;
    }

    let audio = Arc::new(ClientAudioOutput::new());
    let presenter = Arc::new(CertificatePresenter::new());
    let deps = TourDependencies {
        navigator: Arc::new(ClientNavigator) as Arc<dyn Navigator>,
        synthesizer: Arc::new(BrowserSpeechSynthesizer) as Arc<dyn NarrationSynthesizer>,
        audio_output: Arc::clone(&audio) as Arc<dyn AudioOutput>,
        flag_store: Arc::clone(&state.flag_store),
        presenter: Arc::clone(&presenter) as Arc<dyn CompletionPresenter>,
        clock: Arc::clone(&state.clock),
    };

    let mut settings = state.settings.clone();
    if let Some(auto_advance) = request.auto_advance {
        settings.auto_advance = auto_advance;
    }
    let launch_request = LaunchRequest {
        identity: request.identity,
        source: request
            .scenario_id
            .map_or(TemplateSource::Default, TemplateSource::Scenario),
        mode: request.mode,
        viewport: request.viewport,
        location: Location::new(request.location),
    };

    let Some(orchestrator) =
        launch_tour(launch_request, settings, state.registry.as_ref(), deps).await?
    else {
        return Ok((
            StatusCode::OK,
            Json(LaunchTourResponse {
                launched: false,
                tour: None,
            }),
        ));
    };

    let (handle, _task) = spawn_session(orchestrator);
    let snapshot = handle.snapshot();
    tracing::info!(session_id = %handle.session_id(), "tour launched");
    state.insert_session(SessionEntry {
        identity: request.identity,
        handle,
        audio,
        presenter,
    });

    Ok((
        StatusCode::CREATED,
        Json(LaunchTourResponse {
            launched: true,
            tour: Some(snapshot),
        }),
    ))
}

/// GET /api/v1/tours/{session_id}
async fn get_tour(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<TourSnapshot>, ApiError> {
    let entry = state.session(session_id)?;
    Ok(Json(entry.handle.snapshot()))
}

/// DELETE /api/v1/tours/{session_id}
#[instrument(skip(state))]
async fn unmount_tour(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let entry = state
        .remove_session(session_id)
        .ok_or(ApiError::SessionNotFound(session_id))?;
    unmount(&entry).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/tours/{session_id}/commands
#[instrument(skip(state))]
async fn send_command(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(command): Json<TourCommand>,
) -> Result<Json<CommandResponse>, ApiError> {
    let entry = state.session(session_id)?;
    let outcome = entry.handle.send(command).await?;
    Ok(Json(CommandResponse {
        snapshot: outcome.snapshot,
        events: outcome.events.iter().map(EventView::from).collect(),
    }))
}

/// GET /api/v1/tours/{session_id}/narration
async fn pending_narration(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let entry = state.session(session_id)?;
    Ok(match entry.audio.pending() {
        Some(pending) => Json(pending).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    })
}

/// POST /api/v1/tours/{session_id}/narration/ended
#[instrument(skip(state))]
async fn narration_ended(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<NarrationEnded>,
) -> Result<StatusCode, ApiError> {
    let entry = state.session(session_id)?;
    if entry.audio.finish(body.token, Ok(())) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::StaleNarration(body.token))
    }
}

/// POST /api/v1/tours/{session_id}/narration/failed
#[instrument(skip(state))]
async fn narration_failed(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(body): Json<NarrationFailed>,
) -> Result<StatusCode, ApiError> {
    let entry = state.session(session_id)?;
    if entry
        .audio
        .finish(body.token, Err(TourError::Narration(body.reason)))
    {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::StaleNarration(body.token))
    }
}

/// GET /api/v1/tours/{session_id}/certificate
async fn certificate(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<Certificate>, ApiError> {
    let entry = state.session(session_id)?;
    entry
        .presenter
        .certificate()
        .map(Json)
        .ok_or(ApiError::CertificateNotFound(session_id))
}

/// Returns the router for tours.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(launch))
        .route("/{session_id}", get(get_tour).delete(unmount_tour))
        .route("/{session_id}/commands", post(send_command))
        .route("/{session_id}/narration", get(pending_narration))
        .route("/{session_id}/narration/ended", post(narration_ended))
        .route("/{session_id}/narration/failed", post(narration_failed))
        .route("/{session_id}/certificate", get(certificate))
}
