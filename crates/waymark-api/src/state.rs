//! Shared application state.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use uuid::Uuid;
use waymark_core::clock::Clock;
use waymark_core::ports::FlagStore;
use waymark_overlay::application::session::TourSessionHandle;
use waymark_overlay::domain::settings::TourSettings;
use waymark_sequencer::domain::registry::StaticTemplateRegistry;

use crate::adapters::{CertificatePresenter, ClientAudioOutput};
use crate::error::ApiError;

/// A running or finished tour and the adapters the client talks to.
#[derive(Debug, Clone)]
pub struct SessionEntry {
    /// Identity the tour was launched for.
    pub identity: Uuid,
    pub handle: TourSessionHandle,
    pub audio: Arc<ClientAudioOutput>,
    pub presenter: Arc<CertificatePresenter>,
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Defaults for new tour sessions.
    pub settings: TourSettings,
    /// Templates selectable by scenario id.
    pub registry: Arc<StaticTemplateRegistry>,
    /// Per-identity flag persistence.
    pub flag_store: Arc<dyn FlagStore>,
    pub clock: Arc<dyn Clock>,
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(
        settings: TourSettings,
        registry: Arc<StaticTemplateRegistry>,
        flag_store: Arc<dyn FlagStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            settings,
            registry,
            flag_store,
            clock,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Registers a newly launched session.
    pub fn insert_session(&self, entry: SessionEntry) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry.handle.session_id(), entry);
    }

    /// Looks up a session.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::SessionNotFound` if no session has this id.
    pub fn session(&self, session_id: Uuid) -> Result<SessionEntry, ApiError> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&session_id)
            .cloned()
            .ok_or(ApiError::SessionNotFound(session_id))
    }

    /// Forgets a session, returning it if it was registered.
    pub fn remove_session(&self, session_id: Uuid) -> Option<SessionEntry> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&session_id)
    }

    /// Forgets every session launched for `identity` and returns them so the
    /// caller can tear down the ones still running.
    pub fn take_sessions_for(&self, identity: Uuid) -> Vec<SessionEntry> {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let ids: Vec<Uuid> = sessions
            .iter()
            .filter(|(_, entry)| entry.identity == identity)
            .map(|(id, _)| *id)
            .collect();
        ids.iter().filter_map(|id| sessions.remove(id)).collect()
    }

    /// Forgets sessions whose tour has ended. Returns how many were removed.
    pub fn prune_ended(&self) -> usize {
        let mut sessions = self.sessions.write().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, entry| !entry.handle.is_ended());
        before - sessions.len()
    }

    /// Number of sessions whose tour is still running.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .filter(|entry| !entry.handle.is_ended())
            .count()
    }
}
