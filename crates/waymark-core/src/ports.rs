//! Collaborator traits the tour engine depends on.
//!
//! Everything the overlay needs from the outside world (routing, speech,
//! audio, per-user flags, certificates, template lookup) is reached through
//! one of these traits so hosts and tests can supply their own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TourError;
use crate::flags::FlagName;
use crate::model::{Location, TemplateId, TourTemplate, VoiceId};

/// Synthesized narration audio.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioClip {
    /// MIME type of `data`, e.g. `audio/mpeg`.
    pub media_type: String,
    /// Encoded audio.
    pub data: Vec<u8>,
}

/// Moves the host surface to a location.
#[async_trait]
pub trait Navigator: Send + Sync {
    /// Resolves once the surface has rendered `location`. Navigating to the
    /// current location is a no-op. A failure leaves the current location
    /// unchanged.
    async fn navigate_to(&self, location: &Location) -> Result<(), TourError>;
}

/// Turns narration text into audio.
#[async_trait]
pub trait NarrationSynthesizer: Send + Sync {
    /// Stateless per call; callers cancel by dropping the future.
    async fn synthesize(&self, text: &str, voice: &VoiceId) -> Result<AudioClip, TourError>;
}

/// Plays synthesized audio.
#[async_trait]
pub trait AudioOutput: Send + Sync {
    /// Resolves when playback ends. Dropping the future halts playback.
    async fn play(&self, clip: AudioClip) -> Result<(), TourError>;
}

/// Per-identity boolean flag storage.
#[async_trait]
pub trait FlagStore: Send + Sync {
    /// Reads a flag. Unset flags read as `false`.
    async fn get_flag(&self, identity: Uuid, name: &FlagName) -> Result<bool, TourError>;

    /// Writes a flag.
    async fn set_flag(&self, identity: Uuid, name: &FlagName, value: bool)
    -> Result<(), TourError>;
}

/// Presents the completion certificate. Fire-and-forget.
pub trait CompletionPresenter: Send + Sync {
    /// Requests presentation for `template` finished at `completed_at`.
    fn present(&self, template: &TemplateId, completed_at: DateTime<Utc>);
}

/// Read-only lookup of tour templates by scenario.
pub trait TemplateRegistry: Send + Sync {
    /// Returns the template registered for `scenario_id`, if any. Must be a
    /// pure function of the registry's current contents.
    fn resolve(&self, scenario_id: &str) -> Option<TourTemplate>;
}
