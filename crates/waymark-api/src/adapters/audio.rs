//! Playback for browser-hosted tours.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::oneshot;
use tracing::debug;
use waymark_core::error::TourError;
use waymark_core::ports::{AudioClip, AudioOutput};

/// A clip the client should play, as served to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingNarration {
    /// Echoed back when the client reports the outcome.
    pub token: u64,
    pub media_type: String,
    pub text: String,
}

#[derive(Debug)]
struct Slot {
    token: u64,
    clip: AudioClip,
    done: oneshot::Sender<Result<(), TourError>>,
}

/// Hands each clip to the client and waits for it to report the end of
/// playback. Dropping the `play` future withdraws the clip, which tells the
/// client to stop.
#[derive(Debug, Default)]
pub struct ClientAudioOutput {
    slot: Mutex<Option<Slot>>,
    last_token: AtomicU64,
}

/// Withdraws the clip with `token` when playback is dropped.
struct Withdraw<'a> {
    output: &'a ClientAudioOutput,
    token: u64,
}

impl Drop for Withdraw<'_> {
    fn drop(&mut self) {
        let mut slot = self.output.lock();
        if slot.as_ref().is_some_and(|s| s.token == self.token) {
            debug!(token = self.token, "narration clip withdrawn");
            *slot = None;
        }
    }
}

impl ClientAudioOutput {
    /// Creates an output with nothing to play.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The clip currently awaiting the client, if any.
    #[must_use]
    pub fn pending(&self) -> Option<PendingNarration> {
        self.lock().as_ref().map(|slot| PendingNarration {
            token: slot.token,
            media_type: slot.clip.media_type.clone(),
            text: String::from_utf8_lossy(&slot.clip.data).into_owned(),
        })
    }

    /// Resolves the clip with `token`. Returns `false` if that clip is no
    /// longer awaiting the client.
    pub fn finish(&self, token: u64, outcome: Result<(), TourError>) -> bool {
        let mut slot = self.lock();
        if !slot.as_ref().is_some_and(|s| s.token == token) {
            return false;
        }
        match slot.take() {
            Some(s) => s.done.send(outcome).is_ok(),
            None => false,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<Slot>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AudioOutput for ClientAudioOutput {
    async fn play(&self, clip: AudioClip) -> Result<(), TourError> {
        let token = self.last_token.fetch_add(1, Ordering::SeqCst) + 1;
        let (done, outcome) = oneshot::channel();
        *self.lock() = Some(Slot { token, clip, done });
        let _withdraw = Withdraw { output: self, token };

        outcome
            .await
            .unwrap_or_else(|_| Err(TourError::Narration("client playback abandoned".into())))
    }
}
