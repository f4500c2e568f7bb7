//! The narration audio controller.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use waymark_core::error::TourError;
use waymark_core::model::VoiceId;
use waymark_core::ports::{AudioOutput, NarrationSynthesizer};

/// How long a synthesis request may take before it counts as a failure.
pub const DEFAULT_SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(15);

/// Lifecycle of one playback, identified by the id `speak` returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationEvent {
    /// Synthesis succeeded and audio is now playing.
    Started { playback: u64 },
    /// Playback ran to the end.
    Finished { playback: u64 },
    /// Synthesis or playback failed; no audio is playing.
    Failed { playback: u64, reason: String },
}

impl NarrationEvent {
    /// The playback this event belongs to.
    #[must_use]
    pub fn playback(&self) -> u64 {
        match self {
            Self::Started { playback }
            | Self::Finished { playback }
            | Self::Failed { playback, .. } => *playback,
        }
    }
}

#[derive(Debug)]
struct Playback {
    id: u64,
    task: JoinHandle<()>,
}

/// Owns zero or one playback.
///
/// Each `speak` runs synthesis and playback on a spawned task that reports
/// through the event channel. `stop` aborts that task, which drops the
/// in-flight synthesis or playback future. Events from a playback that is no
/// longer current are rejected by [`NarrationController::settle`].
pub struct NarrationController {
    synthesizer: Arc<dyn NarrationSynthesizer>,
    output: Arc<dyn AudioOutput>,
    synthesis_timeout: Duration,
    events: mpsc::UnboundedSender<NarrationEvent>,
    current: Option<Playback>,
    last_playback: u64,
}

impl std::fmt::Debug for NarrationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrationController")
            .field("synthesis_timeout", &self.synthesis_timeout)
            .field("current", &self.current)
            .field("last_playback", &self.last_playback)
            .finish_non_exhaustive()
    }
}

impl NarrationController {
    /// Creates a controller reporting to `events`.
    #[must_use]
    pub fn new(
        synthesizer: Arc<dyn NarrationSynthesizer>,
        output: Arc<dyn AudioOutput>,
        synthesis_timeout: Duration,
        events: mpsc::UnboundedSender<NarrationEvent>,
    ) -> Self {
        Self {
            synthesizer,
            output,
            synthesis_timeout,
            events,
            current: None,
            last_playback: 0,
        }
    }

    /// Creates a controller together with the receiving end of its events.
    #[must_use]
    pub fn channel(
        synthesizer: Arc<dyn NarrationSynthesizer>,
        output: Arc<dyn AudioOutput>,
        synthesis_timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<NarrationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(synthesizer, output, synthesis_timeout, tx), rx)
    }

    /// Stops any current playback, then synthesizes and plays `text`.
    /// Returns the new playback id. Must be called within a tokio runtime.
    pub fn speak(&mut self, text: &str, voice: &VoiceId) -> u64 {
        self.stop();

        self.last_playback += 1;
        let playback = self.last_playback;
        let text = text.trim().to_owned();
        let voice = voice.clone();
        let synthesizer = Arc::clone(&self.synthesizer);
        let output = Arc::clone(&self.output);
        let synthesis_timeout = self.synthesis_timeout;
        let events = self.events.clone();

        debug!(playback, %voice, chars = text.len(), "narration requested");
        let task = tokio::spawn(async move {
            let outcome = run_playback(
                playback,
                &text,
                &voice,
                &*synthesizer,
                &*output,
                synthesis_timeout,
                &events,
            )
            .await;
            let event = match outcome {
                Ok(()) => NarrationEvent::Finished { playback },
                Err(e) => NarrationEvent::Failed {
                    playback,
                    reason: e.to_string(),
                },
            };
            let _ = events.send(event);
        });

        self.current = Some(Playback { id: playback, task });
        playback
    }

    /// Halts the current playback immediately. Returns `true` if something
    /// was stopped; calling it again is a no-op.
    pub fn stop(&mut self) -> bool {
        match self.current.take() {
            Some(playback) => {
                playback.task.abort();
                debug!(playback = playback.id, "narration stopped");
                true
            }
            None => false,
        }
    }

    /// Accepts `event` if it belongs to the current playback. A terminal
    /// event (`Finished`/`Failed`) releases the playback.
    pub fn settle(&mut self, event: &NarrationEvent) -> bool {
        if self.current_playback() != Some(event.playback()) {
            debug!(playback = event.playback(), "event from stopped narration dropped");
            return false;
        }
        if !matches!(event, NarrationEvent::Started { .. }) {
            self.current = None;
        }
        if let NarrationEvent::Failed { playback, reason } = event {
            warn!(playback, %reason, "narration failed");
        }
        true
    }

    /// Id of the live playback, if any.
    #[must_use]
    pub fn current_playback(&self) -> Option<u64> {
        self.current.as_ref().map(|p| p.id)
    }
}

impl Drop for NarrationController {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn run_playback(
    playback: u64,
    text: &str,
    voice: &VoiceId,
    synthesizer: &dyn NarrationSynthesizer,
    output: &dyn AudioOutput,
    synthesis_timeout: Duration,
    events: &mpsc::UnboundedSender<NarrationEvent>,
) -> Result<(), TourError> {
    if text.is_empty() {
        return Err(TourError::Narration("nothing to narrate".into()));
    }

    let clip = tokio::time::timeout(synthesis_timeout, synthesizer.synthesize(text, voice))
        .await
        .map_err(|_| TourError::NarrationTimeout(synthesis_timeout.as_millis()))??;

    let _ = events.send(NarrationEvent::Started { playback });
    output.play(clip).await
}
