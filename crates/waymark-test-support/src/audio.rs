//! Test narration collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use waymark_core::error::TourError;
use waymark_core::model::VoiceId;
use waymark_core::ports::{AudioClip, AudioOutput, NarrationSynthesizer};

/// A synthesizer that answers after `latency` with a clip whose data is the
/// requested text, or fails when built with [`ScriptedSynthesizer::failing`].
#[derive(Debug, Default)]
pub struct ScriptedSynthesizer {
    latency: Duration,
    fail: bool,
    requests: Mutex<Vec<(String, VoiceId)>>,
}

impl ScriptedSynthesizer {
    /// Creates a synthesizer that answers immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a synthesizer that answers after `latency`.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Creates a synthesizer whose every request fails.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Requests received, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn requests(&self) -> Vec<(String, VoiceId)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl NarrationSynthesizer for ScriptedSynthesizer {
    async fn synthesize(&self, text: &str, voice: &VoiceId) -> Result<AudioClip, TourError> {
        self.requests
            .lock()
            .unwrap()
            .push((text.to_owned(), voice.clone()));
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.fail {
            return Err(TourError::Narration("synthesis backend returned 503".into()));
        }
        Ok(AudioClip {
            media_type: "text/plain".to_owned(),
            data: text.as_bytes().to_vec(),
        })
    }
}

/// An audio output that records clips and tracks how many are playing.
///
/// Playback lasts `duration`, or until halted when built with
/// [`RecordingAudioOutput::endless`].
#[derive(Debug, Default)]
pub struct RecordingAudioOutput {
    duration: Option<Duration>,
    fail: bool,
    played: Mutex<Vec<AudioClip>>,
    playing: Arc<AtomicUsize>,
    halted: Arc<AtomicUsize>,
}

struct PlaybackGuard {
    playing: Arc<AtomicUsize>,
    halted: Arc<AtomicUsize>,
    finished: bool,
}

impl Drop for PlaybackGuard {
    fn drop(&mut self) {
        self.playing.fetch_sub(1, Ordering::SeqCst);
        if !self.finished {
            self.halted.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl RecordingAudioOutput {
    /// Creates an output whose playback lasts `duration`.
    #[must_use]
    pub fn with_duration(duration: Duration) -> Self {
        Self {
            duration: Some(duration),
            ..Self::default()
        }
    }

    /// Creates an output whose playback never ends on its own.
    #[must_use]
    pub fn endless() -> Self {
        Self::default()
    }

    /// Creates an output that fails every playback.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Clips handed to `play`, in order.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn played(&self) -> Vec<AudioClip> {
        self.played.lock().unwrap().clone()
    }

    /// Number of playbacks currently running.
    pub fn playing(&self) -> usize {
        self.playing.load(Ordering::SeqCst)
    }

    /// Number of playbacks halted before they finished.
    pub fn halted(&self) -> usize {
        self.halted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AudioOutput for RecordingAudioOutput {
    async fn play(&self, clip: AudioClip) -> Result<(), TourError> {
        self.played.lock().unwrap().push(clip);
        if self.fail {
            return Err(TourError::Narration("audio device unavailable".into()));
        }

        self.playing.fetch_add(1, Ordering::SeqCst);
        let mut guard = PlaybackGuard {
            playing: Arc::clone(&self.playing),
            halted: Arc::clone(&self.halted),
            finished: false,
        };
        match self.duration {
            Some(duration) => tokio::time::sleep(duration).await,
            None => std::future::pending::<()>().await,
        }
        guard.finished = true;
        Ok(())
    }
}
