//! Speech for browser-hosted tours.

use async_trait::async_trait;
use waymark_core::error::TourError;
use waymark_core::model::VoiceId;
use waymark_core::ports::{AudioClip, NarrationSynthesizer};

/// Media type of clips the browser speaks with its own speech engine.
pub const SPEECH_MEDIA_TYPE: &str = "text/plain; charset=utf-8";

/// Produces plain-text clips for the browser's speech engine instead of
/// encoded audio. The requested voice travels as a media type parameter.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserSpeechSynthesizer;

#[async_trait]
impl NarrationSynthesizer for BrowserSpeechSynthesizer {
    async fn synthesize(&self, text: &str, voice: &VoiceId) -> Result<AudioClip, TourError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(TourError::Narration("nothing to narrate".into()));
        }
        Ok(AudioClip {
            media_type: format!("{SPEECH_MEDIA_TYPE}; voice={voice}"),
            data: text.as_bytes().to_vec(),
        })
    }
}
