//! Tour preferences and tunables.

use std::time::Duration;

use waymark_core::geometry::Size;
use waymark_core::model::VoiceId;
use waymark_narration::DEFAULT_SYNTHESIS_TIMEOUT;
use waymark_scheduler::DEFAULT_DWELL;
use waymark_widget::DEFAULT_WIDGET_SIZE;

/// Voice used when none is configured.
pub const DEFAULT_VOICE: &str = "alloy";

/// Per-session tour settings.
#[derive(Debug, Clone)]
pub struct TourSettings {
    /// The user opted in to auto-advance.
    pub auto_advance: bool,
    /// Dwell before auto-advance moves on.
    pub dwell: Duration,
    /// Voice used for narration.
    pub voice: VoiceId,
    /// Deadline for a narration synthesis request.
    pub synthesis_timeout: Duration,
    /// Size of the expanded widget.
    pub widget_size: Size,
}

impl Default for TourSettings {
    fn default() -> Self {
        Self {
            auto_advance: false,
            dwell: DEFAULT_DWELL,
            voice: VoiceId::new(DEFAULT_VOICE),
            synthesis_timeout: DEFAULT_SYNTHESIS_TIMEOUT,
            widget_size: DEFAULT_WIDGET_SIZE,
        }
    }
}

impl TourSettings {
    /// Returns these settings with auto-advance switched on or off.
    #[must_use]
    pub fn with_auto_advance(mut self, enabled: bool) -> Self {
        self.auto_advance = enabled;
        self
    }
}
