//! Test presenter — records certificate presentation requests.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use waymark_core::model::TemplateId;
use waymark_core::ports::CompletionPresenter;

/// Records every `present` call.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    presented: Mutex<Vec<(TemplateId, DateTime<Utc>)>>,
}

impl RecordingPresenter {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all presentation requests.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn presented(&self) -> Vec<(TemplateId, DateTime<Utc>)> {
        self.presented.lock().unwrap().clone()
    }
}

impl CompletionPresenter for RecordingPresenter {
    fn present(&self, template: &TemplateId, completed_at: DateTime<Utc>) {
        self.presented
            .lock()
            .unwrap()
            .push((template.clone(), completed_at));
    }
}
