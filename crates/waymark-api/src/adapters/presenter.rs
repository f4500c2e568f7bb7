//! Certificates for browser-hosted tours.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use waymark_core::model::TemplateId;
use waymark_core::ports::CompletionPresenter;

/// A completion certificate waiting to be shown by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Certificate {
    pub template_id: TemplateId,
    pub completed_at: DateTime<Utc>,
}

/// Keeps the certificate of one tour session for the client to fetch.
#[derive(Debug, Default)]
pub struct CertificatePresenter {
    certificate: Mutex<Option<Certificate>>,
}

impl CertificatePresenter {
    /// Creates a presenter with no certificate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The certificate, once the tour has been completed.
    #[must_use]
    pub fn certificate(&self) -> Option<Certificate> {
        self.certificate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl CompletionPresenter for CertificatePresenter {
    fn present(&self, template_id: &TemplateId, completed_at: DateTime<Utc>) {
        info!(%template_id, %completed_at, "certificate ready");
        *self.certificate.lock().unwrap_or_else(PoisonError::into_inner) = Some(Certificate {
            template_id: template_id.clone(),
            completed_at,
        });
    }
}
