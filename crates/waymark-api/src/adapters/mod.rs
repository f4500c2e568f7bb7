//! Collaborators for tours driven by a browser client over HTTP.
//!
//! The server owns the tour state machine while the browser routes, speaks
//! and shows certificates, so these adapters hand work to the client and wait
//! for it to report back.

mod audio;
mod navigation;
mod presenter;
mod speech;

pub use audio::{ClientAudioOutput, PendingNarration};
pub use navigation::ClientNavigator;
pub use presenter::{Certificate, CertificatePresenter};
pub use speech::{BrowserSpeechSynthesizer, SPEECH_MEDIA_TYPE};
