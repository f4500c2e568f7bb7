//! Shared test mocks and utilities for the Waymark tour engine.

mod audio;
mod clock;
mod flags;
mod navigation;
mod presenter;
mod template;

pub use audio::{RecordingAudioOutput, ScriptedSynthesizer};
pub use clock::FixedClock;
pub use flags::{FailingFlagStore, RecordingFlagStore};
pub use navigation::RecordingNavigator;
pub use presenter::RecordingPresenter;
pub use template::three_step_template;
