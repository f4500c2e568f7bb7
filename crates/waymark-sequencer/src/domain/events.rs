//! Events emitted by the step sequencer.

use serde::{Deserialize, Serialize};

/// How a tour reached its terminal step's completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionPath {
    /// `next()` on the terminal step.
    Finished,
    /// `skip()` or `close()` while the terminal step was showing.
    Dismissed,
}

/// Emitted by sequencer transitions, in the order they occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SequencerEvent {
    /// The tour started on step 0.
    Started,
    /// The current step changed.
    StepChanged {
        /// Index before the transition.
        from: usize,
        /// Index after the transition.
        to: usize,
    },
    /// The terminal step was completed.
    Completed {
        /// Which transition completed it.
        path: CompletionPath,
    },
    /// The tour was skipped or closed.
    Closed,
}
