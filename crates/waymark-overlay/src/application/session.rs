//! Per-tour actor.
//!
//! Commands from the host and signals from timers, navigation and narration
//! are handled on one task, one at a time, so the orchestrator never sees
//! interleaved mutations.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;
use waymark_core::error::TourError;
use waymark_core::geometry::{Point, Size};
use waymark_widget::PointerTarget;

use super::orchestrator::TourOrchestrator;
use crate::domain::events::TourEvent;
use crate::domain::state::TourSnapshot;

const COMMAND_BUFFER: usize = 64;

/// A request from the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum TourCommand {
    /// Advance, only if `from_step` is still the current step. Two requests
    /// issued against the same step advance once.
    Next { from_step: usize },
    Prev,
    Goto { index: usize },
    Skip,
    Close,
    ToggleMinimize,
    Speak,
    StopNarration,
    DismissNotice,
    BeginDrag { pointer: Point, target: PointerTarget },
    UpdateDrag { pointer: Point },
    EndDrag,
    ResizeViewport { viewport: Size },
    SetAutoAdvance { enabled: bool },
    /// The host surface is going away. Ends the session without persisting.
    Unmount,
    Snapshot,
}

/// Reply to a command.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    /// State after the command.
    pub snapshot: TourSnapshot,
    /// Events recorded since the previous command, including those caused
    /// by timers, navigation and narration in between.
    pub events: Vec<TourEvent>,
}

struct Envelope {
    command: TourCommand,
    reply: oneshot::Sender<CommandOutcome>,
}

/// Cloneable handle to a running tour.
#[derive(Debug, Clone)]
pub struct TourSessionHandle {
    session_id: Uuid,
    commands: mpsc::Sender<Envelope>,
    snapshots: watch::Receiver<TourSnapshot>,
}

impl std::fmt::Debug for Envelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Envelope")
            .field("command", &self.command)
            .finish_non_exhaustive()
    }
}

impl TourSessionHandle {
    /// Tour session identifier.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Sends `command` and waits for the tour to apply it.
    ///
    /// # Errors
    ///
    /// Returns `TourError::SessionEnded` if the tour has completed or closed.
    pub async fn send(&self, command: TourCommand) -> Result<CommandOutcome, TourError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Envelope { command, reply })
            .await
            .map_err(|_| TourError::SessionEnded)?;
        outcome.await.map_err(|_| TourError::SessionEnded)
    }

    /// Latest published state. Still readable after the tour has ended.
    #[must_use]
    pub fn snapshot(&self) -> TourSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Returns `true` once the actor has stopped.
    #[must_use]
    pub fn is_ended(&self) -> bool {
        self.commands.is_closed()
    }
}

/// Moves `orchestrator` onto its own task. The task ends when the tour
/// completes, closes or is unmounted, or when every handle has been dropped,
/// and yields the final snapshot.
pub fn spawn_session(
    orchestrator: TourOrchestrator,
) -> (TourSessionHandle, JoinHandle<TourSnapshot>) {
    let session_id = orchestrator.session_id();
    let (commands_tx, commands_rx) = mpsc::channel(COMMAND_BUFFER);
    let (snapshots_tx, snapshots_rx) = watch::channel(orchestrator.snapshot());

    let task = tokio::spawn(run(orchestrator, commands_rx, snapshots_tx));
    let handle = TourSessionHandle {
        session_id,
        commands: commands_tx,
        snapshots: snapshots_rx,
    };
    (handle, task)
}

async fn run(
    mut orchestrator: TourOrchestrator,
    mut commands: mpsc::Receiver<Envelope>,
    snapshots: watch::Sender<TourSnapshot>,
) -> TourSnapshot {
    let session_id = orchestrator.session_id();
    info!(%session_id, "tour session started");

    while !orchestrator.is_finished() {
        tokio::select! {
            envelope = commands.recv() => {
                let Some(Envelope { command, reply }) = envelope else {
                    debug!(%session_id, "all handles dropped");
                    break;
                };
                execute(&mut orchestrator, command).await;
                let snapshot = orchestrator.snapshot();
                snapshots.send_replace(snapshot.clone());
                let _ = reply.send(CommandOutcome {
                    snapshot,
                    events: orchestrator.drain_events(),
                });
            }
            signal = orchestrator.wait_signal() => {
                orchestrator.handle_signal(signal).await;
                snapshots.send_replace(orchestrator.snapshot());
            }
        }
    }

    info!(%session_id, phase = ?orchestrator.state().phase, "tour session ended");
    orchestrator.snapshot()
}

async fn execute(orchestrator: &mut TourOrchestrator, command: TourCommand) {
    match command {
        TourCommand::Next { from_step } => orchestrator.next_from(from_step).await,
        TourCommand::Prev => orchestrator.prev().await,
        TourCommand::Goto { index } => orchestrator.goto(index).await,
        TourCommand::Skip => orchestrator.skip().await,
        TourCommand::Close => orchestrator.close().await,
        TourCommand::ToggleMinimize => {
            orchestrator.toggle_minimize();
        }
        TourCommand::Speak => {
            orchestrator.speak_current_step();
        }
        TourCommand::StopNarration => orchestrator.stop_narration(),
        TourCommand::DismissNotice => orchestrator.dismiss_notice(),
        TourCommand::BeginDrag { pointer, target } => {
            orchestrator.begin_drag(pointer, target);
        }
        TourCommand::UpdateDrag { pointer } => {
            orchestrator.update_drag(pointer);
        }
        TourCommand::EndDrag => orchestrator.end_drag(),
        TourCommand::ResizeViewport { viewport } => {
            orchestrator.resize_viewport(viewport);
        }
        TourCommand::SetAutoAdvance { enabled } => orchestrator.set_auto_advance(enabled),
        TourCommand::Unmount => orchestrator.unmount(),
        TourCommand::Snapshot => {}
    }
}
