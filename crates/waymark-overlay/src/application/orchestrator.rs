//! The tour orchestrator.
//!
//! Reacts to every step entry by disarming auto-advance, stopping narration,
//! navigating when the step lives elsewhere, and re-arming auto-advance once
//! the step has settled. Timer, navigation and narration results come back as
//! [`OverlaySignal`]s which the owner feeds to [`TourOrchestrator::handle_signal`]
//! one at a time.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;
use waymark_core::clock::Clock;
use waymark_core::error::TourError;
use waymark_core::event::EventMetadata;
use waymark_core::flags::FlagName;
use waymark_core::geometry::{Point, Size};
use waymark_core::model::{Location, TemplateId, TourStep, TourTemplate};
use waymark_core::ports::{
    AudioOutput, CompletionPresenter, FlagStore, NarrationSynthesizer, Navigator,
};
use waymark_narration::{NarrationController, NarrationEvent, narration_script};
use waymark_scheduler::{AdvanceFired, AutoAdvanceScheduler};
use waymark_sequencer::domain::events::{CompletionPath, SequencerEvent};
use waymark_sequencer::domain::sequencer::TourSequencer;
use waymark_widget::{PointerTarget, WidgetController};

use super::persistence::write_flag;
use crate::domain::events::{TourEvent, TourEventKind};
use crate::domain::settings::TourSettings;
use crate::domain::state::{Notice, TourPhase, TourRuntimeState, TourSnapshot};

/// External collaborators a tour talks to.
#[derive(Clone)]
pub struct TourDependencies {
    pub navigator: Arc<dyn Navigator>,
    pub synthesizer: Arc<dyn NarrationSynthesizer>,
    pub audio_output: Arc<dyn AudioOutput>,
    pub flag_store: Arc<dyn FlagStore>,
    pub presenter: Arc<dyn CompletionPresenter>,
    pub clock: Arc<dyn Clock>,
}

/// Host context a tour is mounted into.
#[derive(Debug, Clone)]
pub struct TourMount {
    /// Signed-in identity the persisted flags belong to.
    pub identity: Uuid,
    /// Identifier for this tour run.
    pub session_id: Uuid,
    /// Viewport size at mount time.
    pub viewport: Size,
    /// Location the host is showing at mount time.
    pub location: Location,
    /// Value of the persisted `has_seen_tour` flag.
    pub has_seen_tour: bool,
}

/// Result of a navigation request, tagged with the step entry that made it.
#[derive(Debug)]
pub struct NavigationSettled {
    generation: u64,
    location: Location,
    result: Result<(), TourError>,
}

/// An asynchronous result the orchestrator must react to.
#[derive(Debug)]
pub enum OverlaySignal {
    Advance(AdvanceFired),
    Navigation(NavigationSettled),
    Narration(NarrationEvent),
}

#[derive(Debug)]
struct PendingNavigation {
    generation: u64,
    task: JoinHandle<()>,
}

/// The coordinating state machine of one tour run.
pub struct TourOrchestrator {
    session_id: Uuid,
    identity: Uuid,
    template_id: TemplateId,
    settings: TourSettings,
    deps: TourDependencies,
    sequencer: TourSequencer,
    scheduler: AutoAdvanceScheduler,
    advance_rx: mpsc::UnboundedReceiver<AdvanceFired>,
    armed_for_step: Option<usize>,
    narration: NarrationController,
    narration_rx: mpsc::UnboundedReceiver<NarrationEvent>,
    widget: WidgetController,
    navigation: Option<PendingNavigation>,
    navigation_generation: u64,
    navigation_tx: mpsc::UnboundedSender<NavigationSettled>,
    navigation_rx: mpsc::UnboundedReceiver<NavigationSettled>,
    state: TourRuntimeState,
    events: Vec<TourEvent>,
    sequence: i64,
}

impl TourOrchestrator {
    /// Mounts the overlay and enters the first step of `template`. Must be
    /// called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `TourError::TemplateEmpty` or `TourError::InvalidTemplate` if
    /// `template` fails validation.
    pub fn start(
        template: TourTemplate,
        mount: TourMount,
        settings: TourSettings,
        deps: TourDependencies,
    ) -> Result<Self, TourError> {
        let template_id = template.scenario_id.clone();
        let step_count = template.len();
        let mut sequencer = TourSequencer::new();
        let started = sequencer.start(template)?;

        let (scheduler, advance_rx) = AutoAdvanceScheduler::channel();
        let (narration, narration_rx) = NarrationController::channel(
            Arc::clone(&deps.synthesizer),
            Arc::clone(&deps.audio_output),
            settings.synthesis_timeout,
        );
        let (navigation_tx, navigation_rx) = mpsc::unbounded_channel();
        let widget = WidgetController::docked(mount.viewport, settings.widget_size);
        let state =
            TourRuntimeState::mounted(mount.location, widget.position(), mount.has_seen_tour);

        let mut orchestrator = Self {
            session_id: mount.session_id,
            identity: mount.identity,
            template_id: template_id.clone(),
            settings,
            deps,
            sequencer,
            scheduler,
            advance_rx,
            armed_for_step: None,
            narration,
            narration_rx,
            widget,
            navigation: None,
            navigation_generation: 0,
            navigation_tx,
            navigation_rx,
            state,
            events: Vec::new(),
            sequence: 0,
        };

        info!(
            session_id = %orchestrator.session_id,
            scenario_id = %template_id,
            step_count,
            "tour mounted"
        );
        orchestrator.record(TourEventKind::TourStarted {
            scenario_id: template_id,
            step_count,
        });
        if started.contains(&SequencerEvent::Started) {
            orchestrator.enter_step(None, 0);
        }
        Ok(orchestrator)
    }

    // --- step transitions ---

    /// Advances one step, or finishes the tour from the terminal step.
    pub async fn next(&mut self) {
        let events = self.sequencer.next();
        self.apply(events).await;
    }

    /// Advances only if `observed` is still the current step.
    pub async fn next_from(&mut self, observed: usize) {
        let events = self.sequencer.next_from(observed);
        self.apply(events).await;
    }

    /// Goes back one step.
    pub async fn prev(&mut self) {
        let events = self.sequencer.prev();
        self.apply(events).await;
    }

    /// Jumps to `index`, clamped into range.
    pub async fn goto(&mut self, index: usize) {
        let events = self.sequencer.goto(index);
        self.apply(events).await;
    }

    /// Skips the rest of the tour.
    pub async fn skip(&mut self) {
        let events = self.sequencer.skip();
        self.apply(events).await;
    }

    /// Closes the tour.
    pub async fn close(&mut self) {
        let events = self.sequencer.close();
        self.apply(events).await;
    }

    /// Tears the tour down because its host surface is going away. Narration
    /// stops and nothing is persisted, so the tour shows again next visit.
    pub fn unmount(&mut self) {
        if self.is_finished() {
            return;
        }
        let step_index = self.state.current_step_index;
        self.teardown(TourPhase::Unmounted);
        info!(session_id = %self.session_id, step_index, "tour unmounted");
        self.record(TourEventKind::TourUnmounted { step_index });
    }

    // --- narration ---

    /// Reads the current step aloud, replacing any playback in progress.
    /// Returns the playback id, or `None` when the tour is not showing.
    pub fn speak_current_step(&mut self) -> Option<u64> {
        if !self.state.visible {
            return None;
        }
        let text = narration_script(self.sequencer.current_step()?);

        self.halt_narration();
        self.state.notice = None;
        let playback = self.narration.speak(&text, &self.settings.voice);
        self.record(TourEventKind::NarrationRequested {
            playback,
            step_index: self.state.current_step_index,
        });
        Some(playback)
    }

    /// Stops narration. Idempotent.
    pub fn stop_narration(&mut self) {
        self.halt_narration();
    }

    /// Clears the transient notice.
    pub fn dismiss_notice(&mut self) {
        self.state.notice = None;
    }

    // --- widget ---

    /// Minimizes or restores the widget and returns the new minimized flag.
    /// Minimizing disarms auto-advance and leaves narration playing;
    /// restoring does not re-arm.
    pub fn toggle_minimize(&mut self) -> bool {
        if !self.state.visible {
            return self.state.minimized;
        }
        let minimized = self.widget.toggle_minimize();
        self.state.minimized = minimized;
        if minimized {
            self.disarm_auto_advance();
        }
        self.record(TourEventKind::MinimizeToggled { minimized });
        minimized
    }

    /// Starts dragging the widget. Returns `false` if the pointer went down
    /// on a control.
    pub fn begin_drag(&mut self, pointer: Point, target: PointerTarget) -> bool {
        self.widget.begin_drag(pointer, target)
    }

    /// Moves the widget with the pointer.
    pub fn update_drag(&mut self, pointer: Point) -> Option<Point> {
        let position = self.widget.update_drag(pointer)?;
        self.state.widget_position = position;
        Some(position)
    }

    /// Ends the drag in progress, if any.
    pub fn end_drag(&mut self) {
        if !self.widget.is_dragging() {
            return;
        }
        self.widget.end_drag();
        self.record(TourEventKind::WidgetMoved {
            position: self.state.widget_position,
        });
    }

    /// Applies a new viewport size.
    pub fn resize_viewport(&mut self, viewport: Size) -> Point {
        let position = self.widget.resize_viewport(viewport);
        self.state.widget_position = position;
        position
    }

    // --- preferences ---

    /// Turns auto-advance on or off. Turning it off disarms immediately;
    /// turning it on takes effect at the next step entry.
    pub fn set_auto_advance(&mut self, enabled: bool) {
        self.settings.auto_advance = enabled;
        if !enabled {
            self.disarm_auto_advance();
        }
    }

    // --- signals ---

    /// Waits for the next timer, navigation or narration result.
    /// Cancellation safe.
    pub async fn wait_signal(&mut self) -> OverlaySignal {
        tokio::select! {
            biased;
            Some(settled) = self.navigation_rx.recv() => OverlaySignal::Navigation(settled),
            Some(event) = self.narration_rx.recv() => OverlaySignal::Narration(event),
            Some(fired) = self.advance_rx.recv() => OverlaySignal::Advance(fired),
            else => std::future::pending().await,
        }
    }

    /// Reacts to one signal.
    pub async fn handle_signal(&mut self, signal: OverlaySignal) {
        match signal {
            OverlaySignal::Advance(fired) => self.on_advance(fired).await,
            OverlaySignal::Navigation(settled) => self.on_navigation_settled(settled),
            OverlaySignal::Narration(event) => self.on_narration(event),
        }
    }

    /// Waits for and handles one signal.
    pub async fn pump(&mut self) {
        let signal = self.wait_signal().await;
        self.handle_signal(signal).await;
    }

    // --- queries ---

    /// Read-only view of the tour.
    #[must_use]
    pub fn snapshot(&self) -> TourSnapshot {
        let step = if self.state.visible {
            self.sequencer.current_step().cloned()
        } else {
            None
        };
        TourSnapshot {
            session_id: self.session_id,
            scenario_id: self.template_id.clone(),
            phase: self.state.phase,
            step_index: self.state.current_step_index,
            step_count: self.sequencer.template().map_or(0, TourTemplate::len),
            step,
            visible: self.state.visible,
            minimized: self.state.minimized,
            auto_advance_armed: self.state.auto_advance_armed,
            narration_active: self.state.narration_active,
            navigating: self.state.navigating,
            current_location: self.state.current_location.clone(),
            widget_position: self.state.widget_position,
            notice: self.state.notice,
            has_seen_tour: self.state.has_seen_tour,
            last_completed_template_id: self.state.last_completed_template_id.clone(),
        }
    }

    /// Runtime state.
    #[must_use]
    pub fn state(&self) -> &TourRuntimeState {
        &self.state
    }

    /// The step on screen.
    #[must_use]
    pub fn current_step(&self) -> Option<&TourStep> {
        self.sequencer.current_step()
    }

    /// Returns `true` once the tour has completed or been closed.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.state.phase != TourPhase::Active
    }

    /// Tour session identifier.
    #[must_use]
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Events recorded since the last drain.
    #[must_use]
    pub fn events(&self) -> &[TourEvent] {
        &self.events
    }

    /// Takes the recorded events.
    pub fn drain_events(&mut self) -> Vec<TourEvent> {
        std::mem::take(&mut self.events)
    }

    // --- internals ---

    async fn apply(&mut self, events: Vec<SequencerEvent>) {
        for event in events {
            match event {
                SequencerEvent::Started => self.enter_step(None, 0),
                SequencerEvent::StepChanged { from, to } => self.enter_step(Some(from), to),
                SequencerEvent::Completed {
                    path: CompletionPath::Finished,
                } => self.finish().await,
                SequencerEvent::Completed {
                    path: CompletionPath::Dismissed,
                } => self.record(TourEventKind::TourCompleted {
                    template_id: self.template_id.clone(),
                    path: CompletionPath::Dismissed,
                }),
                SequencerEvent::Closed => self.dismiss().await,
            }
        }
    }

    fn enter_step(&mut self, from: Option<usize>, to: usize) {
        self.disarm_auto_advance();
        self.halt_narration();
        self.state.current_step_index = to;

        let Some(step) = self.sequencer.current_step() else {
            return;
        };
        let step_id = step.id.clone();
        let target = step.target_location.clone();

        info!(session_id = %self.session_id, step_index = to, %step_id, "tour step entered");
        self.record(TourEventKind::StepChanged { from, to, step_id });

        self.cancel_navigation();
        if target == self.state.current_location {
            self.step_settled();
        } else {
            self.request_navigation(target);
        }
    }

    fn request_navigation(&mut self, location: Location) {
        self.navigation_generation += 1;
        let generation = self.navigation_generation;
        let navigator = Arc::clone(&self.deps.navigator);
        let tx = self.navigation_tx.clone();
        let target = location.clone();

        let task = tokio::spawn(async move {
            let result = navigator.navigate_to(&target).await;
            let _ = tx.send(NavigationSettled {
                generation,
                location: target,
                result,
            });
        });

        self.state.navigating = true;
        self.navigation = Some(PendingNavigation { generation, task });
        debug!(generation, %location, "navigation requested");
        self.record(TourEventKind::NavigationRequested { location });
    }

    fn cancel_navigation(&mut self) {
        if let Some(pending) = self.navigation.take() {
            pending.task.abort();
            debug!(generation = pending.generation, "navigation superseded");
        }
        self.state.navigating = false;
    }

    fn on_navigation_settled(&mut self, settled: NavigationSettled) {
        match &self.navigation {
            Some(pending) if pending.generation == settled.generation => {}
            _ => {
                debug!(generation = settled.generation, "stale navigation result dropped");
                return;
            }
        }
        self.navigation = None;

        match settled.result {
            Ok(()) => {
                self.state.current_location = settled.location.clone();
                self.record(TourEventKind::NavigationSettled {
                    location: settled.location,
                });
            }
            Err(e) => {
                warn!(
                    location = %settled.location,
                    error = %e,
                    "navigation failed, showing step in place"
                );
                self.record(TourEventKind::NavigationFailed {
                    location: settled.location,
                    reason: e.to_string(),
                });
            }
        }
        self.step_settled();
    }

    fn step_settled(&mut self) {
        self.state.navigating = false;
        if !self.settings.auto_advance || self.state.minimized || !self.state.visible {
            return;
        }

        let step_index = self.state.current_step_index;
        let cycle = self.scheduler.arm(self.settings.dwell);
        self.armed_for_step = Some(step_index);
        self.state.auto_advance_armed = true;
        self.record(TourEventKind::AutoAdvanceArmed { step_index, cycle });
    }

    fn disarm_auto_advance(&mut self) {
        self.scheduler.disarm();
        self.armed_for_step = None;
        self.state.auto_advance_armed = false;
    }

    async fn on_advance(&mut self, fired: AdvanceFired) {
        if !self.scheduler.take_fired(fired) {
            return;
        }
        self.state.auto_advance_armed = false;
        let Some(step_index) = self.armed_for_step.take() else {
            return;
        };

        debug!(step_index, "auto-advance fired");
        self.record(TourEventKind::AutoAdvanceFired { step_index });
        let events = self.sequencer.next_from(step_index);
        self.apply(events).await;
    }

    fn halt_narration(&mut self) {
        if let Some(playback) = self.narration.current_playback() {
            self.narration.stop();
            self.record(TourEventKind::NarrationStopped { playback });
        }
        self.state.narration_active = false;
    }

    fn on_narration(&mut self, event: NarrationEvent) {
        if !self.narration.settle(&event) {
            return;
        }
        match event {
            NarrationEvent::Started { playback } => {
                self.state.narration_active = true;
                self.record(TourEventKind::NarrationStarted { playback });
            }
            NarrationEvent::Finished { playback } => {
                self.state.narration_active = false;
                self.record(TourEventKind::NarrationFinished { playback });
            }
            NarrationEvent::Failed { .. } => {
                self.state.narration_active = false;
                self.state.notice = Some(Notice::NarrationUnavailable);
                self.record(TourEventKind::NoticeRaised {
                    notice: Notice::NarrationUnavailable,
                });
            }
        }
    }

    fn teardown(&mut self, phase: TourPhase) {
        self.disarm_auto_advance();
        self.halt_narration();
        self.cancel_navigation();
        self.widget.end_drag();
        self.state.visible = false;
        self.state.phase = phase;
    }

    async fn finish(&mut self) {
        let template_id = self.template_id.clone();
        self.teardown(TourPhase::Completed);
        info!(session_id = %self.session_id, scenario_id = %template_id, "tour completed");
        self.record(TourEventKind::TourCompleted {
            template_id: template_id.clone(),
            path: CompletionPath::Finished,
        });

        self.persist(FlagName::HasSeenTour).await;
        self.persist(FlagName::TemplateCompleted(template_id.clone())).await;
        self.state.last_completed_template_id = Some(template_id.clone());

        let completed_at = self.deps.clock.now();
        self.deps.presenter.present(&template_id, completed_at);
        self.record(TourEventKind::CertificateRequested {
            template_id,
            completed_at,
        });
    }

    async fn dismiss(&mut self) {
        let step_index = self.state.current_step_index;
        self.teardown(TourPhase::Closed);
        info!(session_id = %self.session_id, step_index, "tour closed");
        self.record(TourEventKind::TourClosed { step_index });
        self.persist(FlagName::HasSeenTour).await;
    }

    async fn persist(&mut self, flag: FlagName) {
        if !write_flag(&*self.deps.flag_store, self.identity, &flag, true).await {
            self.record(TourEventKind::PersistenceDegraded { flag: flag.key() });
            return;
        }
        if flag == FlagName::HasSeenTour {
            self.state.has_seen_tour = true;
        }
    }

    fn record(&mut self, kind: TourEventKind) {
        self.sequence += 1;
        let metadata = EventMetadata {
            event_id: Uuid::new_v4(),
            event_type: kind.event_type().to_owned(),
            session_id: self.session_id,
            sequence_number: self.sequence,
            occurred_at: self.deps.clock.now(),
        };
        self.events.push(TourEvent { metadata, kind });
    }
}

impl Drop for TourOrchestrator {
    fn drop(&mut self) {
        if let Some(pending) = self.navigation.take() {
            pending.task.abort();
        }
    }
}
