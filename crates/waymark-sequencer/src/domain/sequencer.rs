//! The tour step sequencer state machine.

use tracing::debug;
use waymark_core::error::TourError;
use waymark_core::model::{TourStep, TourTemplate};

use super::events::{CompletionPath, SequencerEvent};

/// Sequencer lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    NotStarted,
    Active(usize),
    Completed,
    Closed,
}

/// Owns the step list and the current index of one tour run.
///
/// Every transition returns the events it produced. `Completed` and `Closed`
/// are terminal: later transitions return no events, and a new tour needs a
/// new sequencer.
#[derive(Debug)]
pub struct TourSequencer {
    template: Option<TourTemplate>,
    state: SequencerState,
}

impl Default for TourSequencer {
    fn default() -> Self {
        Self::new()
    }
}

impl TourSequencer {
    /// Creates a sequencer in `NotStarted`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            template: None,
            state: SequencerState::NotStarted,
        }
    }

    /// Starts `template` on its first step.
    ///
    /// # Errors
    ///
    /// Returns `TourError::TemplateEmpty` or `TourError::InvalidTemplate` if
    /// the template fails validation, and `TourError::AlreadyStarted` if this
    /// sequencer has already been started.
    pub fn start(&mut self, template: TourTemplate) -> Result<Vec<SequencerEvent>, TourError> {
        if self.state != SequencerState::NotStarted {
            return Err(TourError::AlreadyStarted);
        }
        template.validate()?;

        debug!(scenario_id = %template.scenario_id, steps = template.len(), "tour started");
        self.template = Some(template);
        self.state = SequencerState::Active(0);
        Ok(vec![SequencerEvent::Started])
    }

    /// Advances one step, or completes the tour from the terminal step.
    pub fn next(&mut self) -> Vec<SequencerEvent> {
        let (SequencerState::Active(index), Some(terminal)) = (self.state, self.terminal_index())
        else {
            return Vec::new();
        };

        if index == terminal {
            self.state = SequencerState::Completed;
            return vec![SequencerEvent::Completed {
                path: CompletionPath::Finished,
            }];
        }

        self.move_to(index, index + 1)
    }

    /// Advances only if `observed` is still the current index.
    ///
    /// UI clicks and timer firings carry the index they were issued against,
    /// so two requests queued for the same step advance once.
    pub fn next_from(&mut self, observed: usize) -> Vec<SequencerEvent> {
        if self.current_index() != Some(observed) {
            debug!(observed, current = ?self.current_index(), "stale next request ignored");
            return Vec::new();
        }
        self.next()
    }

    /// Goes back one step. No-op on the first step.
    pub fn prev(&mut self) -> Vec<SequencerEvent> {
        match self.state {
            SequencerState::Active(index) if index > 0 => self.move_to(index, index - 1),
            _ => Vec::new(),
        }
    }

    /// Jumps to `index`, clamped into the template's bounds.
    pub fn goto(&mut self, index: usize) -> Vec<SequencerEvent> {
        let (SequencerState::Active(current), Some(terminal)) = (self.state, self.terminal_index())
        else {
            return Vec::new();
        };

        let target = index.min(terminal);
        if target == current {
            return Vec::new();
        }
        self.move_to(current, target)
    }

    /// Skips the rest of the tour.
    pub fn skip(&mut self) -> Vec<SequencerEvent> {
        self.dismiss()
    }

    /// Closes the tour.
    pub fn close(&mut self) -> Vec<SequencerEvent> {
        self.dismiss()
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Current step index while active.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SequencerState::Active(index) => Some(index),
            _ => None,
        }
    }

    /// Current step while active.
    #[must_use]
    pub fn current_step(&self) -> Option<&TourStep> {
        let index = self.current_index()?;
        self.template.as_ref()?.step(index)
    }

    /// The running template, once started.
    #[must_use]
    pub fn template(&self) -> Option<&TourTemplate> {
        self.template.as_ref()
    }

    /// The tour card is shown only while a step is active.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        matches!(self.state, SequencerState::Active(_))
    }

    /// Returns `true` while the terminal step is showing.
    #[must_use]
    pub fn is_on_terminal_step(&self) -> bool {
        self.current_index().is_some() && self.current_index() == self.terminal_index()
    }

    fn terminal_index(&self) -> Option<usize> {
        self.template.as_ref().and_then(TourTemplate::terminal_index)
    }

    fn move_to(&mut self, from: usize, to: usize) -> Vec<SequencerEvent> {
        self.state = SequencerState::Active(to);
        vec![SequencerEvent::StepChanged { from, to }]
    }

    fn dismiss(&mut self) -> Vec<SequencerEvent> {
        if !self.is_visible() {
            return Vec::new();
        }

        let on_terminal = self.is_on_terminal_step();
        self.state = SequencerState::Closed;

        let mut events = vec![SequencerEvent::Closed];
        if on_terminal {
            events.push(SequencerEvent::Completed {
                path: CompletionPath::Dismissed,
            });
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(steps: usize) -> TourTemplate {
        let steps = (0..steps)
            .map(|i| {
                TourStep::new(
                    format!("step-{i}"),
                    format!("Step {i}"),
                    "Body",
                    format!("/page/{i}"),
                )
            })
            .collect();
        TourTemplate::new("test", steps)
    }

    fn started(steps: usize) -> TourSequencer {
        let mut sequencer = TourSequencer::new();
        sequencer.start(template(steps)).unwrap();
        sequencer
    }

    #[test]
    fn test_start_enters_first_step_and_is_visible() {
        // Arrange
        let mut sequencer = TourSequencer::new();
        assert_eq!(sequencer.state(), SequencerState::NotStarted);
        assert!(!sequencer.is_visible());

        // Act
        let events = sequencer.start(template(3)).unwrap();

        // Assert
        assert_eq!(events, vec![SequencerEvent::Started]);
        assert_eq!(sequencer.state(), SequencerState::Active(0));
        assert!(sequencer.is_visible());
        assert_eq!(sequencer.current_step().unwrap().id.as_str(), "step-0");
    }

    #[test]
    fn test_start_with_empty_template_fails_fast() {
        let mut sequencer = TourSequencer::new();

        let result = sequencer.start(template(0));

        assert!(matches!(result, Err(TourError::TemplateEmpty(_))));
        assert_eq!(sequencer.state(), SequencerState::NotStarted);
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut sequencer = started(2);

        let result = sequencer.start(template(2));

        assert!(matches!(result, Err(TourError::AlreadyStarted)));
        assert_eq!(sequencer.state(), SequencerState::Active(0));
    }

    #[test]
    fn test_n_minus_one_nexts_reach_terminal_and_one_more_completes() {
        for n in 1..=6 {
            // Arrange
            let mut sequencer = started(n);

            // Act
            for _ in 0..n - 1 {
                let events = sequencer.next();
                assert!(matches!(events.as_slice(), [SequencerEvent::StepChanged { .. }]));
            }

            // Assert
            assert_eq!(sequencer.current_index(), Some(n - 1));
            assert!(sequencer.is_on_terminal_step());

            let events = sequencer.next();
            assert_eq!(
                events,
                vec![SequencerEvent::Completed {
                    path: CompletionPath::Finished
                }]
            );
            assert_eq!(sequencer.state(), SequencerState::Completed);
            assert!(!sequencer.is_visible());
        }
    }

    #[test]
    fn test_next_reports_from_and_to() {
        let mut sequencer = started(3);

        let events = sequencer.next();

        assert_eq!(events, vec![SequencerEvent::StepChanged { from: 0, to: 1 }]);
    }

    #[test]
    fn test_next_from_same_observed_index_advances_once() {
        // Arrange
        let mut sequencer = started(4);

        // Act
        let first = sequencer.next_from(0);
        let second = sequencer.next_from(0);

        // Assert
        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(sequencer.current_index(), Some(1));
    }

    #[test]
    fn test_prev_on_first_step_is_noop() {
        let mut sequencer = started(3);

        assert!(sequencer.prev().is_empty());
        assert_eq!(sequencer.current_index(), Some(0));
    }

    #[test]
    fn test_prev_moves_back_one_step() {
        let mut sequencer = started(3);
        sequencer.next();
        sequencer.next();

        let events = sequencer.prev();

        assert_eq!(events, vec![SequencerEvent::StepChanged { from: 2, to: 1 }]);
    }

    #[test]
    fn test_goto_clamps_out_of_range_to_terminal() {
        let mut sequencer = started(3);

        let events = sequencer.goto(usize::MAX);

        assert_eq!(events, vec![SequencerEvent::StepChanged { from: 0, to: 2 }]);
        assert_eq!(sequencer.current_index(), Some(2));
    }

    #[test]
    fn test_goto_current_index_is_noop() {
        let mut sequencer = started(3);
        sequencer.goto(1);

        assert!(sequencer.goto(1).is_empty());
        assert!(sequencer.goto(7).len() == 1);
        assert!(sequencer.goto(99).is_empty());
    }

    #[test]
    fn test_close_before_terminal_abandons_without_completion() {
        let mut sequencer = started(3);
        sequencer.next();

        let events = sequencer.close();

        assert_eq!(events, vec![SequencerEvent::Closed]);
        assert_eq!(sequencer.state(), SequencerState::Closed);
        assert!(!sequencer.is_visible());
    }

    #[test]
    fn test_skip_on_terminal_step_also_reports_dismissed_completion() {
        let mut sequencer = started(2);
        sequencer.next();

        let events = sequencer.skip();

        assert_eq!(
            events,
            vec![
                SequencerEvent::Closed,
                SequencerEvent::Completed {
                    path: CompletionPath::Dismissed
                }
            ]
        );
    }

    #[test]
    fn test_terminal_states_accept_no_transitions() {
        // Arrange
        let mut completed = started(1);
        completed.next();
        let mut closed = started(3);
        closed.close();

        // Act / Assert
        for sequencer in [&mut completed, &mut closed] {
            let before = sequencer.state();
            assert!(sequencer.next().is_empty());
            assert!(sequencer.prev().is_empty());
            assert!(sequencer.goto(0).is_empty());
            assert!(sequencer.skip().is_empty());
            assert!(sequencer.close().is_empty());
            assert_eq!(sequencer.state(), before);
        }
    }

    #[test]
    fn test_transitions_before_start_are_ignored() {
        let mut sequencer = TourSequencer::new();

        assert!(sequencer.next().is_empty());
        assert!(sequencer.goto(2).is_empty());
        assert!(sequencer.close().is_empty());
        assert_eq!(sequencer.state(), SequencerState::NotStarted);
    }
}
