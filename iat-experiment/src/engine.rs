use std::time::Duration;

use iat_core::{BlockPhase, IatError, InputCode, ResponseMapping, Trial, TrialResult};
use iat_timing::{Timer, saturating_nanos};
use tracing::{debug, info, trace};

use crate::aggregator::{ResultAggregator, ResultSequences};
use crate::config::Block;
use crate::presenter::Presenter;
use crate::schedule::Schedule;
use crate::sequencer::TrialSequencer;
use crate::submission::Submission;

/// What an input event did to the block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputOutcome {
    /// Dropped without any state change.
    Ignored,
    /// The start signal opened the block and the first trial is showing.
    Started,
    /// First response to the visible stimulus; a result was recorded.
    Responded {
        trial_id: String,
        correct: bool,
        reaction_time_ms: u64,
    },
    /// The required corrective key after an error; nothing was recorded.
    Corrected { trial_id: String },
}

/// Mutable per-block state, owned by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockState {
    pub phase: BlockPhase,
    /// Code that must be pressed before the current trial may end.
    pub pending_correction: Option<InputCode>,
    /// Onset of the visible stimulus while a timed response is awaited.
    pub stimulus_onset: Option<u64>,
}

/// Presents trials, captures responses and hands off results.
pub struct TrialEngine<P, T, S>
where
    P: Presenter,
    T: Timer,
    S: Submission,
{
    state: BlockState,
    sequencer: TrialSequencer,
    aggregator: ResultAggregator,
    mapping: ResponseMapping,
    schedule: Schedule,
    inter_trial_delay: Duration,
    start_code: InputCode,
    presenter: P,
    timer: T,
    submission: S,
}

impl<P, T, S> TrialEngine<P, T, S>
where
    P: Presenter,
    T: Timer,
    S: Submission,
{
    /// Fails with a configuration error before any input is processed if the
    /// block is inconsistent.
    pub fn new(block: Block, presenter: P, timer: T, submission: S) -> Result<Self, IatError> {
        block.validate()?;
        let inter_trial_delay = block.inter_trial_delay();
        let n = block.trials.len();

        Ok(Self {
            state: BlockState::default(),
            sequencer: TrialSequencer::new(block.trials),
            aggregator: ResultAggregator::with_capacity(n),
            mapping: block.mapping,
            schedule: Schedule::default(),
            inter_trial_delay,
            start_code: block.start_code,
            presenter,
            timer,
            submission,
        })
    }

    pub fn handle_input(&mut self, code: &str) -> Result<InputOutcome, IatError> {
        match self.state.phase {
            BlockPhase::AwaitingStart if code == self.start_code.as_str() => {
                self.start()?;
                Ok(InputOutcome::Started)
            }
            BlockPhase::Running => self.handle_response(code),
            _ => {
                trace!(code, phase = ?self.state.phase, "input ignored");
                Ok(InputOutcome::Ignored)
            }
        }
    }

    /// Runs the pending presentation if its delay has elapsed.
    pub fn tick(&mut self) -> Result<bool, IatError> {
        if self.schedule.take_if_due(self.timer.now()) {
            self.present_current()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Runs the pending presentation now, for hosts that time the delay
    /// themselves.
    pub fn fire_scheduled(&mut self) -> Result<bool, IatError> {
        if self.schedule.take() {
            self.present_current()?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Timer timestamp at which the next trial is due, if one is pending.
    pub fn next_deadline(&self) -> Option<u64> {
        self.schedule.due()
    }

    fn start(&mut self) -> Result<(), IatError> {
        if let Some(next) = self.state.phase.next() {
            self.state.phase = next;
        }
        info!(trials = self.sequencer.len(), "block started");
        self.present_current()
    }

    fn handle_response(&mut self, code: &str) -> Result<InputOutcome, IatError> {
        if let Some(expected) = &self.state.pending_correction {
            if expected.as_str() != code {
                trace!(code, expected = %expected, "awaiting corrective input");
                return Ok(InputOutcome::Ignored);
            }
            self.state.pending_correction = None;
            self.presenter.hide_error_feedback();
            let trial_id = self.sequencer.current()?.id.clone();
            debug!(trial = %trial_id, "corrected");
            self.advance()?;
            return Ok(InputOutcome::Corrected { trial_id });
        }

        let Some(onset) = self.state.stimulus_onset else {
            trace!(code, "no stimulus visible");
            return Ok(InputOutcome::Ignored);
        };
        let Some(side) = self.mapping.side_of(code) else {
            trace!(code, "unmapped input");
            return Ok(InputOutcome::Ignored);
        };

        let reaction_time_ms = self.timer.elapsed_ms_since(onset);
        let trial = self.sequencer.current()?;
        let correct_side = self.mapping.correct_side_for_trial(trial)?;
        let correct = side == correct_side;
        let trial_id = trial.id.clone();

        self.aggregator.record(TrialResult {
            trial_id: trial_id.clone(),
            input_code: code.into(),
            reaction_time_ms,
            correct,
        })?;
        self.state.stimulus_onset = None;
        debug!(trial = %trial_id, code, reaction_time_ms, correct, "response recorded");

        if correct {
            self.advance()?;
        } else {
            self.presenter.show_error_feedback();
            self.state.pending_correction = Some(self.mapping.code_for(correct_side).clone());
        }

        Ok(InputOutcome::Responded {
            trial_id,
            correct,
            reaction_time_ms,
        })
    }

    fn advance(&mut self) -> Result<(), IatError> {
        self.presenter.hide_stimulus();
        self.presenter.hide_error_feedback();
        self.presenter.update_progress(self.sequencer.progress_fraction());

        if self.sequencer.advance() {
            let due = self
                .timer
                .now()
                .saturating_add(saturating_nanos(self.inter_trial_delay));
            self.schedule.arm(due)?;
        } else {
            self.complete();
        }
        Ok(())
    }

    fn complete(&mut self) {
        if let Some(next) = self.state.phase.next() {
            self.state.phase = next;
        }
        debug_assert_eq!(self.aggregator.len(), self.sequencer.len());
        let results = self.aggregator.sequences();
        info!(trials = results.len(), "block complete");
        self.submission.submit(results);
    }

    fn present_current(&mut self) -> Result<(), IatError> {
        let trial = self.sequencer.current()?;
        self.presenter.show_stimulus(trial);
        self.state.stimulus_onset = Some(self.timer.start());
        debug!(trial = %trial.id, stimulus = %trial.stimulus, "stimulus shown");
        Ok(())
    }

    pub fn phase(&self) -> BlockPhase {
        self.state.phase
    }

    pub fn state(&self) -> &BlockState {
        &self.state
    }

    pub fn cursor(&self) -> usize {
        self.sequencer.cursor()
    }

    pub fn trial_count(&self) -> usize {
        self.sequencer.len()
    }

    pub fn is_complete(&self) -> bool {
        self.state.phase.is_complete()
    }

    pub fn awaiting_correction(&self) -> bool {
        self.state.pending_correction.is_some()
    }

    /// Trial currently on screen or awaiting correction.
    pub fn current_trial(&self) -> Option<&Trial> {
        if self.state.phase.allows_response() && !self.schedule.is_armed() {
            self.sequencer.current().ok()
        } else {
            None
        }
    }

    pub fn results(&self) -> &[TrialResult] {
        self.aggregator.results()
    }

    pub fn result_sequences(&self) -> ResultSequences {
        self.aggregator.sequences()
    }

    pub fn mapping(&self) -> &ResponseMapping {
        &self.mapping
    }

    pub fn start_code(&self) -> &InputCode {
        &self.start_code
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presenter::{PresenterCall, RecordingPresenter};
    use crate::submission::SubmissionSlot;
    use iat_core::{Category, ConfigurationError, Side};
    use iat_timing::ManualTimer;

    type Engine = TrialEngine<RecordingPresenter, ManualTimer, SubmissionSlot>;

    fn mapping() -> ResponseMapping {
        ResponseMapping::new(
            "A".into(),
            "L".into(),
            [
                (Category::new("flower", "positive"), Side::Left),
                (Category::new("insect", "negative"), Side::Right),
            ],
        )
        .unwrap()
    }

    fn engine(trials: Vec<Trial>) -> (Engine, ManualTimer, SubmissionSlot) {
        let clock = ManualTimer::new();
        let slot = SubmissionSlot::new();
        let block = Block::new(trials, mapping(), 250);
        let engine = TrialEngine::new(
            block,
            RecordingPresenter::new(),
            clock.clone(),
            slot.clone(),
        )
        .unwrap();
        (engine, clock, slot)
    }

    fn rose() -> Trial {
        Trial::new("1", "rose", "flower", "positive")
    }

    fn wasp() -> Trial {
        Trial::new("2", "wasp", "insect", "negative")
    }

    #[test]
    fn responses_before_start_are_ignored() {
        let (mut e, _, _) = engine(vec![rose()]);
        assert_eq!(e.handle_input("A").unwrap(), InputOutcome::Ignored);
        assert_eq!(e.phase(), BlockPhase::AwaitingStart);
        assert!(e.presenter().calls.is_empty());
    }

    #[test]
    fn start_presents_first_trial_immediately() {
        let (mut e, _, _) = engine(vec![rose(), wasp()]);
        assert_eq!(e.handle_input("Space").unwrap(), InputOutcome::Started);
        assert_eq!(e.phase(), BlockPhase::Running);
        assert_eq!(e.presenter().shown_stimuli(), ["1"]);
        assert!(e.state().stimulus_onset.is_some());
        assert_eq!(e.current_trial().map(|t| t.id.as_str()), Some("1"));
    }

    #[test]
    fn start_signal_is_one_shot() {
        let (mut e, _, _) = engine(vec![rose()]);
        e.handle_input("Space").unwrap();
        assert_eq!(e.handle_input("Space").unwrap(), InputOutcome::Ignored);
        assert_eq!(e.presenter().shown_stimuli().len(), 1);
    }

    #[test]
    fn correct_response_records_and_schedules_next_trial() {
        let (mut e, clock, _) = engine(vec![rose(), wasp()]);
        e.handle_input("Space").unwrap();
        clock.advance_ms(420);
        let outcome = e.handle_input("A").unwrap();
        assert_eq!(
            outcome,
            InputOutcome::Responded {
                trial_id: "1".into(),
                correct: true,
                reaction_time_ms: 420
            }
        );
        assert_eq!(e.cursor(), 1);
        assert_eq!(e.next_deadline(), Some(clock.now() + 250_000_000));
        assert!(e.current_trial().is_none());

        clock.advance_ms(249);
        assert!(!e.tick().unwrap());
        clock.advance_ms(1);
        assert!(e.tick().unwrap());
        assert_eq!(e.presenter().shown_stimuli(), ["1", "2"]);
    }

    #[test]
    fn wrong_response_requires_the_correct_key() {
        let (mut e, clock, slot) = engine(vec![rose()]);
        e.handle_input("Space").unwrap();
        clock.advance_ms(300);
        e.handle_input("L").unwrap();

        assert_eq!(e.state().pending_correction, Some(InputCode::from("A")));
        assert_eq!(e.state().stimulus_onset, None);
        assert!(e.presenter().calls.contains(&PresenterCall::ShowErrorFeedback));

        clock.advance_ms(200);
        assert_eq!(e.handle_input("L").unwrap(), InputOutcome::Ignored);
        assert_eq!(e.handle_input("Z").unwrap(), InputOutcome::Ignored);
        assert!(e.awaiting_correction());

        assert_eq!(
            e.handle_input("A").unwrap(),
            InputOutcome::Corrected {
                trial_id: "1".into()
            }
        );
        assert!(e.is_complete());
        assert_eq!(e.results().len(), 1);
        assert_eq!(e.results()[0].reaction_time_ms, 300);
        assert!(!e.results()[0].correct);
        assert_eq!(slot.submissions(), 1);
    }

    #[test]
    fn correction_hides_feedback_before_advancing() {
        let (mut e, _, _) = engine(vec![rose(), wasp()]);
        e.handle_input("Space").unwrap();
        e.handle_input("L").unwrap();
        e.handle_input("A").unwrap();
        let calls = &e.presenter().calls;
        let shown = calls
            .iter()
            .position(|c| *c == PresenterCall::ShowErrorFeedback)
            .unwrap();
        let hidden = calls
            .iter()
            .rposition(|c| *c == PresenterCall::HideErrorFeedback)
            .unwrap();
        assert!(hidden > shown);
        assert_eq!(e.cursor(), 1);
        assert!(!e.is_complete());
    }

    #[test]
    fn inputs_during_delay_do_not_present_early() {
        let (mut e, clock, _) = engine(vec![rose(), wasp()]);
        e.handle_input("Space").unwrap();
        e.handle_input("A").unwrap();
        assert_eq!(e.handle_input("L").unwrap(), InputOutcome::Ignored);
        assert_eq!(e.handle_input("Space").unwrap(), InputOutcome::Ignored);
        assert_eq!(e.results().len(), 1);
        assert_eq!(e.presenter().shown_stimuli(), ["1"]);

        clock.advance_ms(250);
        e.tick().unwrap();
        assert_eq!(e.presenter().shown_stimuli(), ["1", "2"]);
    }

    #[test]
    fn huge_delay_clamps_the_deadline_instead_of_wrapping() {
        let clock = ManualTimer::new();
        let block = Block::new(vec![rose(), wasp()], mapping(), u64::MAX / 1000);
        let mut e = TrialEngine::new(
            block,
            RecordingPresenter::new(),
            clock.clone(),
            SubmissionSlot::new(),
        )
        .unwrap();
        e.handle_input("Space").unwrap();
        clock.advance_ms(500);
        e.handle_input("A").unwrap();

        assert_eq!(e.next_deadline(), Some(u64::MAX));
        assert!(!e.tick().unwrap());
        clock.advance_ms(10_000);
        assert!(!e.tick().unwrap());
        assert_eq!(e.presenter().shown_stimuli(), ["1"]);
    }

    #[test]
    fn fire_scheduled_ignores_the_clock() {
        let (mut e, _, _) = engine(vec![rose(), wasp()]);
        e.handle_input("Space").unwrap();
        e.handle_input("A").unwrap();
        assert!(e.fire_scheduled().unwrap());
        assert!(!e.fire_scheduled().unwrap());
        assert_eq!(e.current_trial().map(|t| t.id.as_str()), Some("2"));
    }

    #[test]
    fn completion_submits_once_and_freezes() {
        let (mut e, clock, slot) = engine(vec![rose()]);
        e.handle_input("Space").unwrap();
        clock.advance_ms(500);
        e.handle_input("A").unwrap();
        assert!(e.is_complete());
        assert_eq!(e.next_deadline(), None);

        assert_eq!(e.handle_input("A").unwrap(), InputOutcome::Ignored);
        assert_eq!(e.handle_input("Space").unwrap(), InputOutcome::Ignored);
        assert!(!e.tick().unwrap());
        assert_eq!(slot.submissions(), 1);
        assert_eq!(slot.peek().unwrap().reaction_times_ms, ["500"]);
    }

    #[test]
    fn unmapped_category_fails_construction() {
        let block = Block::new(
            vec![rose(), Trial::new("2", "joy", "words", "positive")],
            mapping(),
            250,
        );
        let err = TrialEngine::new(
            block,
            RecordingPresenter::new(),
            ManualTimer::new(),
            SubmissionSlot::new(),
        )
        .err()
        .unwrap();
        assert!(matches!(
            err,
            IatError::Configuration(ConfigurationError::UnmappedCategory { .. })
        ));
    }
}
