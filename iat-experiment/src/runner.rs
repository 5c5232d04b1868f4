//! Drives a block without a window, on a virtual clock.

use iat_core::IatError;
use iat_timing::ManualTimer;
use tracing::trace;

use crate::aggregator::ResultSequences;
use crate::config::{Block, DebugConfig};
use crate::engine::TrialEngine;
use crate::input::{DebugInput, InputSource};
use crate::presenter::Presenter;
use crate::submission::{Submission, SubmissionSlot};

/// Fires due presentations and otherwise feeds the next input after its
/// delay, until the block completes.
pub fn run_headless<P, S, I>(
    engine: &mut TrialEngine<P, ManualTimer, S>,
    source: &mut I,
) -> Result<ResultSequences, IatError>
where
    P: Presenter,
    S: Submission,
    I: InputSource + ?Sized,
{
    while !engine.is_complete() {
        if let Some(due) = engine.next_deadline() {
            engine.timer().advance_to(due);
            engine.tick()?;
            continue;
        }

        let Some(input) = source.next_input() else {
            return Err(IatError::InputExhausted {
                recorded: engine.results().len(),
                total: engine.trial_count(),
            });
        };
        engine.timer().advance(input.after);
        let outcome = engine.handle_input(input.code.as_str())?;
        trace!(code = %input.code, ?outcome, "headless input");
    }

    Ok(engine.result_sequences())
}

/// Runs a whole block with synthetic input and returns what was submitted.
pub fn run_debug<P>(block: Block, config: &DebugConfig, presenter: P) -> Result<ResultSequences, IatError>
where
    P: Presenter,
{
    config.validate()?;
    let mut source = DebugInput::from_config(block.start_code.clone(), &block.mapping, config);
    let slot = SubmissionSlot::new();
    let mut engine = TrialEngine::new(block, presenter, ManualTimer::new(), slot.clone())?;
    run_headless(&mut engine, &mut source)?;
    slot.take().ok_or(IatError::InputExhausted {
        recorded: engine.results().len(),
        total: engine.trial_count(),
    })
}
