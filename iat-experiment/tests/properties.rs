use iat_core::{Category, ResponseMapping, Side, Trial};
use iat_experiment::{
    Block, RecordingPresenter, ScriptedInput, SubmissionSlot, TimedInput, TrialEngine, run_headless,
};
use iat_timing::ManualTimer;
use proptest::prelude::*;

const CODES: [&str; 4] = ["A", "L", "Z", "Space"];

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

fn trials(kinds: &[bool]) -> Vec<Trial> {
    kinds
        .iter()
        .enumerate()
        .map(|(i, flower)| {
            let id = (i + 1).to_string();
            if *flower {
                Trial::new(id, "rose", "flower", "positive")
            } else {
                Trial::new(id, "wasp", "insect", "negative")
            }
        })
        .collect()
}

/// Random presses followed by enough alternating presses to finish any block.
fn script(presses: &[(usize, u64)], n: usize) -> ScriptedInput {
    let random = presses
        .iter()
        .map(|(code, ms)| TimedInput::after_ms(CODES[*code], *ms));
    let finish = (0..n).flat_map(|_| {
        [
            TimedInput::after_ms("A", 300),
            TimedInput::after_ms("L", 300),
        ]
    });
    ScriptedInput::new(
        std::iter::once(TimedInput::after_ms("Space", 0))
            .chain(random)
            .chain(finish),
    )
}

proptest! {
    #[test]
    fn every_trial_gets_exactly_one_consistent_result(
        kinds in prop::collection::vec(any::<bool>(), 1..12),
        presses in prop::collection::vec((0..CODES.len(), 0u64..3_000), 0..40),
    ) {
        let block_trials = trials(&kinds);
        let slot = SubmissionSlot::new();
        let mut engine = TrialEngine::new(
            Block::new(block_trials.clone(), mapping(), 250),
            RecordingPresenter::new(),
            ManualTimer::new(),
            slot.clone(),
        ).unwrap();

        let mut src = script(&presses, kinds.len());
        let out = run_headless(&mut engine, &mut src).unwrap();

        let n = block_trials.len();
        prop_assert_eq!(out.trial_ids.len(), n);
        prop_assert_eq!(out.input_codes.len(), n);
        prop_assert_eq!(out.reaction_times_ms.len(), n);
        prop_assert_eq!(out.correct.len(), n);
        prop_assert_eq!(slot.submissions(), 1);

        let m = mapping();
        for (i, trial) in block_trials.iter().enumerate() {
            prop_assert_eq!(&out.trial_ids[i], &trial.id);
            let side = m.side_of(&out.input_codes[i]);
            prop_assert!(side.is_some());
            let expected = m.correct_side_for_trial(trial).unwrap();
            let flagged = out.correct[i] == "1";
            prop_assert_eq!(flagged, side == Some(expected));
            prop_assert!(out.reaction_times_ms[i].parse::<u64>().is_ok());
        }

        let progress = engine.presenter().progress_updates();
        prop_assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        prop_assert_eq!(progress.last().copied(), Some(1.0));
    }

    #[test]
    fn unmapped_input_never_changes_state(
        kinds in prop::collection::vec(any::<bool>(), 1..6),
        prefix in prop::collection::vec(0..2usize, 0..6),
    ) {
        let clock = ManualTimer::new();
        let mut engine = TrialEngine::new(
            Block::new(trials(&kinds), mapping(), 250),
            RecordingPresenter::new(),
            clock.clone(),
            SubmissionSlot::new(),
        ).unwrap();

        let mut inputs = vec!["Space"];
        inputs.extend(prefix.iter().map(|i| CODES[*i]));
        for code in inputs {
            clock.advance_ms(100);
            engine.handle_input(code).unwrap();
            if engine.next_deadline().is_some() {
                clock.advance_ms(250);
                engine.tick().unwrap();
            }
        }

        let cursor = engine.cursor();
        let phase = engine.phase();
        let results = engine.results().to_vec();
        let state = engine.state().clone();
        engine.handle_input("Z").unwrap();
        prop_assert_eq!(engine.cursor(), cursor);
        prop_assert_eq!(engine.phase(), phase);
        prop_assert_eq!(engine.results(), results.as_slice());
        prop_assert_eq!(engine.state(), &state);
    }
}
