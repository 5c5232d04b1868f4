use std::collections::VecDeque;
use std::time::Duration;

use iat_core::{InputCode, ResponseMapping};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::DebugConfig;

/// One input event and how long after the engine became ready it arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedInput {
    pub code: InputCode,
    pub after: Duration,
}

impl TimedInput {
    pub fn new(code: impl Into<InputCode>, after: Duration) -> Self {
        Self {
            code: code.into(),
            after,
        }
    }

    pub fn after_ms(code: impl Into<InputCode>, ms: u64) -> Self {
        Self::new(code, Duration::from_millis(ms))
    }
}

/// Anything that produces input events for a block.
pub trait InputSource {
    fn next_input(&mut self) -> Option<TimedInput>;
}

/// Fixed, pre-recorded sequence of inputs.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    queue: VecDeque<TimedInput>,
}

impl ScriptedInput {
    pub fn new(inputs: impl IntoIterator<Item = TimedInput>) -> Self {
        Self {
            queue: inputs.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl InputSource for ScriptedInput {
    fn next_input(&mut self) -> Option<TimedInput> {
        self.queue.pop_front()
    }
}

/// Synthetic participant: sends the start signal, then presses one of the
/// two mapped codes at random after a random reaction time.
#[derive(Debug, Clone)]
pub struct DebugInput<R: Rng> {
    rng: R,
    start_code: InputCode,
    codes: [InputCode; 2],
    reaction_time_range_ms: (u64, u64),
    started: bool,
}

impl<R: Rng> DebugInput<R> {
    pub fn new(
        rng: R,
        start_code: InputCode,
        mapping: &ResponseMapping,
        reaction_time_range_ms: (u64, u64),
    ) -> Self {
        let [left, right] = mapping.codes();
        Self {
            rng,
            start_code,
            codes: [left.clone(), right.clone()],
            reaction_time_range_ms,
            started: false,
        }
    }
}

impl DebugInput<StdRng> {
    pub fn from_config(start_code: InputCode, mapping: &ResponseMapping, config: &DebugConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(rng, start_code, mapping, config.reaction_time_range_ms)
    }
}

impl<R: Rng> InputSource for DebugInput<R> {
    fn next_input(&mut self) -> Option<TimedInput> {
        if !self.started {
            self.started = true;
            return Some(TimedInput::new(self.start_code.clone(), Duration::ZERO));
        }
        let (min, max) = self.reaction_time_range_ms;
        let ms = self.rng.random_range(min..=max);
        let code = self.codes[self.rng.random_range(0..2usize)].clone();
        Some(TimedInput::after_ms(code, ms))
    }
}
