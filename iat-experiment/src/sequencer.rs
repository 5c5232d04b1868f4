use iat_core::{SequencingError, Trial};

/// Ordered trial list with a forward-only cursor.
#[derive(Debug, Clone)]
pub struct TrialSequencer {
    trials: Vec<Trial>,
    cursor: usize,
}

impl TrialSequencer {
    pub fn new(trials: Vec<Trial>) -> Self {
        Self { trials, cursor: 0 }
    }

    pub fn current(&self) -> Result<&Trial, SequencingError> {
        self.trials
            .get(self.cursor)
            .ok_or(SequencingError::CursorOutOfRange {
                cursor: self.cursor,
                len: self.trials.len(),
            })
    }

    /// Moves to the next trial. Returns whether one remains.
    pub fn advance(&mut self) -> bool {
        if self.cursor < self.trials.len() {
            self.cursor += 1;
        }
        !self.is_complete()
    }

    pub fn is_complete(&self) -> bool {
        self.cursor >= self.trials.len()
    }

    /// Share of the block covered once the current trial is done.
    pub fn progress_fraction(&self) -> f64 {
        if self.is_complete() || self.trials.is_empty() {
            return 1.0;
        }
        (self.cursor + 1) as f64 / self.trials.len() as f64
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.trials.len()
    }
}
