use serde::{Deserialize, Serialize};
use std::fmt;

use crate::side::InputCode;

/// Stimulus class and level pair, e.g. `("words", "positive")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category {
    pub class: String,
    pub level: String,
}

impl Category {
    pub fn new(class: impl Into<String>, level: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            level: level.into(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.class, self.level)
    }
}

/// A single stimulus presentation, immutable once the block is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trial {
    pub id: String,
    pub stimulus: String,
    pub stimulus_class: String,
    pub stimulus_level: String,
}

impl Trial {
    pub fn new(
        id: impl Into<String>,
        stimulus: impl Into<String>,
        stimulus_class: impl Into<String>,
        stimulus_level: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            stimulus: stimulus.into(),
            stimulus_class: stimulus_class.into(),
            stimulus_level: stimulus_level.into(),
        }
    }
}

/// Recorded outcome of one trial. `input_code` is the key that ended the
/// timed response, which for an error is the first (wrong) key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    pub trial_id: String,
    pub input_code: InputCode,
    pub reaction_time_ms: u64,
    pub correct: bool,
}
