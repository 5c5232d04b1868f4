use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use iat_core::{Category, ConfigurationError, InputCode, ResponseMapping, Side, Trial};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::generate::{BlockDefinition, StimulusPool};

pub const DEFAULT_INTER_TRIAL_DELAY_MS: u64 = 250;
pub const DEFAULT_START_CODE: &str = "Space";
pub const DEFAULT_LEFT_CODE: &str = "KeyE";
pub const DEFAULT_RIGHT_CODE: &str = "KeyI";
pub const DEFAULT_REACTION_TIME_RANGE_MS: (u64, u64) = (300, 1500);

/// One block as read from a JSON document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockConfig {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub notice: Option<String>,
    #[serde(default)]
    pub is_practice: bool,
    #[serde(default)]
    pub trials: Vec<Trial>,
    #[serde(default)]
    pub generate: Option<GenerateConfig>,
    #[serde(default)]
    pub mapping: MappingConfig,
    #[serde(default = "default_inter_trial_delay_ms")]
    pub inter_trial_delay_ms: u64,
    #[serde(default = "default_start_code")]
    pub start_code: InputCode,
    #[serde(default)]
    pub left_label: String,
    #[serde(default)]
    pub right_label: String,
    #[serde(default)]
    pub debug: Option<DebugConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingConfig {
    #[serde(default = "default_left_code")]
    pub left_code: InputCode,
    #[serde(default = "default_right_code")]
    pub right_code: InputCode,
    /// Explicit correctness table entries.
    #[serde(default)]
    pub correct: Vec<CorrectSide>,
    /// Categories answered with the left code.
    #[serde(default)]
    pub left: Vec<Category>,
    /// Categories answered with the right code.
    #[serde(default)]
    pub right: Vec<Category>,
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            left_code: default_left_code(),
            right_code: default_right_code(),
            correct: Vec::new(),
            left: Vec::new(),
            right: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectSide {
    pub class: String,
    pub level: String,
    pub side: Side,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateConfig {
    pub pool: StimulusPool,
    #[serde(flatten)]
    pub definition: BlockDefinition,
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Run the synthetic block even without `--debug`.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_reaction_time_range_ms")]
    pub reaction_time_range_ms: (u64, u64),
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            reaction_time_range_ms: DEFAULT_REACTION_TIME_RANGE_MS,
            seed: None,
        }
    }
}

impl DebugConfig {
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let (min, max) = self.reaction_time_range_ms;
        if min > max {
            return Err(ConfigurationError::InvalidReactionTimeRange { min, max });
        }
        Ok(())
    }
}

fn default_inter_trial_delay_ms() -> u64 {
    DEFAULT_INTER_TRIAL_DELAY_MS
}

fn default_start_code() -> InputCode {
    DEFAULT_START_CODE.into()
}

fn default_left_code() -> InputCode {
    DEFAULT_LEFT_CODE.into()
}

fn default_right_code() -> InputCode {
    DEFAULT_RIGHT_CODE.into()
}

fn default_reaction_time_range_ms() -> (u64, u64) {
    DEFAULT_REACTION_TIME_RANGE_MS
}

impl BlockConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigurationError> {
        serde_json::from_str(json).map_err(|e| ConfigurationError::Parse(e.to_string()))
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::Read(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&raw)
    }

    /// Correctness table gathered from the mapping section and, when present,
    /// the generated block's side lists.
    pub fn response_mapping(&self) -> Result<ResponseMapping, ConfigurationError> {
        let m = &self.mapping;
        let mut left = m.left.clone();
        let mut right = m.right.clone();
        if let Some(generate) = &self.generate {
            left.extend(generate.definition.left.iter().cloned());
            right.extend(generate.definition.right.iter().cloned());
        }

        let table = m
            .correct
            .iter()
            .map(|c| (Category::new(c.class.as_str(), c.level.as_str()), c.side))
            .chain(left.into_iter().map(|c| (c, Side::Left)))
            .chain(right.into_iter().map(|c| (c, Side::Right)));

        ResponseMapping::new(m.left_code.clone(), m.right_code.clone(), table)
    }

    /// Resolves the trial list, generating it from the pool when asked to.
    pub fn build_trials<R>(&self, rng: &mut R) -> Result<Vec<Trial>, ConfigurationError>
    where
        R: Rng + ?Sized,
    {
        match (&self.generate, self.trials.is_empty()) {
            (Some(_), false) => Err(ConfigurationError::TrialSource("both")),
            (Some(generate), true) => match generate.seed {
                Some(seed) => {
                    let mut seeded = StdRng::seed_from_u64(seed);
                    generate.definition.generate(&generate.pool, &mut seeded)
                }
                None => generate.definition.generate(&generate.pool, rng),
            },
            (None, false) => Ok(self.trials.clone()),
            (None, true) => Err(ConfigurationError::TrialSource("neither")),
        }
    }

    /// Settings for a synthetic run, if one was requested by `force` or by
    /// `debug.enabled`. A `debug` section alone only tunes the run.
    pub fn synthetic_run(&self, force: bool) -> Option<DebugConfig> {
        match self.debug {
            Some(debug) if force || debug.enabled => Some(debug),
            None if force => Some(DebugConfig::default()),
            _ => None,
        }
    }

    /// Produces the validated inputs the engine runs on.
    pub fn build<R>(&self, rng: &mut R) -> Result<Block, ConfigurationError>
    where
        R: Rng + ?Sized,
    {
        if let Some(debug) = &self.debug {
            debug.validate()?;
        }
        let block = Block {
            trials: self.build_trials(rng)?,
            mapping: self.response_mapping()?,
            inter_trial_delay_ms: self.inter_trial_delay_ms,
            start_code: self.start_code.clone(),
        };
        block.validate()?;
        Ok(block)
    }
}

/// Everything the trial engine needs to run one block.
#[derive(Debug, Clone)]
pub struct Block {
    pub trials: Vec<Trial>,
    pub mapping: ResponseMapping,
    pub inter_trial_delay_ms: u64,
    pub start_code: InputCode,
}

impl Block {
    pub fn new(trials: Vec<Trial>, mapping: ResponseMapping, inter_trial_delay_ms: u64) -> Self {
        Self {
            trials,
            mapping,
            inter_trial_delay_ms,
            start_code: default_start_code(),
        }
    }

    pub fn with_start_code(mut self, code: impl Into<InputCode>) -> Self {
        self.start_code = code.into();
        self
    }

    pub fn inter_trial_delay(&self) -> Duration {
        Duration::from_millis(self.inter_trial_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.trials.is_empty() {
            return Err(ConfigurationError::EmptyBlock);
        }
        if self.inter_trial_delay_ms == 0 {
            return Err(ConfigurationError::ZeroInterTrialDelay);
        }
        if self.mapping.side_of(self.start_code.as_str()).is_some() {
            return Err(ConfigurationError::StartCodeIsResponseCode {
                code: self.start_code.to_string(),
            });
        }

        let mut ids = HashSet::with_capacity(self.trials.len());
        for trial in &self.trials {
            if !ids.insert(trial.id.as_str()) {
                return Err(ConfigurationError::DuplicateTrialId {
                    trial_id: trial.id.clone(),
                });
            }
        }

        self.mapping.validate_trials(&self.trials)
    }
}
