use thiserror::Error;

/// Problems with the block setup. Fatal; raised at construction or first lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("no correct side configured for stimulus class `{class}` level `{level}`")]
    UnmappedCategory { class: String, level: String },
    #[error("category `{class}/{level}` is assigned to both sides")]
    CategoryOnBothSides { class: String, level: String },
    #[error("a result for trial `{trial_id}` has already been recorded")]
    DuplicateResult { trial_id: String },
    #[error("trial id `{trial_id}` appears more than once in the block")]
    DuplicateTrialId { trial_id: String },
    #[error("both sides are bound to the same input code `{code}`")]
    IdenticalResponseCodes { code: String },
    #[error("start code `{code}` is also bound to a response side")]
    StartCodeIsResponseCode { code: String },
    #[error("inter-trial delay must be positive")]
    ZeroInterTrialDelay,
    #[error("block contains no trials")]
    EmptyBlock,
    #[error("number of stimuli ({found}) does not match the block size (n={expected})")]
    StimulusCountMismatch { expected: usize, found: usize },
    #[error("stimulus pool has no entry for `{class}/{level}`")]
    UnknownPoolEntry { class: String, level: String },
    #[error("block needs either a trial list or a generate section, not {0}")]
    TrialSource(&'static str),
    #[error("invalid reaction-time range {min}..={max} ms")]
    InvalidReactionTimeRange { min: u64, max: u64 },
    #[error("failed to read block config: {0}")]
    Read(String),
    #[error("failed to parse block config: {0}")]
    Parse(String),
}

/// Cursor misuse. These are programmer errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequencingError {
    #[error("trial cursor {cursor} is past the end of the block ({len} trials)")]
    CursorOutOfRange { cursor: usize, len: usize },
    #[error("a presentation is already scheduled")]
    AlreadyScheduled,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IatError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Sequencing(#[from] SequencingError),
    #[error("input source ran dry after {recorded} of {total} trials")]
    InputExhausted { recorded: usize, total: usize },
}
