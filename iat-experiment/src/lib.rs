pub mod aggregator;
pub mod config;
pub mod engine;
pub mod generate;
pub mod input;
pub mod presenter;
pub mod runner;
pub mod schedule;
pub mod sequencer;
pub mod submission;

pub use aggregator::{DEFAULT_DELIMITER, ResultAggregator, ResultSequences, SerializedResults};
pub use config::{Block, BlockConfig, DebugConfig, MappingConfig};
pub use engine::{BlockState, InputOutcome, TrialEngine};
pub use generate::{BlockDefinition, StimulusPool};
pub use input::{DebugInput, InputSource, ScriptedInput, TimedInput};
pub use presenter::{LogPresenter, Presenter, PresenterCall, RecordingPresenter};
pub use runner::{run_debug, run_headless};
pub use schedule::Schedule;
pub use sequencer::TrialSequencer;
pub use submission::{Submission, SubmissionSlot};
