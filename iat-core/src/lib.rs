pub mod error;
pub mod mapping;
pub mod phase;
pub mod side;
pub mod trial;

pub use error::{ConfigurationError, IatError, SequencingError};
pub use mapping::ResponseMapping;
pub use phase::BlockPhase;
pub use side::{InputCode, Side};
pub use trial::{Category, Trial, TrialResult};
