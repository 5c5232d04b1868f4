pub mod timer;

pub use timer::{saturating_nanos, HighPrecisionTimer, ManualTimer, Timer};
