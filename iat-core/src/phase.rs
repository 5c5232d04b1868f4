use serde::{Deserialize, Serialize};

/// Block lifecycle. `Complete` is terminal.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BlockPhase {
    #[default]
    AwaitingStart,
    Running,
    Complete,
}

impl BlockPhase {
    pub fn next(&self) -> Option<Self> {
        use BlockPhase::*;
        Some(match self {
            AwaitingStart => Running,
            Running => Complete,
            Complete => return None,
        })
    }

    pub fn allows_response(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phases_advance_once_and_terminate() {
        let phase = BlockPhase::default();
        assert_eq!(phase, BlockPhase::AwaitingStart);
        assert!(!phase.allows_response());
        let running = phase.next().unwrap();
        assert!(running.allows_response());
        let complete = running.next().unwrap();
        assert!(complete.is_complete());
        assert_eq!(complete.next(), None);
    }
}
