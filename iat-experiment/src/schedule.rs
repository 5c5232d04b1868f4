use iat_core::SequencingError;

/// At most one pending delayed callback, identified by its due time in
/// timer nanoseconds. There is no cancellation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Schedule {
    due: Option<u64>,
}

impl Schedule {
    pub fn arm(&mut self, due: u64) -> Result<(), SequencingError> {
        if self.due.is_some() {
            return Err(SequencingError::AlreadyScheduled);
        }
        self.due = Some(due);
        Ok(())
    }

    pub fn due(&self) -> Option<u64> {
        self.due
    }

    pub fn is_armed(&self) -> bool {
        self.due.is_some()
    }

    /// Disarms and reports `true` if the callback is due at `now`.
    pub fn take_if_due(&mut self, now: u64) -> bool {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                true
            }
            _ => false,
        }
    }

    /// Disarms regardless of time; `true` if something was pending.
    pub fn take(&mut self) -> bool {
        self.due.take().is_some()
    }
}
