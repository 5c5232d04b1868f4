use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::aggregator::ResultSequences;

/// Host hook invoked once, when the last trial of the block has a result.
pub trait Submission {
    fn submit(&mut self, results: ResultSequences);
}

impl Submission for Box<dyn FnMut(ResultSequences)> {
    fn submit(&mut self, results: ResultSequences) {
        (**self)(results)
    }
}

/// Holds the submitted results until the host collects them. Clones share
/// the same slot.
#[derive(Debug, Clone, Default)]
pub struct SubmissionSlot {
    inner: Rc<RefCell<Option<ResultSequences>>>,
    submissions: Rc<Cell<usize>>,
}

impl SubmissionSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Option<ResultSequences> {
        self.inner.borrow_mut().take()
    }

    pub fn peek(&self) -> Option<ResultSequences> {
        self.inner.borrow().clone()
    }

    /// How many times the engine has submitted into this slot.
    pub fn submissions(&self) -> usize {
        self.submissions.get()
    }
}

impl Submission for SubmissionSlot {
    fn submit(&mut self, results: ResultSequences) {
        *self.inner.borrow_mut() = Some(results);
        self.submissions.set(self.submissions.get() + 1);
    }
}
