use iat_core::Trial;
use tracing::debug;

/// Display side effects driven by the trial engine. The engine never reads
/// presenter state back.
pub trait Presenter {
    fn show_stimulus(&mut self, trial: &Trial);
    fn hide_stimulus(&mut self);
    fn show_error_feedback(&mut self);
    fn hide_error_feedback(&mut self);
    fn update_progress(&mut self, fraction: f64);
}

/// Headless presenter that only emits trace events.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn show_stimulus(&mut self, trial: &Trial) {
        debug!(trial = %trial.id, stimulus = %trial.stimulus, "show stimulus");
    }
    fn hide_stimulus(&mut self) {
        debug!("hide stimulus");
    }
    fn show_error_feedback(&mut self) {
        debug!("show error feedback");
    }
    fn hide_error_feedback(&mut self) {
        debug!("hide error feedback");
    }
    fn update_progress(&mut self, fraction: f64) {
        debug!(progress = fraction, "update progress");
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresenterCall {
    ShowStimulus(String),
    HideStimulus,
    ShowErrorFeedback,
    HideErrorFeedback,
    UpdateProgress(f64),
}

/// Keeps every call in order; used to inspect what a block displayed.
#[derive(Debug, Clone, Default)]
pub struct RecordingPresenter {
    pub calls: Vec<PresenterCall>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn progress_updates(&self) -> Vec<f64> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PresenterCall::UpdateProgress(f) => Some(*f),
                _ => None,
            })
            .collect()
    }

    pub fn shown_stimuli(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                PresenterCall::ShowStimulus(id) => Some(id.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Presenter for RecordingPresenter {
    fn show_stimulus(&mut self, trial: &Trial) {
        self.calls.push(PresenterCall::ShowStimulus(trial.id.clone()));
    }
    fn hide_stimulus(&mut self) {
        self.calls.push(PresenterCall::HideStimulus);
    }
    fn show_error_feedback(&mut self) {
        self.calls.push(PresenterCall::ShowErrorFeedback);
    }
    fn hide_error_feedback(&mut self) {
        self.calls.push(PresenterCall::HideErrorFeedback);
    }
    fn update_progress(&mut self, fraction: f64) {
        self.calls.push(PresenterCall::UpdateProgress(fraction));
    }
}
