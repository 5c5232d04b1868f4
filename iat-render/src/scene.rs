use iat_core::{BlockPhase, Trial};
use iat_experiment::Presenter;

/// Everything visible on screen at one moment.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    pub phase: BlockPhase,
    pub stimulus: Option<String>,
    pub error_feedback: bool,
    pub progress: f64,
    pub left_label: String,
    pub right_label: String,
    pub notice: Option<String>,
    pub start_hint: String,
}

/// Presenter that keeps a [`Scene`] up to date for the renderer.
#[derive(Debug, Clone, Default)]
pub struct ScenePresenter {
    scene: Scene,
    dirty: bool,
}

impl ScenePresenter {
    pub fn new(scene: Scene) -> Self {
        Self { scene, dirty: true }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Phase is owned by the engine; the host copies it in before drawing.
    pub fn set_phase(&mut self, phase: BlockPhase) {
        if self.scene.phase != phase {
            self.scene.phase = phase;
            self.dirty = true;
        }
    }

    /// Returns whether the scene changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl Presenter for ScenePresenter {
    fn show_stimulus(&mut self, trial: &Trial) {
        self.scene.stimulus = Some(trial.stimulus.clone());
        self.dirty = true;
    }

    fn hide_stimulus(&mut self) {
        self.dirty |= self.scene.stimulus.take().is_some();
    }

    fn show_error_feedback(&mut self) {
        self.scene.error_feedback = true;
        self.dirty = true;
    }

    fn hide_error_feedback(&mut self) {
        self.dirty |= std::mem::take(&mut self.scene.error_feedback);
    }

    fn update_progress(&mut self, fraction: f64) {
        self.scene.progress = fraction.clamp(0.0, 1.0);
        self.dirty = true;
    }
}
