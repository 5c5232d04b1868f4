pub mod render;
pub mod scene;

pub use render::{FrameStats, SkiaRenderer};
pub use scene::{Scene, ScenePresenter};
