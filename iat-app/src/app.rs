use anyhow::{Result, anyhow};
use iat_experiment::{Block, SubmissionSlot, TrialEngine};
use iat_render::{Scene, ScenePresenter, SkiaRenderer};
use iat_timing::HighPrecisionTimer;
use pixels::{Pixels, SurfaceTexture};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Fullscreen, Window, WindowId},
};

use crate::output::write_results;

type Engine = TrialEngine<ScenePresenter, HighPrecisionTimer, SubmissionSlot>;

pub struct AppOptions {
    pub font_path: PathBuf,
    pub output: Option<PathBuf>,
    pub delimiter: String,
    pub title: String,
}

pub struct App {
    window: Option<Arc<Window>>,
    pixels: Option<Pixels<'static>>,
    renderer: Option<SkiaRenderer>,
    engine: Engine,
    submission: SubmissionSlot,
    options: AppOptions,
    scale_factor: f64,
    refresh_rate: Option<f64>,

    submitted: bool,
    failure: Option<anyhow::Error>,
}

impl App {
    pub fn new(block: Block, scene: Scene, options: AppOptions) -> Result<Self> {
        let submission = SubmissionSlot::new();
        let engine = TrialEngine::new(
            block,
            ScenePresenter::new(scene),
            HighPrecisionTimer::new(),
            submission.clone(),
        )?;

        Ok(Self {
            window: None,
            pixels: None,
            renderer: None,
            engine,
            submission,
            options,
            scale_factor: 1.0,
            refresh_rate: None,
            submitted: false,
            failure: None,
        })
    }

    pub fn run(mut self) -> Result<()> {
        let event_loop = EventLoop::new()?;
        info!(
            platform = std::env::consts::OS,
            arch = std::env::consts::ARCH,
            start = %self.engine.start_code(),
            "waiting for start signal"
        );

        event_loop.run_app(&mut self)?;

        if let Some(err) = self.failure.take() {
            return Err(err);
        }
        if !self.submitted {
            warn!(
                recorded = self.engine.results().len(),
                total = self.engine.trial_count(),
                "block abandoned before completion"
            );
        }
        Ok(())
    }

    fn create_window_and_surface(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let primary_monitor = event_loop
            .primary_monitor()
            .or_else(|| event_loop.available_monitors().next())
            .ok_or_else(|| anyhow!("No monitor available"))?;

        self.refresh_rate = primary_monitor
            .refresh_rate_millihertz()
            .map(|rate| rate as f64 / 1000.0);

        let window_attributes = Window::default_attributes()
            .with_title(self.options.title.clone())
            .with_fullscreen(Some(Fullscreen::Borderless(Some(primary_monitor.clone()))))
            .with_resizable(false);

        let window = Arc::new(event_loop.create_window(window_attributes)?);
        let physical_size = window.inner_size();
        self.scale_factor = window.scale_factor();

        info!(
            width = physical_size.width,
            height = physical_size.height,
            scale = self.scale_factor,
            refresh_hz = ?self.refresh_rate,
            "display configured"
        );

        let surface_texture =
            SurfaceTexture::new(physical_size.width, physical_size.height, window.clone());
        self.pixels = Some(Pixels::new(
            physical_size.width,
            physical_size.height,
            surface_texture,
        )?);
        self.renderer = Some(SkiaRenderer::from_font_path(
            physical_size.width,
            physical_size.height,
            &self.options.font_path,
        )?);

        window.set_cursor_visible(false);
        window.request_redraw();
        self.window = Some(window);

        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        let phase = self.engine.phase();
        self.engine.presenter_mut().set_phase(phase);
        self.engine.presenter_mut().take_dirty();

        let (Some(pix), Some(renderer)) = (self.pixels.as_mut(), self.renderer.as_mut()) else {
            return Ok(());
        };
        let stats = renderer.render_frame(self.engine.presenter().scene(), pix.frame_mut())?;
        pix.render()?;

        trace!(
            draw_ms = stats.draw.as_secs_f64() * 1e3,
            copy_ms = stats.copy.as_secs_f64() * 1e3,
            total_ms = stats.total.as_secs_f64() * 1e3,
            "frame"
        );
        Ok(())
    }

    fn handle_input(&mut self, key: PhysicalKey, event_loop: &ActiveEventLoop) -> Result<()> {
        let PhysicalKey::Code(code) = key else {
            return Ok(());
        };
        if code == KeyCode::Escape {
            self.exit(event_loop);
            return Ok(());
        }

        // winit's KeyCode names match the DOM `code` strings, e.g. "KeyE".
        let name = format!("{code:?}");
        let outcome = self.engine.handle_input(&name)?;
        debug!(code = %name, ?outcome, "key");
        self.after_transition(event_loop)
    }

    /// Hands results off once the block is over and keeps the window in sync.
    fn after_transition(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        if self.engine.is_complete() && !self.submitted {
            if let Some(results) = self.submission.take() {
                write_results(
                    &results.join(&self.options.delimiter),
                    self.options.output.as_deref(),
                )?;
                self.submitted = true;
                info!(trials = results.len(), "results submitted");
            }
            self.exit(event_loop);
        }

        let phase = self.engine.phase();
        self.engine.presenter_mut().set_phase(phase);
        if self.engine.presenter_mut().take_dirty() {
            if let Some(window) = &self.window {
                window.request_redraw();
            }
        }
        Ok(())
    }

    fn handle_resize(&mut self, new_size: PhysicalSize<u32>) {
        if let Some(pixels) = &mut self.pixels {
            if let Err(e) = pixels.resize_surface(new_size.width, new_size.height) {
                warn!("failed to resize surface: {e}");
            }
            if let Err(e) = pixels.resize_buffer(new_size.width, new_size.height) {
                warn!("failed to resize buffer: {e}");
            }
        }
        if let Some(renderer) = &mut self.renderer {
            if let Err(e) = renderer.resize(new_size.width, new_size.height) {
                warn!("failed to resize canvas: {e}");
            }
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
        debug!(width = new_size.width, height = new_size.height, "display resized");
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.failure = Some(err);
        self.exit(event_loop);
    }

    fn exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.set_cursor_visible(true);
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(e) = self.create_window_and_surface(event_loop) {
                self.fail(event_loop, e.context("creating window and surface"));
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let result = match event {
            WindowEvent::CloseRequested => {
                self.exit(event_loop);
                Ok(())
            }
            WindowEvent::RedrawRequested => self.render(),
            // One event per physical press: releases and auto-repeat are dropped.
            WindowEvent::KeyboardInput { event, .. } if event.state.is_pressed() && !event.repeat => {
                self.handle_input(event.physical_key, event_loop)
            }
            WindowEvent::Resized(sz) => {
                self.handle_resize(sz);
                Ok(())
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                self.scale_factor = scale_factor;
                if let Some(window) = &self.window {
                    let size = window.inner_size();
                    self.handle_resize(size);
                }
                Ok(())
            }
            _ => Ok(()),
        };
        if let Err(e) = result {
            self.fail(event_loop, e);
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let fired = match self.engine.tick() {
            Ok(fired) => fired,
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };
        if fired {
            if let Err(e) = self.after_transition(event_loop) {
                self.fail(event_loop, e);
                return;
            }
        }

        match self
            .engine
            .next_deadline()
            .and_then(|due| self.engine.timer().instant_at(due))
        {
            Some(at) => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }
}
