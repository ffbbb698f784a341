use std::sync::Arc;

use glam::Vec2;
use instant::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::assets;
use crate::audio::{RodioBackend, SoundBoard};
use crate::blob::BlobAnimator;
use crate::config::Config;
use crate::debug::{BlobStats, DebugOverlay};
use crate::error::{BlobError, Result};
use crate::motion::{ElementSize, Viewport};
use crate::render::instance::SpriteInstance;
use crate::render::pipeline::MAX_INSTANCES;
use crate::render::GpuState;
use crate::toy::BlobToy;

/// Longest frame step fed to the tweens. A stalled window shouldn't skip whole moves.
const MAX_FRAME_DT: f64 = 0.25;

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// Top-level application state.
struct App {
    config: Config,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    overlay: Option<DebugOverlay>,
    toy: Option<BlobToy<RodioBackend>>,

    /// Last known pointer position in window pixels.
    cursor: Vec2,
    last_frame_time: Option<Instant>,

    // Background + blob, rebuilt each frame
    instance_buf: [SpriteInstance; MAX_INSTANCES],

    /// Set when startup fails; returned from `run` after the loop exits.
    fatal: Option<BlobError>,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            config,
            window: None,
            gpu: None,
            overlay: None,
            toy: None,
            cursor: Vec2::ZERO,
            last_frame_time: None,
            instance_buf: [SpriteInstance::fullscreen(Viewport::new(1.0, 1.0)); MAX_INSTANCES],
            fatal: None,
        }
    }

    /// Bring everything up in order: collaborators, then the blob, then sounds.
    fn setup(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        // Diagnostic only; runs in the background while we carry on.
        let _ = assets::probe(&self.config.assets);

        let (w, h) = self.config.initial_size;
        let attrs = WindowAttributes::default()
            .with_title(self.config.title)
            .with_inner_size(winit::dpi::LogicalSize::new(w, h));

        let window = Arc::new(event_loop.create_window(attrs).map_err(|e| {
            BlobError::MissingCollaborator {
                what: "window",
                reason: e.to_string(),
            }
        })?);

        let mut gpu = GpuState::new(window.clone())?;
        log::info!("wgpu + sprite pipeline initialized");
        let audio = RodioBackend::new()?;

        let blob_img = assets::load_blob(&self.config.assets.blob)?;
        if blob_img.width() == 0 || blob_img.height() == 0 {
            return Err(BlobError::MissingElement {
                path: self.config.assets.blob.clone(),
                reason: "image is empty".into(),
            });
        }
        gpu.set_blob_texture(&blob_img);
        if let Some(bg) = assets::load_background(&self.config.assets.background) {
            gpu.set_background_texture(&bg);
        }

        let (bw, bh) = assets::fit_within(
            blob_img.width(),
            blob_img.height(),
            self.config.max_blob_extent,
        );
        let size = window.inner_size();
        let viewport = Viewport::new(size.width as f32, size.height as f32);

        let sounds = SoundBoard::new(audio, &self.config.assets, &self.config.audio);
        let animator = BlobAnimator::new(
            viewport,
            ElementSize::new(bw, bh),
            self.config.motion,
            fastrand::Rng::new(),
        );
        self.toy = Some(BlobToy::new(animator, sounds));

        self.overlay = Some(DebugOverlay::new(&window, &gpu));
        self.gpu = Some(gpu);

        event_loop.set_control_flow(ControlFlow::Poll);
        self.window = Some(window);
        Ok(())
    }

    fn pointer_down(&mut self, point: Vec2) {
        if let Some(toy) = &mut self.toy {
            if toy.on_pointer_down(point) {
                log::debug!("Blob poked at ({:.0}, {:.0})", point.x, point.y);
            }
        }
    }

    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(toy) = &mut self.toy {
            toy.shutdown();
        }
        event_loop.exit();
    }

    /// Build instance buffer from the blob's transform.
    fn build_instances(&mut self) {
        let Some(toy) = &self.toy else {
            return;
        };
        let viewport = toy.animator.viewport();
        self.instance_buf = [
            SpriteInstance::fullscreen(viewport),
            SpriteInstance::from_transform(toy.animator.transform(), toy.animator.size()),
        ];
    }

    fn redraw(&mut self) {
        // --- Timing ---
        let now = Instant::now();
        if let Some(last) = self.last_frame_time {
            let dt = now.duration_since(last).as_secs_f64();
            let paused = self.overlay.as_ref().is_some_and(|o| o.paused);
            if let Some(overlay) = &mut self.overlay {
                overlay.record_frame(dt);
            }
            if let Some(toy) = &mut self.toy {
                if !paused {
                    toy.update(dt.min(MAX_FRAME_DT) as f32);
                }
            }
        }
        self.last_frame_time = Some(now);

        self.build_instances();

        let (Some(gpu), Some(window)) = (&self.gpu, &self.window) else {
            return;
        };
        gpu.update_instances(&self.instance_buf);

        let Some(mut frame) = gpu.begin_frame() else {
            return;
        };
        gpu.draw_sprites(&mut frame.encoder, &frame.view);

        let Some(overlay) = &mut self.overlay else {
            gpu.finish_frame(frame.encoder, frame.output, Vec::new());
            return;
        };

        overlay.blob = self.toy.as_ref().map(BlobStats::capture);
        let (primitives, textures_delta, screen_descriptor) = overlay.run_frame(
            window,
            gpu.surface_config.width,
            gpu.surface_config.height,
        );
        let extra = overlay.prepare_egui(
            &gpu.device,
            &gpu.queue,
            &mut frame.encoder,
            &primitives,
            &textures_delta,
            &screen_descriptor,
        );
        {
            let mut pass = GpuState::begin_egui_pass(&mut frame.encoder, &frame.view);
            overlay.render_egui(&mut pass, &primitives, &screen_descriptor);
        }
        gpu.finish_frame(frame.encoder, frame.output, extra);
        overlay.free_textures(&textures_delta);

        if overlay.flee_requested {
            overlay.flee_requested = false;
            if let Some(toy) = &mut self.toy {
                toy.poke();
            }
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.fatal.is_some() {
            return;
        }
        if let Err(e) = self.setup(event_loop) {
            log::error!("Startup aborted: {e}");
            self.fatal = Some(e);
            event_loop.exit();
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(w) = &self.window {
            w.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let (Some(overlay), Some(window)) = (&mut self.overlay, &self.window) {
            if overlay.on_window_event(window, &event) {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Close requested, exiting");
                self.shutdown(event_loop);
            }
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                match event.logical_key {
                    Key::Named(NamedKey::Escape) => {
                        log::info!("ESC pressed, exiting");
                        self.shutdown(event_loop);
                    }
                    Key::Named(NamedKey::F12) => {
                        if let Some(overlay) = &mut self.overlay {
                            overlay.toggle();
                        }
                    }
                    _ => {}
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
                if new_size.width > 0 && new_size.height > 0 {
                    if let Some(toy) = &mut self.toy {
                        toy.on_resize(Viewport::new(
                            new_size.width as f32,
                            new_size.height as f32,
                        ));
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = Vec2::new(position.x as f32, position.y as f32);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.pointer_down(self.cursor);
            }
            WindowEvent::Touch(touch) if touch.phase == TouchPhase::Started => {
                let point = Vec2::new(touch.location.x as f32, touch.location.y as f32);
                self.pointer_down(point);
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }
}

/// Entry point — create event loop and run.
pub fn run() -> Result<()> {
    let config = Config::new(&assets::resolve_root());
    log::info!("Assets from {:?}", config.assets.blob.parent());

    let event_loop = EventLoop::new()?;
    let mut app = App::new(config);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
