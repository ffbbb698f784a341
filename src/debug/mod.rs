pub mod ring;

use winit::window::Window;

use self::ring::RingBuffer;

use crate::audio::{AudioBackend, Clip, ClipState};
use crate::blob::MotionPhase;
use crate::render::GpuState;
use crate::toy::BlobToy;

/// Number of frame times to keep in the histogram.
const FRAME_HISTORY_LEN: usize = 300;
/// How often to log FPS (seconds).
const FPS_LOG_INTERVAL: f64 = 5.0;

/// What the overlay shows about the blob, captured once per frame.
#[derive(Debug, Clone, Copy)]
pub struct BlobStats {
    pub phase: MotionPhase,
    pub pos: [f32; 2],
    pub rotation_deg: f32,
    pub bounds_min: [f32; 2],
    pub bounds_max: [f32; 2],
    pub active_tweens: usize,
    pub moves: u64,
    pub ambience: ClipState,
    pub reaction: ClipState,
    pub gesture_pending: bool,
}

impl BlobStats {
    pub fn capture<B: AudioBackend>(toy: &BlobToy<B>) -> Self {
        let a = &toy.animator;
        let tf = a.transform();
        Self {
            phase: a.phase(),
            pos: tf.pos.into(),
            rotation_deg: tf.rotation_deg,
            bounds_min: a.bounds().min.into(),
            bounds_max: a.bounds().max.into(),
            active_tweens: a.active_tweens(),
            moves: a.moves(),
            ambience: toy.sounds.state(Clip::Ambience),
            reaction: toy.sounds.state(Clip::Reaction),
            gesture_pending: toy.sounds.gesture_pending(),
        }
    }
}

/// F12 debug overlay powered by egui.
pub struct DebugOverlay {
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub egui_renderer: egui_wgpu::Renderer,

    pub visible: bool,

    /// Rolling window of frame times (seconds).
    pub frame_times: RingBuffer<f64>,
    pub fps: f64,
    pub frame_time_avg: f64,

    /// Freeze the tween clock.
    pub paused: bool,
    /// Set for one frame when the "Swim away" button is pressed.
    pub flee_requested: bool,

    pub blob: Option<BlobStats>,

    frame_count: u64,
    log_timer: f64,
    log_frame_count: u32,
    log_frame_sum: f64,
    log_frame_max: f64,
}

impl DebugOverlay {
    pub fn new(window: &Window, gpu: &GpuState) -> Self {
        let egui_ctx = egui::Context::default();

        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            window,
            Some(window.scale_factor() as f32),
            None,
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );

        let egui_renderer = egui_wgpu::Renderer::new(
            &gpu.device,
            gpu.surface_config.format,
            egui_wgpu::RendererOptions {
                depth_stencil_format: None,
                msaa_samples: 1,
                dithering: true,
                predictable_texture_filtering: false,
            },
        );

        Self {
            egui_ctx,
            egui_state,
            egui_renderer,
            visible: false,
            frame_times: RingBuffer::new(FRAME_HISTORY_LEN),
            fps: 0.0,
            frame_time_avg: 0.0,
            paused: false,
            flee_requested: false,
            blob: None,
            frame_count: 0,
            log_timer: 0.0,
            log_frame_count: 0,
            log_frame_sum: 0.0,
            log_frame_max: 0.0,
        }
    }

    /// Record a frame time, update rolling stats, and periodically log.
    pub fn record_frame(&mut self, dt: f64) {
        self.frame_count += 1;
        self.frame_times.push(dt);

        if !self.frame_times.is_empty() {
            let sum: f64 = self.frame_times.iter().sum();
            self.frame_time_avg = sum / self.frame_times.len() as f64;
            if self.frame_time_avg > 0.0 {
                self.fps = 1.0 / self.frame_time_avg;
            }
        }

        self.log_frame_count += 1;
        self.log_frame_sum += dt;
        self.log_frame_max = self.log_frame_max.max(dt);
        self.log_timer += dt;

        if self.log_timer >= FPS_LOG_INTERVAL {
            let avg_ms = (self.log_frame_sum / self.log_frame_count as f64) * 1000.0;
            let fps = self.log_frame_count as f64 / self.log_timer;
            log::info!(
                "FPS: {:.0} | avg: {:.2}ms | max: {:.2}ms | total frames: {}",
                fps,
                avg_ms,
                self.log_frame_max * 1000.0,
                self.frame_count,
            );
            self.log_timer = 0.0;
            self.log_frame_count = 0;
            self.log_frame_sum = 0.0;
            self.log_frame_max = 0.0;
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        log::debug!("Debug overlay {}", if self.visible { "shown" } else { "hidden" });
    }

    /// Forward a winit event to egui. Returns true if egui consumed it.
    pub fn on_window_event(&mut self, window: &Window, event: &winit::event::WindowEvent) -> bool {
        let response = self.egui_state.on_window_event(window, event);
        self.visible && response.consumed
    }

    /// Run the egui frame and produce paint output.
    /// Returns (clipped_primitives, textures_delta, screen_descriptor).
    pub fn run_frame(
        &mut self,
        window: &Window,
        screen_w: u32,
        screen_h: u32,
    ) -> (
        Vec<egui::epaint::ClippedPrimitive>,
        egui::TexturesDelta,
        egui_wgpu::ScreenDescriptor,
    ) {
        let raw_input = self.egui_state.take_egui_input(window);

        let ui_state = UiSnapshot {
            visible: self.visible,
            fps: self.fps,
            frame_time_avg: self.frame_time_avg,
            frame_times: self.frame_times.iter().copied().collect(),
            blob: self.blob,
        };

        let mut paused = self.paused;
        let mut flee_requested = false;

        let ctx = self.egui_ctx.clone();
        let full_output = ctx.run(raw_input, |ctx| {
            draw_ui(ctx, &ui_state, &mut paused, &mut flee_requested);
        });

        if paused != self.paused {
            log::info!("Tween clock {}", if paused { "paused" } else { "resumed" });
        }
        self.paused = paused;
        self.flee_requested = flee_requested;

        self.egui_state
            .handle_platform_output(window, full_output.platform_output);

        let pixels_per_point = full_output.pixels_per_point;
        let clipped_primitives = self.egui_ctx.tessellate(full_output.shapes, pixels_per_point);

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [screen_w, screen_h],
            pixels_per_point,
        };

        (clipped_primitives, full_output.textures_delta, screen_descriptor)
    }

    /// Upload egui textures and buffers. Call before the egui render pass.
    pub fn prepare_egui(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        primitives: &[egui::epaint::ClippedPrimitive],
        textures_delta: &egui::TexturesDelta,
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) -> Vec<wgpu::CommandBuffer> {
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(device, queue, *id, image_delta);
        }

        self.egui_renderer
            .update_buffers(device, queue, encoder, primitives, screen_descriptor)
    }

    /// Render egui into the given render pass.
    pub fn render_egui(
        &self,
        render_pass: &mut wgpu::RenderPass<'static>,
        primitives: &[egui::epaint::ClippedPrimitive],
        screen_descriptor: &egui_wgpu::ScreenDescriptor,
    ) {
        self.egui_renderer
            .render(render_pass, primitives, screen_descriptor);
    }

    /// Free textures after present.
    pub fn free_textures(&mut self, textures_delta: &egui::TexturesDelta) {
        for &id in &textures_delta.free {
            self.egui_renderer.free_texture(&id);
        }
    }
}

// ---------------------------------------------------------------------------
// UI snapshot + free-function draw (avoids borrow conflicts with egui_ctx)
// ---------------------------------------------------------------------------

struct UiSnapshot {
    visible: bool,
    fps: f64,
    frame_time_avg: f64,
    frame_times: Vec<f64>,
    blob: Option<BlobStats>,
}

fn clip_label(state: ClipState) -> &'static str {
    match state {
        ClipState::Unloaded => "unloaded",
        ClipState::Loaded => "loaded",
        ClipState::Playing => "playing",
        ClipState::Stopped => "stopped",
    }
}

fn draw_ui(ctx: &egui::Context, s: &UiSnapshot, paused: &mut bool, flee_requested: &mut bool) {
    if !s.visible {
        return;
    }

    let panel_frame = egui::Frame::NONE
        .fill(egui::Color32::from_rgba_unmultiplied(10, 30, 50, 220))
        .corner_radius(6.0)
        .inner_margin(10.0);

    egui::Window::new("Blob")
        .default_pos([10.0, 10.0])
        .default_width(280.0)
        .resizable(false)
        .frame(panel_frame)
        .show(ctx, |ui| {
            ui.style_mut().visuals.override_text_color = Some(egui::Color32::from_gray(220));

            ui.heading("Performance");
            ui.label(format!(
                "FPS: {:.1} | {:.2}ms avg",
                s.fps,
                s.frame_time_avg * 1000.0
            ));

            if !s.frame_times.is_empty() {
                let max_time = s
                    .frame_times
                    .iter()
                    .copied()
                    .fold(0.0f64, f64::max)
                    .max(0.020);

                let (response, painter) =
                    ui.allocate_painter(egui::vec2(260.0, 40.0), egui::Sense::hover());
                let rect = response.rect;
                let bar_width = rect.width() / s.frame_times.len() as f32;

                for (i, &t) in s.frame_times.iter().enumerate() {
                    let h = (t / max_time) as f32 * rect.height();
                    let x = rect.left() + i as f32 * bar_width;
                    painter.rect_filled(
                        egui::Rect::from_min_max(
                            egui::pos2(x, rect.bottom() - h),
                            egui::pos2(x + bar_width, rect.bottom()),
                        ),
                        0.0,
                        egui::Color32::from_rgb(80, 180, 220),
                    );
                }
            }
            ui.add_space(4.0);

            if let Some(b) = s.blob {
                ui.heading("Motion");
                let phase = match b.phase {
                    MotionPhase::Recovering { remaining } => {
                        format!("Recovering ({remaining:.1}s)")
                    }
                    other => other.label().to_string(),
                };
                ui.label(format!("Phase: {phase}"));
                ui.label(format!(
                    "Pos: ({:.0}, {:.0}) | Rot: {:.1}°",
                    b.pos[0], b.pos[1], b.rotation_deg
                ));
                ui.label(format!(
                    "Bounds: ({:.0}, {:.0}) .. ({:.0}, {:.0})",
                    b.bounds_min[0], b.bounds_min[1], b.bounds_max[0], b.bounds_max[1]
                ));
                ui.label(format!("Tweens: {} | Moves: {}", b.active_tweens, b.moves));
                ui.add_space(4.0);

                ui.heading("Audio");
                ui.label(format!("Ambience: {}", clip_label(b.ambience)));
                ui.label(format!("Reaction: {}", clip_label(b.reaction)));
                if b.gesture_pending {
                    ui.label("Waiting for first click");
                }
                ui.add_space(4.0);
            }

            ui.heading("Controls");
            ui.checkbox(paused, "Pause");
            if ui.button("Swim away").clicked() {
                *flee_requested = true;
            }
            ui.label("F12: Toggle | ESC: Quit");
        });
}
