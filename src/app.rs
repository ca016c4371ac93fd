use crate::camera::{CameraController, CameraState};
use crate::capture::{FrameOrchestrator, FrameSink, MarkSlot, PngSink, TickPlan};
use crate::error::SimError;
use crate::input::{open_in_editor, Command, KeyBindings};
use crate::menu::{menu_lines, Menu};
use crate::renderer::{FrameTarget, Renderer};
use crate::settings::{Settings, DEFAULTS_FILE, SETTINGS_FILE};
use crate::stats::{FramePacer, FrameStats};
use egui_wgpu::ScreenDescriptor;
use egui_winit::State;
use std::sync::Arc;
use std::time::Instant;
use winit::window::Window;

pub struct EventResponse {
    pub repaint: bool,
    pub exit: bool,
}

/// Composition root. Owns every subsystem and wires them together; nothing
/// in the crate reaches for a global.
pub struct App {
    pub window: Arc<Window>,
    settings: Settings,
    renderer: Renderer,
    camera: CameraController,
    orchestrator: FrameOrchestrator,
    sink: PngSink,
    bindings: KeyBindings,
    stats: FrameStats,
    pacer: FramePacer,
    last_tick: Instant,
    menu: Menu,
    menu_open: bool,
    egui_state: State,
    egui_wants_pointer: bool,
    start_time: Instant,
}

impl App {
    pub async fn new(window: Arc<Window>, settings: Settings) -> Result<Self, SimError> {
        // The defaults file exists purely for the user to read; never
        // overwritten once present.
        Settings::create_if_missing(DEFAULTS_FILE, &Settings::default())?;

        let renderer = Renderer::new(window.clone(), &settings).await?;

        let egui_ctx = renderer.egui_context();
        let egui_state = State::new(
            egui_ctx.clone(),
            egui::viewport::ViewportId::ROOT,
            &window,
            None,
            None,
            None,
        );

        let mut orchestrator = FrameOrchestrator::new();
        orchestrator.apply_settings(&settings)?;

        window.set_cursor_visible(settings.show_mouse);

        let pacer = FramePacer::new(settings.target_framerate);
        Ok(Self {
            window,
            settings,
            renderer,
            camera: CameraController::new(CameraState::default()),
            orchestrator,
            sink: PngSink,
            bindings: KeyBindings::new(),
            stats: FrameStats::new(),
            pacer,
            last_tick: Instant::now(),
            menu: Menu::Main,
            menu_open: false,
            egui_state,
            egui_wants_pointer: false,
            start_time: Instant::now(),
        })
    }

    pub fn handle_event(&mut self, event: &winit::event::WindowEvent) -> EventResponse {
        let egui_response = self.egui_state.on_window_event(&self.window, event);

        match event {
            winit::event::WindowEvent::CloseRequested => {
                return EventResponse {
                    repaint: false,
                    exit: true,
                };
            }
            winit::event::WindowEvent::Resized(size) => {
                self.renderer.resize(*size);
            }
            winit::event::WindowEvent::KeyboardInput { event, .. } => {
                if egui_response.consumed {
                    return EventResponse {
                        repaint: egui_response.repaint,
                        exit: false,
                    };
                }
                if let Some(command) = self.bindings.command_for(event) {
                    match self.run_command(command) {
                        Ok(exit) => {
                            return EventResponse {
                                repaint: true,
                                exit,
                            };
                        }
                        Err(e) => {
                            log::error!("command failed: {e}");
                            return EventResponse {
                                repaint: true,
                                exit: true,
                            };
                        }
                    }
                }
            }
            winit::event::WindowEvent::MouseInput { state, button, .. } => {
                if !self.egui_wants_pointer {
                    let pressed = *state == winit::event::ElementState::Pressed;
                    self.camera.on_mouse_button(*button, pressed);
                }
            }
            winit::event::WindowEvent::CursorMoved { position, .. } => {
                if !self.egui_wants_pointer {
                    self.camera.on_cursor_moved((position.x, position.y));
                }
            }
            winit::event::WindowEvent::MouseWheel { delta, .. } => {
                if !self.egui_wants_pointer {
                    match delta {
                        winit::event::MouseScrollDelta::LineDelta(_, y) => {
                            self.camera.on_scroll_lines(*y);
                        }
                        winit::event::MouseScrollDelta::PixelDelta(pos) => {
                            self.camera.on_scroll_lines(pos.y as f32 * 0.05);
                        }
                    }
                }
            }
            _ => {}
        }

        EventResponse {
            repaint: egui_response.repaint,
            exit: false,
        }
    }

    /// Returns true when the app should exit.
    fn run_command(&mut self, command: Command) -> Result<bool, SimError> {
        match command {
            Command::ToggleMenu => self.menu_open = !self.menu_open,
            Command::SelectMenu(menu) => self.menu = menu,
            Command::Quit => return Ok(true),
            Command::ApplySettings => self.apply_settings()?,
            Command::OpenSettingsFile => open_in_editor(SETTINGS_FILE),
            Command::OpenDefaultsFile => open_in_editor(DEFAULTS_FILE),
            Command::MarkStart => {
                self.orchestrator
                    .mark(MarkSlot::Start, self.camera.state().render_point());
            }
            Command::MarkEnd => {
                self.orchestrator
                    .mark(MarkSlot::End, self.camera.state().render_point());
            }
        }
        Ok(false)
    }

    /// Re-reads the settings file and swaps in the new configuration
    /// atomically. Always resets any capture session.
    fn apply_settings(&mut self) -> Result<(), SimError> {
        let settings = Settings::load_or_create(SETTINGS_FILE)?;
        settings.warn_on_version_mismatch();

        self.renderer.apply_settings(&settings);
        self.orchestrator.apply_settings(&settings)?;
        self.pacer.apply_settings(settings.target_framerate);

        let _ = self.window.request_inner_size(winit::dpi::PhysicalSize::new(
            settings.resolution_x,
            settings.resolution_y,
        ));
        self.window.set_fullscreen(
            settings
                .fullscreen
                .then(|| winit::window::Fullscreen::Borderless(None)),
        );
        self.window.set_cursor_visible(settings.show_mouse);

        self.settings = settings;
        Ok(())
    }

    fn overlay_lines(&self) -> Vec<String> {
        self.orchestrator.overlay_lines().unwrap_or_else(|| {
            menu_lines(
                self.menu,
                self.menu_open,
                &self.settings,
                self.stats.fps(),
                self.stats.delta(),
            )
        })
    }

    /// One tick: decide live vs capture, run the GPU frame, persist when
    /// capturing.
    pub fn render(&mut self) -> Result<(), SimError> {
        let wall_seconds = self.start_time.elapsed().as_secs_f64();

        self.renderer
            .set_uncapped(self.orchestrator.is_capturing() || !self.settings.vsync);

        // Plan first so the overlay reports the frame being rendered, not the
        // previous one.
        let plan = self.orchestrator.begin_frame();
        let lines = self.overlay_lines();
        let raw_input = self.egui_state.take_egui_input(&self.window);
        let egui_ctx = self.renderer.egui_context();
        let full_output = egui_ctx.run(raw_input, |ctx| draw_overlay(ctx, &lines));
        self.egui_wants_pointer = egui_ctx.wants_pointer_input();
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);
        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = ScreenDescriptor {
            size_in_pixels: [
                self.window.inner_size().width,
                self.window.inner_size().height,
            ],
            pixels_per_point: self.window.scale_factor() as f32,
        };

        match plan {
            TickPlan::Live => {
                let basis = self.camera.state().shader_basis();
                self.renderer.render_frame(
                    &self.settings,
                    &basis,
                    wall_seconds as f32,
                    FrameTarget::Window,
                    paint_jobs,
                    full_output.textures_delta,
                    screen_descriptor,
                )?;
            }
            TickPlan::Capture {
                point,
                simulated_time,
                path,
                ..
            } => {
                self.camera.state_mut().apply_render_point(point);
                let basis = self.camera.state().shader_basis();
                let captured = self.renderer.render_frame(
                    &self.settings,
                    &basis,
                    simulated_time,
                    FrameTarget::Capture,
                    paint_jobs,
                    full_output.textures_delta,
                    screen_descriptor,
                )?;

                if let Some(frame) = captured {
                    let (width, height) = self.settings.stored_frame_size();
                    self.sink.save_png(&frame, &path, width, height)?;
                    self.orchestrator.frame_written();
                }
            }
        }

        self.stats.update(wall_seconds);

        if !self.orchestrator.is_capturing() {
            let idle = self
                .pacer
                .shortfall(self.last_tick.elapsed().as_secs_f64());
            if !idle.is_zero() {
                std::thread::sleep(idle);
            }
        }
        self.last_tick = Instant::now();

        Ok(())
    }
}

fn draw_overlay(ctx: &egui::Context, lines: &[String]) {
    egui::Area::new(egui::Id::new("text overlay"))
        .fixed_pos(egui::pos2(20.0, 20.0))
        .show(ctx, |ui| {
            for line in lines {
                if line.is_empty() {
                    ui.add_space(10.0);
                } else {
                    ui.label(
                        egui::RichText::new(line)
                            .monospace()
                            .size(14.0)
                            .color(egui::Color32::WHITE),
                    );
                }
            }
        });
}
