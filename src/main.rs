use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

mod app;
mod camera;
mod capture;
mod error;
mod input;
mod menu;
mod renderer;
mod settings;
mod stats;

use settings::{Settings, SETTINGS_FILE};

struct AppHandler {
    app: Option<app::App>,
}

impl ApplicationHandler for AppHandler {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.app.is_none() {
            let settings = Settings::load_or_create(SETTINGS_FILE).unwrap();
            settings.warn_on_version_mismatch();

            let window_attrs = Window::default_attributes()
                .with_title("Black Hole Simulation")
                .with_inner_size(winit::dpi::PhysicalSize::new(
                    settings.resolution_x,
                    settings.resolution_y,
                ))
                .with_fullscreen(
                    settings
                        .fullscreen
                        .then(|| winit::window::Fullscreen::Borderless(None)),
                );

            let window = Arc::new(event_loop.create_window(window_attrs).unwrap());
            let app = pollster::block_on(app::App::new(window, settings)).unwrap();
            self.app = Some(app);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(app) = &mut self.app {
            let response = app.handle_event(&event);
            if response.repaint {
                app.window.request_redraw();
            }
            if response.exit {
                event_loop.exit();
            }
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(app) = &mut self.app {
            match app.render() {
                Ok(()) => {}
                Err(e) if e.is_transient() => {
                    // Surface comes back on the next resize/configure.
                    log::warn!("skipping frame: {e}");
                }
                Err(e) => {
                    // Anything else (frame persistence included) is fatal.
                    log::error!("render failed: {e}");
                    event_loop.exit();
                }
            }
            app.window.request_redraw();
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut handler = AppHandler { app: None };
    event_loop.run_app(&mut handler)?;

    Ok(())
}
