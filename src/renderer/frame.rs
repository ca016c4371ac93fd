use crate::camera::ShaderBasis;
use crate::error::SimError;
use crate::renderer::renderer::{Renderer, SimUniform};
use crate::settings::Settings;
use egui_wgpu::ScreenDescriptor;
use image::RgbaImage;

/// Where the composited frame ends up this tick.
pub enum FrameTarget {
    /// Straight to the window.
    Window,
    /// Into the off-screen capture target, mirrored to the window, and read
    /// back for persistence.
    Capture,
}

impl Renderer {
    /// Runs one full tick worth of GPU work: kernel dispatch, bloom chain,
    /// composite, optional capture readback, egui overlay, present.
    ///
    /// Returns the captured image when `target` is `Capture`.
    pub(crate) fn render_frame(
        &mut self,
        settings: &Settings,
        basis: &ShaderBasis,
        seconds: f32,
        target: FrameTarget,
        paint_jobs: Vec<egui::ClippedPrimitive>,
        textures_delta: egui::TexturesDelta,
        screen_descriptor: ScreenDescriptor,
    ) -> Result<Option<RgbaImage>, SimError> {
        if self.config.width == 0 || self.config.height == 0 {
            return Ok(None);
        }

        let uniform = SimUniform::new(settings, basis, seconds);
        self.queue
            .write_buffer(&self.sim_uniform_buffer, 0, bytemuck::cast_slice(&[uniform]));

        let output = self.surface.get_current_texture()?;
        let surface_view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let capture_view = self
            .sized
            .capture_tex
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let groups_x = self.sized.width.div_ceil(8);
        let groups_y = self.sized.height.div_ceil(8);
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("Simulation Pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(&self.kernel_pipeline);
            pass.set_bind_group(0, &self.sized.kernel_bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);

            pass.set_pipeline(&self.bright_pipeline);
            pass.set_bind_group(0, &self.sized.bright_bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);

            pass.set_pipeline(&self.blur_h_pipeline);
            pass.set_bind_group(0, &self.sized.blur_h_bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);

            pass.set_pipeline(&self.blur_v_pipeline);
            pass.set_bind_group(0, &self.sized.blur_v_bind_group, &[]);
            pass.dispatch_workgroups(groups_x, groups_y, 1);
        }

        match target {
            FrameTarget::Window => {
                fullscreen_pass(
                    &mut encoder,
                    "Composite Pass",
                    &surface_view,
                    &self.composite_pipeline,
                    &self.sized.composite_bind_group,
                );
            }
            FrameTarget::Capture => {
                fullscreen_pass(
                    &mut encoder,
                    "Composite Capture Pass",
                    &capture_view,
                    &self.composite_capture_pipeline,
                    &self.sized.composite_bind_group,
                );
                // Mirror the capture frame to the window for progress
                // monitoring, then queue the CPU copy.
                fullscreen_pass(
                    &mut encoder,
                    "Capture Blit Pass",
                    &surface_view,
                    &self.blit_pipeline,
                    &self.sized.blit_bind_group,
                );
                self.sized.readback.copy_from(&mut encoder, &self.sized.capture_tex);
            }
        }

        // Egui overlay on top of whatever reached the window.
        for (id, image_delta) in &textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut egui_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui render pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &surface_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    occlusion_query_set: None,
                    timestamp_writes: None,
                })
                .forget_lifetime();

            self.egui_renderer
                .render(&mut egui_pass, &paint_jobs, &screen_descriptor);
        }
        for id in &textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        self.queue.submit(std::iter::once(encoder.finish()));

        let captured = match target {
            FrameTarget::Window => None,
            FrameTarget::Capture => Some(self.sized.readback.read(&self.device)?),
        };

        output.present();
        Ok(captured)
    }
}

fn fullscreen_pass(
    encoder: &mut wgpu::CommandEncoder,
    label: &str,
    view: &wgpu::TextureView,
    pipeline: &wgpu::RenderPipeline,
    bind_group: &wgpu::BindGroup,
) {
    let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
            depth_slice: None,
        })],
        depth_stencil_attachment: None,
        occlusion_query_set: None,
        timestamp_writes: None,
    });
    pass.set_pipeline(pipeline);
    pass.set_bind_group(0, bind_group, &[]);
    pass.draw(0..3, 0..1);
}
