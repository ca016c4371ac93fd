use crate::camera::ShaderBasis;
use crate::error::SimError;
use crate::renderer::readback::ReadbackBuffer;
use crate::settings::Settings;
use std::sync::Arc;

const SCENE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
const CAPTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Per-frame uniform for the ray-marching kernel. Layout mirrors
/// `SimUniform` in blackhole.wgsl.
#[repr(C)]
#[derive(Debug, Clone, Copy, bytemuck::Pod, bytemuck::Zeroable)]
pub(crate) struct SimUniform {
    pub cam_pos: [f32; 3],
    pub time: f32,
    pub cam_forward: [f32; 3],
    pub aspect: f32,
    pub cam_right: [f32; 3],
    pub tan_half_fov: f32,
    pub cam_up: [f32; 3],
    pub step_size: f32,
    pub disk: [f32; 4],
    pub disk_flow: [f32; 4],
}

impl SimUniform {
    pub(crate) fn new(settings: &Settings, basis: &ShaderBasis, seconds: f32) -> Self {
        Self {
            cam_pos: basis.position.into(),
            // Same scale the original fed its kernel
            time: seconds * 10.0,
            cam_forward: basis.forward.into(),
            aspect: settings.resolution_x as f32 / settings.resolution_y as f32,
            cam_right: basis.right.into(),
            tan_half_fov: (settings.fov.to_radians() * 0.5).tan(),
            cam_up: basis.up.into(),
            step_size: settings.simulation_step_size,
            disk: [
                settings.disk_inner_radius,
                settings.disk_outer_radius,
                settings.disk_thickness,
                settings.skybox_brightness,
            ],
            disk_flow: [
                settings.disk_max_temp,
                settings.disk_min_temp,
                settings.disk_max_velocity,
                settings.disk_min_velocity,
            ],
        }
    }
}

/// Everything whose size depends on the configured simulation resolution,
/// rebuilt wholesale on every settings apply.
pub(crate) struct SizedResources {
    pub width: u32,
    pub height: u32,
    pub capture_tex: wgpu::Texture,
    pub kernel_bind_group: wgpu::BindGroup,
    pub bright_bind_group: wgpu::BindGroup,
    pub blur_h_bind_group: wgpu::BindGroup,
    pub blur_v_bind_group: wgpu::BindGroup,
    pub composite_bind_group: wgpu::BindGroup,
    pub blit_bind_group: wgpu::BindGroup,
    pub readback: ReadbackBuffer,
}

pub struct Renderer {
    pub(crate) surface: wgpu::Surface<'static>,
    pub(crate) device: wgpu::Device,
    pub(crate) queue: wgpu::Queue,
    pub(crate) config: wgpu::SurfaceConfiguration,

    pub(crate) kernel_pipeline: wgpu::ComputePipeline,
    pub(crate) bright_pipeline: wgpu::ComputePipeline,
    pub(crate) blur_h_pipeline: wgpu::ComputePipeline,
    pub(crate) blur_v_pipeline: wgpu::ComputePipeline,
    pub(crate) composite_pipeline: wgpu::RenderPipeline,
    pub(crate) composite_capture_pipeline: wgpu::RenderPipeline,
    pub(crate) blit_pipeline: wgpu::RenderPipeline,

    kernel_layout: wgpu::BindGroupLayout,
    bloom_layout: wgpu::BindGroupLayout,
    composite_layout: wgpu::BindGroupLayout,
    pub(crate) sim_uniform_buffer: wgpu::Buffer,
    sampler: wgpu::Sampler,

    pub(crate) sized: SizedResources,

    pub(crate) egui_renderer: egui_wgpu::Renderer,
    egui_ctx: egui::Context,
}

impl Renderer {
    pub async fn new(
        window: Arc<winit::window::Window>,
        settings: &Settings,
    ) -> Result<Self, SimError> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                ..Default::default()
            })
            .await
            .unwrap();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: if settings.vsync {
                wgpu::PresentMode::AutoVsync
            } else {
                wgpu::PresentMode::AutoNoVsync
            },
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let kernel_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Black Hole Kernel"),
            source: wgpu::ShaderSource::Wgsl(include_str!("blackhole.wgsl").into()),
        });
        let bloom_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Bloom Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("bloom.wgsl").into()),
        });
        let composite_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Composite Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("composite.wgsl").into()),
        });

        let kernel_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Kernel Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: SCENE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let bloom_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Bloom Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::StorageTexture {
                        access: wgpu::StorageTextureAccess::WriteOnly,
                        format: SCENE_FORMAT,
                        view_dimension: wgpu::TextureViewDimension::D2,
                    },
                    count: None,
                },
            ],
        });

        let composite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Composite Bind Group Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let kernel_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Kernel Pipeline Layout"),
                bind_group_layouts: &[&kernel_layout],
                push_constant_ranges: &[],
            });
        let kernel_pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("Kernel Pipeline"),
            layout: Some(&kernel_pipeline_layout),
            module: &kernel_shader,
            entry_point: Some("main"),
            compilation_options: Default::default(),
            cache: None,
        });

        let bloom_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Bloom Pipeline Layout"),
                bind_group_layouts: &[&bloom_layout],
                push_constant_ranges: &[],
            });
        let bloom_pipeline = |label, entry_point| {
            device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
                label: Some(label),
                layout: Some(&bloom_pipeline_layout),
                module: &bloom_shader,
                entry_point: Some(entry_point),
                compilation_options: Default::default(),
                cache: None,
            })
        };
        let bright_pipeline = bloom_pipeline("Bright Pass Pipeline", "bright_pass");
        let blur_h_pipeline = bloom_pipeline("Blur H Pipeline", "blur_horizontal");
        let blur_v_pipeline = bloom_pipeline("Blur V Pipeline", "blur_vertical");

        let composite_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Composite Pipeline Layout"),
                bind_group_layouts: &[&composite_layout],
                push_constant_ranges: &[],
            });
        let fullscreen_pipeline = |label, fragment_entry, format| {
            device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                label: Some(label),
                layout: Some(&composite_pipeline_layout),
                vertex: wgpu::VertexState {
                    module: &composite_shader,
                    entry_point: Some("fullscreen_vs"),
                    buffers: &[],
                    compilation_options: Default::default(),
                },
                fragment: Some(wgpu::FragmentState {
                    module: &composite_shader,
                    entry_point: Some(fragment_entry),
                    targets: &[Some(wgpu::ColorTargetState {
                        format,
                        blend: None,
                        write_mask: wgpu::ColorWrites::ALL,
                    })],
                    compilation_options: Default::default(),
                }),
                primitive: wgpu::PrimitiveState::default(),
                depth_stencil: None,
                multisample: wgpu::MultisampleState::default(),
                multiview: None,
                cache: None,
            })
        };
        let composite_pipeline = fullscreen_pipeline("Composite Pipeline", "composite_fs", surface_format);
        let composite_capture_pipeline =
            fullscreen_pipeline("Composite Capture Pipeline", "composite_fs", CAPTURE_FORMAT);
        let blit_pipeline = fullscreen_pipeline("Blit Pipeline", "blit_fs", surface_format);

        let sim_uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sim Uniform Buffer"),
            size: std::mem::size_of::<SimUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Composite Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let sized = Self::build_sized_resources(
            &device,
            settings.resolution_x,
            settings.resolution_y,
            &kernel_layout,
            &bloom_layout,
            &composite_layout,
            &sim_uniform_buffer,
            &sampler,
        );

        let egui_ctx = egui::Context::default();
        let egui_renderer = egui_wgpu::Renderer::new(&device, config.format, Default::default());

        Ok(Self {
            surface,
            device,
            queue,
            config,
            kernel_pipeline,
            bright_pipeline,
            blur_h_pipeline,
            blur_v_pipeline,
            composite_pipeline,
            composite_capture_pipeline,
            blit_pipeline,
            kernel_layout,
            bloom_layout,
            composite_layout,
            sim_uniform_buffer,
            sampler,
            sized,
            egui_renderer,
            egui_ctx,
        })
    }

    pub fn egui_context(&self) -> egui::Context {
        self.egui_ctx.clone()
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Capture mode runs uncapped so the export finishes as fast as the GPU
    /// allows; interactive mode goes back to the configured vsync behavior.
    pub fn set_uncapped(&mut self, uncapped: bool) {
        let desired = if uncapped {
            wgpu::PresentMode::AutoNoVsync
        } else {
            wgpu::PresentMode::AutoVsync
        };
        if self.config.present_mode != desired {
            self.config.present_mode = desired;
            self.surface.configure(&self.device, &self.config);
        }
    }

    /// Rebuilds the resolution-sized textures and bind groups for a new
    /// configuration.
    pub fn apply_settings(&mut self, settings: &Settings) {
        if self.sized.width != settings.resolution_x || self.sized.height != settings.resolution_y {
            self.sized = Self::build_sized_resources(
                &self.device,
                settings.resolution_x,
                settings.resolution_y,
                &self.kernel_layout,
                &self.bloom_layout,
                &self.composite_layout,
                &self.sim_uniform_buffer,
                &self.sampler,
            );
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn build_sized_resources(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        kernel_layout: &wgpu::BindGroupLayout,
        bloom_layout: &wgpu::BindGroupLayout,
        composite_layout: &wgpu::BindGroupLayout,
        sim_uniform_buffer: &wgpu::Buffer,
        sampler: &wgpu::Sampler,
    ) -> SizedResources {
        let extent = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let storage_tex = |label| {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some(label),
                size: extent,
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: SCENE_FORMAT,
                usage: wgpu::TextureUsages::STORAGE_BINDING | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
        };
        let scene_tex = storage_tex("Scene Texture");
        let bloom_a = storage_tex("Bloom Texture A");
        let bloom_b = storage_tex("Bloom Texture B");

        let capture_tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Capture Target"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: CAPTURE_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        let scene_view = scene_tex.create_view(&wgpu::TextureViewDescriptor::default());
        let bloom_a_view = bloom_a.create_view(&wgpu::TextureViewDescriptor::default());
        let bloom_b_view = bloom_b.create_view(&wgpu::TextureViewDescriptor::default());
        let capture_view = capture_tex.create_view(&wgpu::TextureViewDescriptor::default());

        let kernel_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Kernel Bind Group"),
            layout: kernel_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&scene_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: sim_uniform_buffer.as_entire_binding(),
                },
            ],
        });

        let bloom_bind_group = |label, src: &wgpu::TextureView, dst: &wgpu::TextureView| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout: bloom_layout,
                entries: &[
                    wgpu::BindGroupEntry {
                        binding: 0,
                        resource: wgpu::BindingResource::TextureView(src),
                    },
                    wgpu::BindGroupEntry {
                        binding: 1,
                        resource: wgpu::BindingResource::TextureView(dst),
                    },
                ],
            })
        };
        // bright: scene -> a, blur H: a -> b, blur V: b -> a
        let bright_bind_group = bloom_bind_group("Bright Bind Group", &scene_view, &bloom_a_view);
        let blur_h_bind_group = bloom_bind_group("Blur H Bind Group", &bloom_a_view, &bloom_b_view);
        let blur_v_bind_group = bloom_bind_group("Blur V Bind Group", &bloom_b_view, &bloom_a_view);

        let composite_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Composite Bind Group"),
            layout: composite_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&scene_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&bloom_a_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        // The blit fragment only reads binding 0; the layout still wants all
        // three bound.
        let blit_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Blit Bind Group"),
            layout: composite_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&capture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&capture_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(sampler),
                },
            ],
        });

        let readback = ReadbackBuffer::new(device, width, height);

        SizedResources {
            width,
            height,
            capture_tex,
            kernel_bind_group,
            bright_bind_group,
            blur_h_bind_group,
            blur_v_bind_group,
            composite_bind_group,
            blit_bind_group,
            readback,
        }
    }
}
