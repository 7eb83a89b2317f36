use std::cell::RefCell;
use std::rc::Rc;

use bytemuck::NoUninit;
use glam::{Quat, Vec3};
use wgpu::*;

use crate::model::scene::{CLEAR_COLOR, FOG_COLOR, FOG_FAR, FOG_NEAR};
use crate::model::{Camera, Scene};
use crate::ui::MessageOverlay;
use crate::utils::{transform, Mesh, MeshBuffer, Vertex};
use crate::view::gpu_init::GpuContext;
use crate::view::renderer::Renderer;

const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub eye: [f32; 4],
}

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct LightingUniform {
    pub sun_dir: [f32; 3],
    pub sun_intensity: f32,
    pub fog_color: [f32; 3],
    pub ambient: f32,
    pub fog_near: f32,
    pub fog_far: f32,
    pub _pad: [f32; 2],
}

impl CameraUniform {
    pub fn from_camera(camera: &Camera) -> Self {
        Self {
            view_proj: camera.view_proj().to_cols_array_2d(),
            eye: camera.eye.extend(1.0).to_array(),
        }
    }
}

impl LightingUniform {
    pub fn from_scene(scene: &Scene) -> Self {
        let lighting = &scene.lighting;
        Self {
            sun_dir: lighting.sun_position.normalize_or_zero().to_array(),
            sun_intensity: lighting.sun_intensity,
            fog_color: [FOG_COLOR[0], FOG_COLOR[1], FOG_COLOR[2]],
            ambient: lighting.ambient,
            fog_near: FOG_NEAR,
            fog_far: FOG_FAR,
            _pad: [0.0; 2],
        }
    }
}

// Shared graphics setup used by native and web
pub struct CameraResources {
    pub camera_buffer: wgpu::Buffer,
    pub lighting_buffer: wgpu::Buffer,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub camera_bind_group: wgpu::BindGroup,
}

pub fn create_depth_texture(device: &wgpu::Device, width: u32, height: u32) -> (wgpu::Texture, wgpu::TextureView) {
    let depth_texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("depth_texture"),
        size: wgpu::Extent3d { width: width.max(1), height: height.max(1), depth_or_array_layers: 1 },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth_view = depth_texture.create_view(&wgpu::TextureViewDescriptor::default());
    (depth_texture, depth_view)
}

pub fn create_camera_resources(device: &wgpu::Device) -> CameraResources {
    let camera_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("camera_buffer"),
        size: std::mem::size_of::<CameraUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });
    let lighting_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("lighting_buffer"),
        size: std::mem::size_of::<LightingUniform>() as u64,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    });

    let uniform_entry = |binding: u32, visibility: wgpu::ShaderStages| wgpu::BindGroupLayoutEntry {
        binding,
        visibility,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    };

    let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
        label: Some("camera_bind_group_layout"),
        entries: &[
            uniform_entry(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT),
            uniform_entry(1, wgpu::ShaderStages::FRAGMENT),
        ],
    });

    let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("camera_bind_group"),
        layout: &bind_group_layout,
        entries: &[
            wgpu::BindGroupEntry { binding: 0, resource: camera_buffer.as_entire_binding() },
            wgpu::BindGroupEntry { binding: 1, resource: lighting_buffer.as_entire_binding() },
        ],
    });

    CameraResources { camera_buffer, lighting_buffer, bind_group_layout, camera_bind_group }
}

pub fn create_scene_pipeline(
    device: &wgpu::Device,
    format: wgpu::TextureFormat,
    bind_group_layout: &wgpu::BindGroupLayout,
) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene_shader"),
        source: wgpu::ShaderSource::Wgsl(include_str!("shaders/scene.wgsl").into()),
    });

    let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("pipeline_layout"),
        bind_group_layouts: &[bind_group_layout],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("scene_pipeline"),
        layout: Some(&pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[
                    wgpu::VertexAttribute { offset: 0, shader_location: 0, format: wgpu::VertexFormat::Float32x3 },
                    wgpu::VertexAttribute { offset: 12, shader_location: 1, format: wgpu::VertexFormat::Float32x3 },
                    wgpu::VertexAttribute { offset: 24, shader_location: 2, format: wgpu::VertexFormat::Float32x4 },
                ],
            }],
            compilation_options: Default::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(wgpu::ColorTargetState {
                format,
                blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: Default::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState { count: 1, mask: !0, alpha_to_coverage_enabled: false },
        multiview: None,
        cache: None,
    })
}

/// Floor and decoration never move, so they are meshed once
pub fn build_static_mesh(scene: &Scene) -> Mesh {
    let mut mesh = Mesh::plane(scene.floor_size, scene.floor_color);
    for block in &scene.decor {
        mesh.append_transformed(
            &Mesh::cuboid(block.size, block.color),
            transform(block.position, Quat::IDENTITY, Vec3::ONE),
        );
    }
    mesh
}

/// Zones at their animated pose plus the avatar
pub fn build_dynamic_mesh(scene: &Scene, avatar_mesh: &Mesh) -> Mesh {
    let mut mesh = Mesh::empty();
    for zone in &scene.zones {
        mesh.append_transformed(
            &Mesh::cuboid(zone.size, zone.color),
            transform(zone.pose.position, Quat::IDENTITY, zone.pose.scale),
        );
    }
    mesh.append_transformed(
        avatar_mesh,
        transform(scene.avatar.position, scene.avatar.quaternion, Vec3::ONE),
    );
    mesh
}

/// wgpu-backed renderer for the portfolio scene with the message overlay on top
pub struct SceneRenderer {
    gpu: GpuContext,
    /// Logical size in CSS pixels
    width: u32,
    height: u32,
    pixel_ratio: f32,
    depth_view: TextureView,
    camera_resources: CameraResources,
    pipeline: RenderPipeline,
    static_mesh: Option<MeshBuffer>,
    avatar_mesh: Mesh,
    egui_renderer: egui_wgpu::Renderer,
    overlay: Rc<RefCell<MessageOverlay>>,
    /// Physical extent reported by a native window. Overrides logical size times pixel ratio.
    window_extent: Option<(u32, u32)>,
}

impl SceneRenderer {
    pub fn new(gpu: GpuContext, width: u32, height: u32, pixel_ratio: f32, overlay: Rc<RefCell<MessageOverlay>>) -> Self {
        let camera_resources = create_camera_resources(&gpu.device);
        let pipeline = create_scene_pipeline(&gpu.device, gpu.format, &camera_resources.bind_group_layout);
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.format, egui_wgpu::RendererOptions::default());
        let (_, depth_view) = create_depth_texture(&gpu.device, gpu.config.width, gpu.config.height);

        let mut renderer = Self {
            gpu,
            width,
            height,
            pixel_ratio,
            depth_view,
            camera_resources,
            pipeline,
            static_mesh: None,
            avatar_mesh: Mesh::empty(),
            egui_renderer,
            overlay,
            window_extent: None,
        };
        renderer.reconfigure();
        renderer
    }

    /// Drawing-buffer size in physical pixels
    pub fn physical_size(&self) -> (u32, u32) {
        surface_extent((self.width, self.height), self.pixel_ratio, self.window_extent)
    }

    /// Size the surface to the window's real physical extent. Native windows
    /// must match it exactly or every acquire comes back outdated.
    pub fn set_surface_size(&mut self, width: u32, height: u32) {
        self.window_extent = Some((width, height));
        self.reconfigure();
    }

    fn reconfigure(&mut self) {
        let (width, height) = self.physical_size();
        self.gpu.resize(width, height);
        let (_, depth_view) = create_depth_texture(&self.gpu.device, width, height);
        self.depth_view = depth_view;
    }

    fn acquire_frame(&mut self) -> Option<SurfaceTexture> {
        match self.gpu.surface.get_current_texture() {
            Ok(frame) => Some(frame),
            Err(SurfaceError::Lost | SurfaceError::Outdated) => {
                tracing::debug!("surface lost, reconfiguring");
                self.gpu.reconfigure();
                None
            }
            Err(SurfaceError::OutOfMemory) => {
                tracing::error!("surface out of memory, skipping frame");
                None
            }
            Err(e) => {
                tracing::warn!(error = ?e, "failed to acquire frame");
                None
            }
        }
    }

    fn draw_frame(&mut self, frame: SurfaceTexture, scene: &Scene, egui_output: egui::FullOutput) {
        let device = &self.gpu.device;
        if self.static_mesh.is_none() {
            self.static_mesh = Some(build_static_mesh(scene).upload(device));
        }
        if self.avatar_mesh.is_empty() {
            self.avatar_mesh = Mesh::sphere(scene.avatar.radius, 24, 12, scene.avatar.color);
        }
        let dynamic_mesh = build_dynamic_mesh(scene, &self.avatar_mesh).upload(device);

        let egui_primitives = self
            .overlay
            .borrow()
            .ctx()
            .tessellate(egui_output.shapes, egui_output.pixels_per_point);
        let (width, height) = self.physical_size();
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: egui_output.pixels_per_point,
        };

        let device = &self.gpu.device;
        let queue = &self.gpu.queue;

        let view = frame.texture.create_view(&TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&CommandEncoderDescriptor { label: Some("encoder") });

        {
            let [r, g, b, a] = CLEAR_COLOR.map(f64::from);
            let mut rp = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(Color { r, g, b, a }),
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(Operations {
                        load: LoadOp::Clear(1.0),
                        store: StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            rp.set_pipeline(&self.pipeline);
            rp.set_bind_group(0, &self.camera_resources.camera_bind_group, &[]);

            for mesh_buffer in self.static_mesh.iter().chain(std::iter::once(&dynamic_mesh)) {
                if mesh_buffer.index_count == 0 {
                    continue;
                }
                rp.set_vertex_buffer(0, mesh_buffer.vertex_buffer.slice(..));
                rp.set_index_buffer(mesh_buffer.index_buffer.slice(..), IndexFormat::Uint32);
                rp.draw_indexed(0..mesh_buffer.index_count, 0, 0..1);
            }
        }

        for (id, image_delta) in &egui_output.textures_delta.set {
            self.egui_renderer.update_texture(device, queue, *id, image_delta);
        }
        self.egui_renderer
            .update_buffers(device, queue, &mut encoder, &egui_primitives, &screen_descriptor);

        {
            let egui_pass = encoder.begin_render_pass(&RenderPassDescriptor {
                label: Some("egui_render_pass"),
                color_attachments: &[Some(RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Load,
                        store: StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            self.egui_renderer
                .render(&mut egui_pass.forget_lifetime(), &egui_primitives, &screen_descriptor);
        }

        for id in &egui_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}

impl Renderer for SceneRenderer {
    fn render(&mut self, scene: &Scene, camera: &Camera) {
        let queue = &self.gpu.queue;
        queue.write_buffer(
            &self.camera_resources.camera_buffer,
            0,
            bytemuck::bytes_of(&CameraUniform::from_camera(camera)),
        );
        queue.write_buffer(
            &self.camera_resources.lighting_buffer,
            0,
            bytemuck::bytes_of(&LightingUniform::from_scene(scene)),
        );

        // egui hands out its texture uploads once, so only run it for a frame that will be drawn
        let Some(frame) = self.acquire_frame() else {
            return;
        };
        let (surface_width, _) = self.physical_size();
        let screen_size = egui::vec2(self.width as f32, self.height as f32);
        let scale = pixels_per_point(surface_width, self.width);
        let egui_output = self.overlay.borrow_mut().run(screen_size, scale, scene.time);

        self.draw_frame(frame, scene, egui_output);
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width.max(1);
        self.height = height.max(1);
        self.reconfigure();
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio.max(0.1);
        self.reconfigure();
    }
}

/// Logical size scaled by the pixel ratio, never zero
pub fn physical_size(width: u32, height: u32, pixel_ratio: f32) -> (u32, u32) {
    let scale = |v: u32| ((v as f32 * pixel_ratio).round() as u32).max(1);
    (scale(width), scale(height))
}

/// Surface extent: the window's own physical size when known, otherwise the
/// logical size scaled by the (capped) pixel ratio
pub fn surface_extent(logical: (u32, u32), pixel_ratio: f32, window_extent: Option<(u32, u32)>) -> (u32, u32) {
    match window_extent {
        Some((width, height)) => (width.max(1), height.max(1)),
        None => physical_size(logical.0, logical.1, pixel_ratio),
    }
}

/// egui scale that maps the logical width onto the surface width
pub fn pixels_per_point(surface_width: u32, logical_width: u32) -> f32 {
    surface_width as f32 / logical_width.max(1) as f32
}
