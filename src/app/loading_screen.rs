//! Loading Screen
//!
//! A row of cubes that light up with resource loading progress and collapse
//! away once everything is in. [`LoadingModel`] is the pure state (testable
//! without a GPU); [`LoadingScreen`] uploads and draws it.

use wgpu::util::DeviceExt;

use crate::animation::SimpleRng;
use crate::camera::PerspectiveCamera;
use crate::render::{
    build_cell_faces, create_shader_module, merge_faces, ShaderSource,
};

/// Number of progress cubes.
pub const CUBE_COUNT: usize = 12;

/// World-space spacing between cube centers.
const CUBE_SPACING: f32 = 1.4;

/// Resting scale of a cube whose progress slot is not yet reached.
const DIM_SCALE: f32 = 0.15;

/// Exponential approach rate toward the target scale.
const APPROACH_RATE: f32 = 10.0;

/// GPU instance data for one loading cube.
///
/// Layout (80 bytes):
/// - model:       mat4x4<f32> (64 bytes)
/// - color_scale: f32 (4 bytes) - per-cube brightness jitter
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct LoadingInstance {
    pub model: [[f32; 4]; 4],
    pub color_scale: f32,
    pub _pad: [f32; 3],
}

static_assertions::const_assert_eq!(std::mem::size_of::<LoadingInstance>(), 80);

impl LoadingInstance {
    fn buffer_layout() -> wgpu::VertexBufferLayout<'static> {
        const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
            2 => Float32x4,
            3 => Float32x4,
            4 => Float32x4,
            5 => Float32x4,
            6 => Float32,
        ];
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<LoadingInstance>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &ATTRIBUTES,
        }
    }
}

/// Pure loading indicator state.
pub struct LoadingModel {
    scales: [f32; CUBE_COUNT],
    targets: [f32; CUBE_COUNT],
    color_scales: [f32; CUBE_COUNT],
    complete: bool,
}

impl LoadingModel {
    pub fn new(seed: u32) -> Self {
        let mut rng = SimpleRng::new(seed);
        let mut color_scales = [0.0; CUBE_COUNT];
        for scale in &mut color_scales {
            *scale = rng.range(0.825, 1.0);
        }
        Self {
            scales: [0.0; CUBE_COUNT],
            targets: [DIM_SCALE; CUBE_COUNT],
            color_scales,
            complete: false,
        }
    }

    /// Map loading progress onto cube targets: cubes light up left to right.
    pub fn set_progress(&mut self, progress: f32) {
        if self.complete {
            return;
        }
        let lit = (progress.clamp(0.0, 1.0) * CUBE_COUNT as f32) as usize;
        for (i, target) in self.targets.iter_mut().enumerate() {
            *target = if i < lit { 1.0 } else { DIM_SCALE };
        }
    }

    /// Start the collapse; progress updates are ignored from here on.
    pub fn finish(&mut self) {
        self.complete = true;
        self.targets = [0.0; CUBE_COUNT];
    }

    /// Exponential approach toward the targets.
    pub fn advance(&mut self, dt: f32) {
        let k = (dt * APPROACH_RATE).min(1.0);
        for (scale, target) in self.scales.iter_mut().zip(self.targets) {
            *scale += (target - *scale) * k;
        }
    }

    /// True once the collapse has visually finished.
    pub fn is_collapsed(&self) -> bool {
        self.complete && self.scales.iter().all(|s| *s < 0.01)
    }

    pub fn write_instances(&self, out: &mut [LoadingInstance; CUBE_COUNT]) {
        let origin_x = -CUBE_SPACING * (CUBE_COUNT as f32 - 1.0) * 0.5;
        for i in 0..CUBE_COUNT {
            let model = glam::Mat4::from_translation(glam::Vec3::new(
                origin_x + CUBE_SPACING * i as f32,
                0.0,
                0.0,
            )) * glam::Mat4::from_scale(glam::Vec3::splat(self.scales[i]));
            out[i] = LoadingInstance {
                model: model.to_cols_array_2d(),
                color_scale: self.color_scales[i],
                _pad: [0.0; 3],
            };
        }
    }
}

/// Uniforms for the loading pass.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct LoadingUniforms {
    view_proj: [[f32; 4]; 4],
}

/// GPU side of the loading indicator.
pub struct LoadingScreen {
    pub model: LoadingModel,
    pipeline: wgpu::RenderPipeline,
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    instance_buffer: wgpu::Buffer,
    instances: [LoadingInstance; CUBE_COUNT],
}

impl LoadingScreen {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat, seed: u32) -> Self {
        let shader = create_shader_module(
            device,
            "Loading Shader",
            &ShaderSource::Embedded(crate::render::shader_loader::embedded::LOADING),
        );

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Loading Bind Group Layout"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
            });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Loading Uniforms"),
            size: std::mem::size_of::<LoadingUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Loading Bind Group"),
            layout: &bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Loading Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        // Plain unit cube, all faces
        let faces = build_cell_faces(1.0, 1.0, 1.0, 0.0);
        let (vertices, indices) = merge_faces(&faces, |_| true);

        let vertex_layout = wgpu::VertexBufferLayout {
            array_stride: 32,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 0,
                    shader_location: 0,
                },
                wgpu::VertexAttribute {
                    format: wgpu::VertexFormat::Float32x3,
                    offset: 12,
                    shader_location: 1,
                },
            ],
        };

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Loading Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[vertex_layout, LoadingInstance::buffer_layout()],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: surface_format,
                    blend: Some(wgpu::BlendState::REPLACE),
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
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Loading Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Loading Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        let instances = [LoadingInstance {
            model: glam::Mat4::IDENTITY.to_cols_array_2d(),
            color_scale: 1.0,
            _pad: [0.0; 3],
        }; CUBE_COUNT];
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Loading Instance Buffer"),
            contents: bytemuck::cast_slice(&instances),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            model: LoadingModel::new(seed),
            pipeline,
            uniform_buffer,
            bind_group,
            vertex_buffer,
            index_buffer,
            index_count: indices.len() as u32,
            instance_buffer,
            instances,
        }
    }

    /// Advance the model and upload this frame's data.
    pub fn update(&mut self, dt: f32, queue: &wgpu::Queue, camera: &PerspectiveCamera) {
        self.model.advance(dt);
        self.model.write_instances(&mut self.instances);
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&self.instances));
        let uniforms = LoadingUniforms {
            view_proj: camera.view_projection().to_cols_array_2d(),
        };
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }

    pub fn render<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..CUBE_COUNT as u32);
    }
}
