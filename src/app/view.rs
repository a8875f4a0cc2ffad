//! Grid GPU Resources
//!
//! [`GridRenderer`] owns everything the two grid buffers share: the cell
//! mesh, the color and shadow-depth pipelines, the scene uniform buffer and
//! the shadow target. [`GridView`] is the per-buffer slice: an instance
//! buffer and the baked atlas texture. All animation and content logic lives
//! in the engine; these types only upload and draw.

use wgpu::util::DeviceExt;

use crate::grid::GridConfig;
use crate::render::{
    build_cell_faces, create_shader_module, merge_faces, CellInstance, CellVertex,
    FaceOrientation, ShaderSource, ShadowTarget,
};

use super::resources::RasterSurface;

/// Fraction of the lattice step a cell's front face spans.
const CELL_FILL: f32 = 0.94;

/// Cell depth relative to the smaller lattice step.
const CELL_DEPTH: f32 = 0.9;

/// Front-face corner radius relative to the smaller cell extent.
const CORNER_RADIUS: f32 = 0.18;

/// Scene uniforms shared by the color and shadow-depth pipelines.
///
/// Layout (304 bytes):
/// - view:            mat4x4<f32> at offset 0
/// - projection:      mat4x4<f32> at offset 64
/// - light_view_proj: mat4x4<f32> at offset 128 - light camera, depth pass
/// - shadow_matrix:   mat4x4<f32> at offset 192 - world to shadow UV, color pass
/// - light_position:  vec4<f32>   at offset 256
/// - camera_position: vec4<f32>   at offset 272
/// - grid_counts:     vec4<f32>   at offset 288 - (count_x, count_y, 0, 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SceneUniforms {
    pub view: [[f32; 4]; 4],
    pub projection: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub shadow_matrix: [[f32; 4]; 4],
    pub light_position: [f32; 4],
    pub camera_position: [f32; 4],
    pub grid_counts: [f32; 4],
}

static_assertions::const_assert_eq!(std::mem::size_of::<SceneUniforms>(), 304);

/// Shared pipelines and buffers for drawing grid cells.
pub struct GridRenderer {
    color_pipeline: wgpu::RenderPipeline,
    depth_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
    uniform_buffer: wgpu::Buffer,
    bind_group_layout: wgpu::BindGroupLayout,
    atlas_sampler: wgpu::Sampler,
    pub shadow: ShadowTarget,
    /// The shared cell mesh, kept for the picking pass
    pub mesh: (Vec<CellVertex>, Vec<u32>),
}

impl GridRenderer {
    pub fn new(device: &wgpu::Device, grid: &GridConfig, surface_format: wgpu::TextureFormat) -> Self {
        let cell_w = grid.step_x() * CELL_FILL;
        let cell_h = grid.step_y() * CELL_FILL;
        let depth = grid.step_x().min(grid.step_y()) * CELL_DEPTH;
        let radius = cell_w.min(cell_h) * CORNER_RADIUS;

        let faces = build_cell_faces(cell_w, cell_h, depth, radius);
        // The camera never orbits behind the grid
        let mesh = merge_faces(&faces, |o| o != FaceOrientation::Back);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cell Vertex Buffer"),
            contents: bytemuck::cast_slice(&mesh.0),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Cell Index Buffer"),
            contents: bytemuck::cast_slice(&mesh.1),
            usage: wgpu::BufferUsages::INDEX,
        });

        let uniform_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Scene Uniforms"),
            size: std::mem::size_of::<SceneUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("Grid Bind Group Layout"),
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
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
                    wgpu::BindGroupLayoutEntry {
                        binding: 3,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            sample_type: wgpu::TextureSampleType::Depth,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            multisampled: false,
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 4,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Comparison),
                        count: None,
                    },
                ],
            });

        let atlas_sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Atlas Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        let shader = create_shader_module(
            device,
            "Cell Shader",
            &ShaderSource::Embedded(crate::render::shader_loader::embedded::CELL),
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Grid Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let primitive = wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        };
        let depth_stencil = wgpu::DepthStencilState {
            format: wgpu::TextureFormat::Depth32Float,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        };

        let color_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Grid Color Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                buffers: &[CellVertex::buffer_layout(), CellInstance::buffer_layout()],
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
            primitive,
            depth_stencil: Some(depth_stencil.clone()),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        let depth_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Grid Shadow Depth Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_shadow"),
                buffers: &[CellVertex::buffer_layout(), CellInstance::buffer_layout()],
                compilation_options: Default::default(),
            },
            // Depth-only: no color target at all
            fragment: None,
            primitive,
            depth_stencil: Some(depth_stencil),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        Self {
            color_pipeline,
            depth_pipeline,
            vertex_buffer,
            index_buffer,
            index_count: mesh.1.len() as u32,
            uniform_buffer,
            bind_group_layout,
            atlas_sampler,
            shadow: ShadowTarget::new(device),
            mesh,
        }
    }

    pub fn write_uniforms(&self, queue: &wgpu::Queue, uniforms: &SceneUniforms) {
        queue.write_buffer(&self.uniform_buffer, 0, bytemuck::bytes_of(uniforms));
    }

    /// Draw one buffer's cells into the shadow map.
    pub fn render_depth<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, view: &'a GridView) {
        pass.set_pipeline(&self.depth_pipeline);
        pass.set_bind_group(0, &view.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, view.instance_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..view.instance_count);
    }

    /// Draw one buffer's cells into the color target.
    pub fn render_color<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, view: &'a GridView) {
        pass.set_pipeline(&self.color_pipeline);
        pass.set_bind_group(0, &view.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_vertex_buffer(1, view.instance_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..view.instance_count);
    }
}

/// Per-buffer GPU state: the animated instance array and the baked atlas.
pub struct GridView {
    instance_buffer: wgpu::Buffer,
    instance_count: u32,
    atlas_texture: wgpu::Texture,
    bind_group: wgpu::BindGroup,
}

impl GridView {
    pub fn new(
        device: &wgpu::Device,
        renderer: &GridRenderer,
        grid: &GridConfig,
        atlas_size: (u32, u32),
        label: &str,
    ) -> Self {
        let instance_count = grid.total();
        let instance_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some(&format!("{label} Instance Buffer")),
            size: (instance_count as u64) * std::mem::size_of::<CellInstance>() as u64,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let atlas_texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(&format!("{label} Atlas")),
            size: wgpu::Extent3d {
                width: atlas_size.0,
                height: atlas_size.1,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let atlas_view = atlas_texture.create_view(&wgpu::TextureViewDescriptor::default());

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Bind Group")),
            layout: &renderer.bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: renderer.uniform_buffer.as_entire_binding(),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&atlas_view),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&renderer.atlas_sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::TextureView(&renderer.shadow.view),
                },
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: wgpu::BindingResource::Sampler(&renderer.shadow.sampler),
                },
            ],
        });

        Self {
            instance_buffer,
            instance_count,
            atlas_texture,
            bind_group,
        }
    }

    /// Upload this frame's instance transforms.
    pub fn upload_instances(&self, queue: &wgpu::Queue, instances: &[CellInstance]) {
        debug_assert_eq!(instances.len(), self.instance_count as usize);
        queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(instances));
    }

    /// Replace the atlas contents with a freshly baked raster.
    pub fn bake_atlas(&self, queue: &wgpu::Queue, atlas: &RasterSurface) {
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.atlas_texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &atlas.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(atlas.width * 4),
                rows_per_image: Some(atlas.height),
            },
            wgpu::Extent3d {
                width: atlas.width,
                height: atlas.height,
                depth_or_array_layers: 1,
            },
        );
    }
}
