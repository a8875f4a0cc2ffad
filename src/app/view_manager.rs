//! View Manager
//!
//! Couples the engine-side transition state machine ([`ViewFlow`]) to the
//! two GPU grid buffers. Swapping pages re-bakes the incoming buffer's atlas
//! and starts the crossfade; per frame it advances the flow and uploads the
//! instance arrays of whichever buffers are visible.

use glam::Vec3;
use log::info;

use crate::camera::PerspectiveCamera;
use crate::grid::{ActiveBuffer, GridConfig, TransitionState, ViewDefinition, ViewFlow};
use crate::render::{matrices_differ, CellInstance, ShadowSettings};

use super::resources::{AtlasBaker, ResourceLoader};
use super::view::{GridRenderer, GridView, SceneUniforms};

pub struct ViewManager {
    grid: GridConfig,
    flow: ViewFlow,
    pub renderer: GridRenderer,
    views: [GridView; 2],
    baker: AtlasBaker,
    instances: Vec<CellInstance>,
    shadow: ShadowSettings,
    shadow_matrix: glam::Mat4,
    light_view_proj: glam::Mat4,
}

impl ViewManager {
    pub fn new(
        device: &wgpu::Device,
        grid: GridConfig,
        surface_format: wgpu::TextureFormat,
        seed: u32,
    ) -> Self {
        let renderer = GridRenderer::new(device, &grid, surface_format);
        let baker = AtlasBaker::new(&grid);
        let atlas_size = baker.atlas_size();
        let views = [
            GridView::new(device, &renderer, &grid, atlas_size, "Grid Buffer A"),
            GridView::new(device, &renderer, &grid, atlas_size, "Grid Buffer B"),
        ];
        let shadow = ShadowSettings::default();
        Self {
            flow: ViewFlow::new(grid, seed),
            renderer,
            views,
            baker,
            instances: vec![CellInstance::default(); grid.total() as usize],
            shadow_matrix: shadow.texture_matrix(),
            light_view_proj: shadow.light_projection_matrix() * shadow.light_view_matrix(),
            shadow,
            grid,
        }
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn current_view_name(&self) -> Option<&str> {
        self.flow.current_view_name()
    }

    pub fn state(&self) -> TransitionState {
        self.flow.state()
    }

    /// Swap to a page: bake its atlas into the incoming buffer and start the
    /// transition waves.
    pub fn set_active_view(
        &mut self,
        queue: &wgpu::Queue,
        view: &ViewDefinition,
        loader: &dyn ResourceLoader,
    ) {
        info!("navigating to '{}'", view.name);
        let atlas = self.baker.bake(view, loader);
        let incoming = self.flow.set_active_view(view.clone());
        self.views[incoming.index()].bake_atlas(queue, &atlas);
    }

    /// Forward the picked cell to the buffer showing the current view;
    /// returns the hovered navigation target, if any.
    pub fn set_hovered_index(&mut self, index: Option<u32>) -> Option<String> {
        self.flow.set_hovered_index(index)
    }

    /// Move the light. The shadow matrices only recompute when the result
    /// actually changes.
    pub fn set_light_position(&mut self, position: Vec3) {
        let settings = ShadowSettings {
            position,
            ..self.shadow
        };
        let matrix = settings.texture_matrix();
        if matrices_differ(&matrix, &self.shadow_matrix) {
            self.shadow = settings;
            self.shadow_matrix = matrix;
            self.light_view_proj =
                settings.light_projection_matrix() * settings.light_view_matrix();
        }
    }

    /// Advance animation and upload uniforms plus the visible instance
    /// arrays.
    pub fn update(&mut self, dt: f32, queue: &wgpu::Queue, camera: &PerspectiveCamera) {
        self.flow.advance(dt);

        let uniforms = SceneUniforms {
            view: camera.view_matrix().to_cols_array_2d(),
            projection: camera.projection_matrix().to_cols_array_2d(),
            light_view_proj: self.light_view_proj.to_cols_array_2d(),
            shadow_matrix: self.shadow_matrix.to_cols_array_2d(),
            light_position: self.shadow.position.extend(1.0).to_array(),
            camera_position: camera.position.extend(1.0).to_array(),
            grid_counts: [self.grid.count_x as f32, self.grid.count_y as f32, 0.0, 0.0],
        };
        self.renderer.write_uniforms(queue, &uniforms);

        for buffer in [ActiveBuffer::A, ActiveBuffer::B] {
            if self.flow.is_visible(buffer) {
                self.flow.field(buffer).write_instances(&mut self.instances);
                self.views[buffer.index()].upload_instances(queue, &self.instances);
            }
        }
    }

    /// Record the shadow depth pass for every visible buffer.
    pub fn render_shadow_pass(&self, encoder: &mut wgpu::CommandEncoder) {
        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Shadow Pass"),
            color_attachments: &[],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &self.renderer.shadow.view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        for buffer in [ActiveBuffer::A, ActiveBuffer::B] {
            if self.flow.is_visible(buffer) {
                self.renderer.render_depth(&mut pass, &self.views[buffer.index()]);
            }
        }
    }

    /// Record the color pass for every visible buffer into an already-begun
    /// render pass.
    pub fn render_color_pass<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>) {
        for buffer in [ActiveBuffer::A, ActiveBuffer::B] {
            if self.flow.is_visible(buffer) {
                self.renderer.render_color(pass, &self.views[buffer.index()]);
            }
        }
    }
}
