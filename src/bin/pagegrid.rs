//! Grid Page Renderer
//!
//! Run with: `cargo run --bin pagegrid`
//!
//! Opens the page grid: every cell is an instanced cube, pages swap with
//! staggered cell waves, hover comes from GPU picking.
//!
//! Controls:
//! - Mouse move: parallax + hover
//! - Click: follow the link under the cursor
//! - F1: toggle shadow-light debug position
//! - ESC: Exit

use std::sync::Arc;
use std::time::Instant;

use glam::Vec3;
use log::info;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowAttributes, WindowId};

use pagegrid_engine::app::{
    builtin_views, find_view, Action, DiskLoader, LoadingPhase, LoadingScreen, ResourceLoader,
    Store, ViewManager,
};
use pagegrid_engine::camera::PerspectiveCamera;
use pagegrid_engine::grid::{ContentItem, GridConfig, ViewDefinition};
use pagegrid_engine::render::{GpuContext, GpuContextConfig, PickingPass};

/// Lattice size and world-space footprint of the page.
const GRID_COUNT_X: u32 = 30;
const GRID_COUNT_Y: u32 = 18;
const GRID_WIDTH_X: f32 = 21.0;
const GRID_WIDTH_Y: f32 = 12.6;

/// Resting camera position once the grid is live.
const CAMERA_REST: Vec3 = Vec3::new(0.0, 0.0, 16.0);
/// Camera position during loading and at the start of the fly-in.
const CAMERA_FAR: Vec3 = Vec3::new(0.0, 0.0, 28.0);

/// Parallax amplitude of the camera, world units.
const PARALLAX: f32 = 1.2;
/// How far the light swings with the pointer along X.
const LIGHT_SWING: f32 = 6.0;

const SEED: u32 = 0x5EED_1234;

/// Last pointer sample plus whether picking has to re-run.
///
/// Picking is a synchronous GPU readback, so it only runs when the pointer
/// actually produced an event. Leaving the window counts as an event with no
/// sample, which resolves hover to no-hit.
struct PointerTracker {
    position: Option<(f32, f32)>,
    dirty: bool,
}

impl PointerTracker {
    fn new() -> Self {
        Self {
            position: None,
            dirty: false,
        }
    }

    fn moved(&mut self, x: f32, y: f32) {
        self.position = Some((x, y));
        self.dirty = true;
    }

    fn left(&mut self) {
        self.position = None;
        self.dirty = true;
    }

    /// Force a re-pick at the current position (the cells under the cursor
    /// change on navigation).
    fn refresh(&mut self) {
        self.dirty = true;
    }

    /// The sample to pick against this frame, or `None` when the pointer has
    /// not changed since the last pick.
    fn take_if_dirty(&mut self) -> Option<Option<(f32, f32)>> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(self.position)
    }
}

struct PageState {
    window: Arc<Window>,
    gpu: GpuContext,
    camera: PerspectiveCamera,
    store: Store,
    views: Vec<ViewDefinition>,
    loader: DiskLoader,
    loading_screen: LoadingScreen,
    view_manager: ViewManager,
    picking: PickingPass,
    pointer: PointerTracker,
    last_frame: Instant,
}

impl PageState {
    fn new(window: Arc<Window>) -> Self {
        let gpu = GpuContext::new(Arc::clone(&window), GpuContextConfig::default());
        let (width, height) = gpu.dimensions();

        let grid = GridConfig::new(GRID_COUNT_X, GRID_COUNT_Y, GRID_WIDTH_X, GRID_WIDTH_Y);
        let mut camera = PerspectiveCamera::new(
            45.0_f32.to_radians(),
            width as f32 / height as f32,
            0.1,
            100.0,
        );
        camera.position = CAMERA_FAR;

        let views = builtin_views();
        let mut loader = DiskLoader::new(".");
        for view in &views {
            for item in &view.items {
                if let ContentItem::Image { value, .. } = item {
                    loader.request(value);
                }
            }
        }

        let view_manager = ViewManager::new(&gpu.device, grid, gpu.format(), SEED);
        let picking = PickingPass::new(
            &gpu.device,
            &grid,
            &view_manager.renderer.mesh.0,
            &view_manager.renderer.mesh.1,
        );
        let loading_screen = LoadingScreen::new(&gpu.device, gpu.format(), SEED ^ 0xABCD);

        Self {
            window,
            gpu,
            camera,
            store: Store::new(),
            views,
            loader,
            loading_screen,
            view_manager,
            picking,
            pointer: PointerTracker::new(),
            last_frame: Instant::now(),
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size.width, size.height);
        if size.height > 0 {
            self.camera.aspect = size.width as f32 / size.height as f32;
        }
    }

    fn handle_pointer_move(&mut self, x: f32, y: f32) {
        self.pointer.moved(x, y);
        self.store.dispatch(Action::SetPointer(Some((x, y))));
    }

    fn handle_pointer_left(&mut self) {
        self.pointer.left();
        self.store.dispatch(Action::SetPointer(None));
    }

    fn handle_click(&mut self) {
        let Some(link) = self.store.state().hovered_link.clone() else {
            return;
        };
        if link.contains(':') {
            // External target: the desktop build only reports it
            info!("external link: {link}");
            return;
        }
        self.navigate(&link);
    }

    fn navigate(&mut self, name: &str) {
        let Some(view) = find_view(&self.views, name).cloned() else {
            info!("unknown page '{name}'");
            return;
        };
        self.store.dispatch(Action::SetView(view.name.clone()));
        self.view_manager
            .set_active_view(&self.gpu.queue, &view, &self.loader);
        self.pointer.refresh();
    }

    /// Resolve hover through the picking pass and push the result into the
    /// store and the shown grid buffer. Runs only when the pointer moved or
    /// left the window since the last pick; a pointer outside the window
    /// resolves to no hit.
    fn update_hover(&mut self) {
        let Some(sample) = self.pointer.take_if_dirty() else {
            return;
        };
        let index = sample.and_then(|(x, y)| {
            self.picking.resolve_hovered_index(
                &self.gpu.device,
                &self.gpu.queue,
                &self.camera,
                self.gpu.dimensions(),
                (x, y),
            )
        });
        let link = self.view_manager.set_hovered_index(index);
        let cursor = if link.is_some() {
            winit::window::CursorIcon::Pointer
        } else {
            winit::window::CursorIcon::Default
        };
        self.window.set_cursor(cursor);
        if self.store.state().hovered_index != index || self.store.state().hovered_link != link {
            self.store.dispatch(Action::SetHovered { index, link });
        }
    }

    fn update(&mut self) {
        let now = Instant::now();
        let dt = (now - self.last_frame).as_secs_f32().min(0.1);
        self.last_frame = now;

        match self.store.state().phase {
            LoadingPhase::Loading => {
                self.loader.advance();
                let progress = self.loader.progress();
                self.store.dispatch(Action::SetLoadingProgress(progress));
                self.loading_screen.model.set_progress(progress);
                if self.loader.is_complete() {
                    self.loading_screen.model.finish();
                    self.store.dispatch(Action::LoadingFinished);
                }
                self.loading_screen.update(dt, &self.gpu.queue, &self.camera);
            }
            LoadingPhase::Finishing => {
                self.loading_screen.update(dt, &self.gpu.queue, &self.camera);
                if self.loading_screen.model.is_collapsed() {
                    self.store.dispatch(Action::GridReady);
                    self.navigate("home");
                }
            }
            LoadingPhase::Ready => {
                let (w, h) = self.gpu.dimensions();
                let mut target = CAMERA_REST;
                let mut light_x = 0.0;
                if let Some((px, py)) = self.store.state().pointer {
                    let nx = px / w as f32 - 0.5;
                    let ny = py / h as f32 - 0.5;
                    target += Vec3::new(nx * PARALLAX, -ny * PARALLAX, 0.0);
                    light_x = nx * LIGHT_SWING;
                }
                self.camera.ease_toward(target, dt, 3.0);
                let light = if self.store.state().debug_overlay {
                    // Pinned oblique light to inspect the shadow projection
                    Vec3::new(6.0, 8.0, 4.0)
                } else {
                    Vec3::new(light_x, 5.0, 5.0)
                };
                self.view_manager.set_light_position(light);
                self.update_hover();
                self.view_manager.update(dt, &self.gpu.queue, &self.camera);
            }
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let frame = self.gpu.get_current_texture()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        let grid_live = self.store.state().phase == LoadingPhase::Ready;
        if grid_live {
            self.view_manager.render_shadow_pass(&mut encoder);
        }

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Color Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    depth_slice: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: 0.07,
                            g: 0.07,
                            b: 0.08,
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.gpu.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            if grid_live {
                self.view_manager.render_color_pass(&mut pass);
            } else {
                self.loading_screen.render(&mut pass);
            }
        }

        self.gpu.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
        Ok(())
    }
}

struct App {
    state: Option<PageState>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title("pagegrid")
            .with_inner_size(PhysicalSize::new(1280, 720));
        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .expect("Failed to create window"),
        );
        self.state = Some(PageState::new(window));
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(state) = &mut self.state else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => state.resize(size),
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Escape) => event_loop.exit(),
                        PhysicalKey::Code(KeyCode::F1) => {
                            state.store.dispatch(Action::ToggleDebugOverlay);
                        }
                        _ => {}
                    }
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                state.handle_pointer_move(position.x as f32, position.y as f32);
            }
            WindowEvent::CursorLeft { .. } => {
                state.handle_pointer_left();
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => state.handle_click(),
            WindowEvent::RedrawRequested => {
                state.update();

                match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        let size = state.window.inner_size();
                        state.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => event_loop.exit(),
                    Err(e) => eprintln!("Render error: {e:?}"),
                }

                state.window.request_redraw();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PointerTracker;

    #[test]
    fn test_pick_runs_once_per_pointer_event() {
        let mut pointer = PointerTracker::new();
        assert_eq!(pointer.take_if_dirty(), None);

        pointer.moved(3.0, 4.0);
        assert_eq!(pointer.take_if_dirty(), Some(Some((3.0, 4.0))));
        // No further event, no further pick
        assert_eq!(pointer.take_if_dirty(), None);
    }

    #[test]
    fn test_leaving_the_window_forces_a_clearing_pick() {
        let mut pointer = PointerTracker::new();
        pointer.moved(3.0, 4.0);
        let _ = pointer.take_if_dirty();

        pointer.left();
        // The leave event yields a sample with no position, which must
        // resolve hover to no hit instead of leaving it stale
        assert_eq!(pointer.take_if_dirty(), Some(None));
        assert_eq!(pointer.take_if_dirty(), None);
    }

    #[test]
    fn test_refresh_repicks_at_the_same_position() {
        let mut pointer = PointerTracker::new();
        pointer.moved(3.0, 4.0);
        let _ = pointer.take_if_dirty();

        pointer.refresh();
        assert_eq!(pointer.take_if_dirty(), Some(Some((3.0, 4.0))));
    }
}

fn main() {
    env_logger::init();

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App { state: None };
    event_loop.run_app(&mut app).unwrap();
}
