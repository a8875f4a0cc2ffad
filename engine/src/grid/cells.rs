//! Per-cell animation state for one grid buffer.
//!
//! A [`CellField`] owns every per-cell float array behind one grid buffer:
//! transition Z offsets, transition scales, random phase offsets, the
//! shaded/lit mix and text tint uploaded on `set_view`, and the single hover
//! raise tween. It rebuilds the instance transform array in place every
//! frame; nothing here touches the GPU.

use glam::{Mat4, Vec3};

use crate::animation::{Easing, SimpleRng, Tween, stagger};
use crate::render::instancing::CellInstance;

use super::content::ViewDefinition;
use super::GridConfig;

/// Default wall-clock length of a view transition, seconds.
pub const TRANSITION_DURATION: f32 = 0.75;

/// Wall-clock length of the hover raise/lower tween, seconds.
pub const HOVER_DURATION: f32 = 0.1;

/// Z offset incoming cells rise from.
pub const TRANSITION_DEPTH_IN: f32 = -6.0;

/// Z offset outgoing cells sink toward (toward the camera).
pub const TRANSITION_DEPTH_OUT: f32 = 4.0;

/// The lattice span of the currently hovered content item.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HoverSpan {
    pub start_x: u32,
    pub end_x: u32,
    pub y: u32,
}

/// Which way a cell transition is running.
#[derive(Clone, Copy, Debug, PartialEq)]
enum TransitionDirection {
    /// Cells rise from behind the grid plane and grow from scale 0 to 1
    In { depth: f32 },
    /// Cells sink toward the camera and shrink from scale 1 to 0
    Out,
}

/// One in-flight transition over all cells of this buffer.
#[derive(Clone, Copy, Debug)]
struct CellTransition {
    direction: TransitionDirection,
    elapsed: f32,
    duration: f32,
}

/// Event reported by [`CellField::advance`] when a transition finishes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum CellEvent {
    TransitionInDone,
    TransitionOutDone,
}

/// Per-cell state and transform math for one grid buffer.
pub struct CellField {
    grid: GridConfig,
    /// Transition Z offset per cell
    z_offsets: Vec<f32>,
    /// Transition scale per cell; cells start invisible until the first
    /// transition-in
    scales: Vec<f32>,
    /// Random phase per cell, re-rolled at the start of every transition
    phases: Vec<f32>,
    /// 1 = shaded, 0 = lit (inside an image block)
    shaded_mix: Vec<f32>,
    /// Text tint per cell
    tints: Vec<[f32; 3]>,
    /// Per-cell brightness jitter, fixed at construction
    color_scales: Vec<f32>,
    transition: Option<CellTransition>,
    hover_tween: Option<Tween>,
    hover_z: f32,
    hover_height: f32,
    hover_span: Option<HoverSpan>,
    view: Option<ViewDefinition>,
}

impl CellField {
    /// Create the field for a grid. `seed` fixes the phase/jitter sequences
    /// so a run is reproducible.
    pub fn new(grid: GridConfig, seed: u32) -> Self {
        let total = grid.total() as usize;
        let mut rng = SimpleRng::new(seed);
        let color_scales = (0..total).map(|_| rng.range(0.95, 1.0)).collect();
        Self {
            grid,
            z_offsets: vec![0.0; total],
            scales: vec![0.0; total],
            phases: vec![0.0; total],
            shaded_mix: vec![1.0; total],
            tints: vec![[0.0, 0.0, 0.0]; total],
            color_scales,
            transition: None,
            hover_tween: None,
            hover_z: 0.0,
            hover_height: grid.step_y() * 0.9,
            hover_span: None,
            view: None,
        }
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn view(&self) -> Option<&ViewDefinition> {
        self.view.as_ref()
    }

    /// Per-cell shaded/lit mix factors, refreshed by [`set_view`].
    ///
    /// [`set_view`]: CellField::set_view
    pub fn shaded_mix(&self) -> &[f32] {
        &self.shaded_mix
    }

    pub fn tints(&self) -> &[[f32; 3]] {
        &self.tints
    }

    /// Install a view definition and rebuild the per-cell content
    /// attributes: cells inside an image block go lit, cells under a text
    /// item pick up its tint. Called once per view change, not per frame.
    pub fn set_view(&mut self, view: ViewDefinition) {
        let image = view.image().cloned();
        for i in 0..self.grid.total() {
            let (x, y) = self.grid.cell_coords(i);
            let idx = i as usize;

            self.shaded_mix[idx] = match &image {
                Some(img) if img.contains_cell(&self.grid, x, y) => 0.0,
                _ => 1.0,
            };

            self.tints[idx] = [1.0, 0.2, 0.2];
            for item in &view.items {
                if item.link().is_some() || item.text_color().is_some() {
                    if item.contains_cell(&self.grid, x, y) {
                        if let Some(color) = item.text_color() {
                            self.tints[idx] = color;
                        }
                    }
                }
            }
        }
        self.view = Some(view);
        self.hover_span = None;
    }

    /// Resolve a picked cell index against the current view.
    ///
    /// Returns the hovered item's navigation target. Starts the raise tween
    /// when a linked item is entered and the lower tween when it is left;
    /// either replaces any in-flight hover tween. `None` index means the
    /// pointer is over no cell. Hover before any `set_view` degrades to a
    /// no-op.
    pub fn set_hovered_index(&mut self, index: Option<u32>) -> Option<String> {
        let Some(view) = &self.view else {
            return None;
        };

        let hovered = index.filter(|&i| i < self.grid.total()).and_then(|i| {
            let (x, y) = self.grid.cell_coords(i);
            view.item_at(&self.grid, x, y)
                .filter(|item| item.link().is_some())
                .map(|item| {
                    let (ax, _) = item.anchor();
                    (
                        HoverSpan {
                            start_x: ax,
                            end_x: ax + item.span_x(),
                            y,
                        },
                        item.link().unwrap_or_default().to_string(),
                    )
                })
        });

        match hovered {
            Some((span, link)) => {
                self.hover_span = Some(span);
                self.retarget_hover(self.hover_height);
                Some(link)
            }
            None => {
                self.retarget_hover(0.0);
                None
            }
        }
    }

    fn retarget_hover(&mut self, target: f32) {
        let current_target = self
            .hover_tween
            .as_ref()
            .map(|t| t.target())
            .unwrap_or(self.hover_z);
        if (current_target - target).abs() < f32::EPSILON {
            return;
        }
        let tween = match &self.hover_tween {
            Some(t) => t.retarget(target, HOVER_DURATION),
            None => Tween::new(self.hover_z, target, HOVER_DURATION, Easing::SmoothStep),
        };
        self.hover_tween = Some(tween);
    }

    /// Current hover raise offset.
    pub fn hover_z(&self) -> f32 {
        self.hover_z
    }

    pub fn hover_span(&self) -> Option<HoverSpan> {
        self.hover_span
    }

    /// Whether a raise/lower tween is currently running.
    pub fn is_hover_tweening(&self) -> bool {
        self.hover_tween.is_some()
    }

    /// Begin the rise-in transition: cells start at `TRANSITION_DEPTH_IN`
    /// (plus the buffer's own resting depth) with scale 0 and wave up to
    /// rest. Replaces any in-flight transition.
    pub fn begin_transition_in(&mut self, rng: &mut SimpleRng) {
        self.roll_phases(rng);
        for i in 0..self.z_offsets.len() {
            self.z_offsets[i] = TRANSITION_DEPTH_IN;
            self.scales[i] = 0.0;
        }
        self.transition = Some(CellTransition {
            direction: TransitionDirection::In {
                depth: TRANSITION_DEPTH_IN,
            },
            elapsed: 0.0,
            duration: TRANSITION_DURATION,
        });
    }

    /// Begin the sink-out transition: cells wave from rest toward the camera
    /// while shrinking to 0. Replaces any in-flight transition.
    pub fn begin_transition_out(&mut self, rng: &mut SimpleRng) {
        self.roll_phases(rng);
        for i in 0..self.z_offsets.len() {
            self.z_offsets[i] = 0.0;
            self.scales[i] = 1.0;
        }
        self.transition = Some(CellTransition {
            direction: TransitionDirection::Out,
            elapsed: 0.0,
            duration: TRANSITION_DURATION,
        });
    }

    /// Snap the buffer to its fully-visible rest state.
    pub fn reset(&mut self) {
        self.transition = None;
        self.z_offsets.fill(0.0);
        self.scales.fill(1.0);
    }

    fn roll_phases(&mut self, rng: &mut SimpleRng) {
        for phase in &mut self.phases {
            *phase = rng.next_f32();
        }
    }

    /// Whether a transition is in flight.
    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    /// Advance hover and transition animation by `dt` seconds.
    pub fn advance(&mut self, dt: f32) -> Option<CellEvent> {
        if let Some(tween) = &mut self.hover_tween {
            self.hover_z = tween.advance(dt);
            if tween.is_done() {
                self.hover_tween = None;
            }
        }

        let Some(transition) = &mut self.transition else {
            return None;
        };
        transition.elapsed = (transition.elapsed + dt).min(transition.duration);
        let v = if transition.duration > 0.0 {
            transition.elapsed / transition.duration
        } else {
            1.0
        };
        let direction = transition.direction;
        let done = transition.elapsed >= transition.duration;

        for i in 0..self.z_offsets.len() {
            // Both Z and scale follow the same per-cell staggered progress
            let p = stagger(v, self.phases[i], 0.0, 1.0);
            match direction {
                TransitionDirection::In { depth } => {
                    self.z_offsets[i] = depth * (1.0 - p);
                    self.scales[i] = p;
                }
                TransitionDirection::Out => {
                    self.z_offsets[i] = TRANSITION_DEPTH_OUT * p;
                    self.scales[i] = 1.0 - p;
                }
            }
        }

        if done {
            let event = match direction {
                TransitionDirection::In { .. } => CellEvent::TransitionInDone,
                TransitionDirection::Out => CellEvent::TransitionOutDone,
            };
            self.transition = None;
            Some(event)
        } else {
            None
        }
    }

    /// Rebuild the instance transform array in place.
    ///
    /// `out` must hold exactly one instance per cell. Only the transform is
    /// animated per frame; content attributes were fixed by `set_view` and
    /// construction.
    pub fn write_instances(&self, out: &mut [CellInstance]) {
        assert_eq!(out.len(), self.grid.total() as usize);
        for i in 0..self.grid.total() {
            let (x, y) = self.grid.cell_coords(i);
            let idx = i as usize;
            let (px, py) = self.grid.cell_center(x, y);

            let mut pz = self.z_offsets[idx];
            if let Some(span) = self.hover_span {
                if x >= span.start_x && x < span.end_x && y == span.y {
                    pz += self.hover_z;
                }
            }

            let s = self.scales[idx];
            let model = Mat4::from_translation(Vec3::new(px, py, pz))
                * Mat4::from_scale(Vec3::splat(s));

            out[idx] = CellInstance {
                model: model.to_cols_array_2d(),
                cell_index: i as f32,
                shaded_mix: self.shaded_mix[idx],
                color_scale: self.color_scales[idx],
                tint: self.tints[idx],
            };
        }
    }
}
