//! Two-buffer view transition state machine.
//!
//! Exactly two grid buffers exist. Swapping views runs the outgoing buffer's
//! sink-out wave and the incoming buffer's rise-in wave in parallel; the very
//! first view runs rise-in only. While a transition is in flight the incoming
//! buffer is tracked separately; the active-buffer flag flips only once the
//! whole transition has settled, so re-entrant swap requests can never
//! double-flip it.

use log::debug;

use crate::animation::SimpleRng;

use super::cells::{CellEvent, CellField};
use super::content::ViewDefinition;
use super::GridConfig;

/// Which of the two grid buffers carries the settled active view.
///
/// Named handles instead of index flips: the flip happens in exactly one
/// place, at transition completion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActiveBuffer {
    A,
    B,
}

impl ActiveBuffer {
    pub fn other(self) -> ActiveBuffer {
        match self {
            ActiveBuffer::A => ActiveBuffer::B,
            ActiveBuffer::B => ActiveBuffer::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            ActiveBuffer::A => 0,
            ActiveBuffer::B => 1,
        }
    }
}

/// Transition phase of the view manager.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionState {
    /// No transition running; exactly one buffer is active and at rest
    Idle,
    /// First view ever: the named buffer is rising in, nothing fades out
    TransitioningIn(ActiveBuffer),
    /// The named buffer is sinking out on its own (its rise-in counterpart
    /// already finished)
    TransitioningOut(ActiveBuffer),
    /// Full crossfade: incoming and outgoing buffers animate concurrently
    Both,
}

/// The two cell fields plus the crossfade state machine over them.
///
/// This is the CPU core of the view manager; the GPU wrapper uploads the
/// fields' instance arrays and textures but owns no transition logic.
pub struct ViewFlow {
    fields: [CellField; 2],
    active: ActiveBuffer,
    /// Buffer rising in while a transition runs; becomes active on settle
    incoming: Option<ActiveBuffer>,
    state: TransitionState,
    current_view: Option<ViewDefinition>,
    rng: SimpleRng,
}

impl ViewFlow {
    pub fn new(grid: GridConfig, seed: u32) -> Self {
        Self {
            fields: [CellField::new(grid, seed), CellField::new(grid, seed ^ 0x9e37_79b9)],
            active: ActiveBuffer::A,
            incoming: None,
            state: TransitionState::Idle,
            current_view: None,
            rng: SimpleRng::new(seed.wrapping_mul(2654435761).max(1)),
        }
    }

    pub fn state(&self) -> TransitionState {
        self.state
    }

    /// Buffer holding the settled active view. While a transition runs this
    /// is still the outgoing buffer; it flips when the transition settles.
    pub fn active(&self) -> ActiveBuffer {
        self.active
    }

    pub fn field(&self, buffer: ActiveBuffer) -> &CellField {
        &self.fields[buffer.index()]
    }

    pub fn field_mut(&mut self, buffer: ActiveBuffer) -> &mut CellField {
        &mut self.fields[buffer.index()]
    }

    /// Name of the view currently shown (or incoming).
    pub fn current_view_name(&self) -> Option<&str> {
        self.current_view.as_ref().map(|v| v.name.as_str())
    }

    /// Swap the grid to a new view.
    ///
    /// The incoming buffer receives the new definition and rises in; the
    /// outgoing buffer keeps the previous definition and sinks out. Calling
    /// this while a transition is already running cancels and replaces the
    /// in-flight waves; afterwards there is exactly one transition per
    /// buffer, never a stack. Returns the buffer whose content (atlas
    /// texture) must be re-baked.
    pub fn set_active_view(&mut self, view: ViewDefinition) -> ActiveBuffer {
        debug!("switching active view to '{}'", view.name);
        let first_view = self.current_view.is_none();
        let incoming = match self.incoming {
            // Mid-transition: the buffer that was rising becomes the new
            // outgoing one
            Some(buffer) => buffer.other(),
            None if first_view => self.active,
            None => self.active.other(),
        };
        let outgoing = incoming.other();

        let previous = self.current_view.replace(view.clone());
        self.fields[incoming.index()].set_view(view);
        self.fields[incoming.index()].begin_transition_in(&mut self.rng);
        self.incoming = Some(incoming);

        if let Some(previous) = previous {
            self.fields[outgoing.index()].set_view(previous);
            self.fields[outgoing.index()].begin_transition_out(&mut self.rng);
            self.state = TransitionState::Both;
        } else {
            self.state = TransitionState::TransitioningIn(incoming);
        }
        incoming
    }

    /// Forward a pick result to the buffer showing the current view (the
    /// incoming one while a transition runs).
    ///
    /// Returns the hovered item's navigation target, if any.
    pub fn set_hovered_index(&mut self, index: Option<u32>) -> Option<String> {
        let target = self.incoming.unwrap_or(self.active);
        self.fields[target.index()].set_hovered_index(index)
    }

    /// Advance both buffers by `dt` seconds and settle the state machine.
    pub fn advance(&mut self, dt: f32) {
        let mut events = [None, None];
        for (i, field) in self.fields.iter_mut().enumerate() {
            events[i] = field.advance(dt);
        }

        for (i, event) in events.into_iter().enumerate() {
            let Some(event) = event else { continue };
            let buffer = if i == 0 { ActiveBuffer::A } else { ActiveBuffer::B };
            match (self.state, event) {
                (TransitionState::TransitioningIn(b), CellEvent::TransitionInDone) if b == buffer => {
                    self.state = TransitionState::Idle;
                }
                (TransitionState::Both, CellEvent::TransitionInDone) => {
                    // Incoming half done first; wait for the outgoing half
                    self.state = TransitionState::TransitioningOut(buffer.other());
                }
                (TransitionState::Both, CellEvent::TransitionOutDone) => {
                    self.state = TransitionState::TransitioningIn(buffer.other());
                }
                (TransitionState::TransitioningOut(b), CellEvent::TransitionOutDone) if b == buffer => {
                    self.state = TransitionState::Idle;
                }
                _ => {}
            }
        }

        if self.state == TransitionState::Idle {
            if let Some(incoming) = self.incoming.take() {
                self.active = incoming;
            }
            debug_assert!(
                !self.fields[0].is_transitioning() && !self.fields[1].is_transitioning()
            );
        }
    }

    /// Whether the named buffer should be drawn this frame: the settled
    /// active buffer, the incoming one, and any buffer still sinking out.
    pub fn is_visible(&self, buffer: ActiveBuffer) -> bool {
        buffer == self.active
            || self.incoming == Some(buffer)
            || self.fields[buffer.index()].is_transitioning()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::content::ContentItem;

    fn view(name: &str) -> ViewDefinition {
        ViewDefinition::new(
            name,
            vec![ContentItem::Text {
                x: 0,
                y: 0,
                value: "x".into(),
                padding_left: 0.0,
                link: Some(name.to_string()),
                text_color: None,
            }],
        )
    }

    fn flow() -> ViewFlow {
        ViewFlow::new(GridConfig::new(3, 3, 3.0, 3.0), 42)
    }

    fn run_to_idle(flow: &mut ViewFlow) {
        for _ in 0..200 {
            flow.advance(0.016);
            if flow.state() == TransitionState::Idle {
                return;
            }
        }
        panic!("transition never settled: {:?}", flow.state());
    }

    #[test]
    fn test_first_view_is_in_only() {
        let mut f = flow();
        let incoming = f.set_active_view(view("home"));
        assert_eq!(incoming, ActiveBuffer::A);
        assert_eq!(f.state(), TransitionState::TransitioningIn(ActiveBuffer::A));
        run_to_idle(&mut f);
        assert_eq!(f.active(), ActiveBuffer::A);
    }

    #[test]
    fn test_swap_flips_buffer_only_on_completion() {
        let mut f = flow();
        f.set_active_view(view("home"));
        run_to_idle(&mut f);

        let incoming = f.set_active_view(view("about"));
        assert_eq!(incoming, ActiveBuffer::B);
        assert_eq!(f.state(), TransitionState::Both);
        // Mid-transition the settled buffer is still A
        assert_eq!(f.active(), ActiveBuffer::A);
        assert!(f.is_visible(ActiveBuffer::A));
        assert!(f.is_visible(ActiveBuffer::B));

        run_to_idle(&mut f);
        assert_eq!(f.active(), ActiveBuffer::B);
        assert!(!f.is_visible(ActiveBuffer::A));
        assert_eq!(f.current_view_name(), Some("about"));
    }

    #[test]
    fn test_reentrant_swap_replaces_in_flight() {
        let mut f = flow();
        f.set_active_view(view("home"));
        run_to_idle(&mut f);

        f.set_active_view(view("about"));
        f.advance(0.1); // mid-transition
        let incoming = f.set_active_view(view("work"));
        // The mid-rise buffer turns around; A rises again
        assert_eq!(incoming, ActiveBuffer::A);
        assert_eq!(f.state(), TransitionState::Both);

        run_to_idle(&mut f);
        assert_eq!(f.active(), ActiveBuffer::A);
        assert_eq!(f.current_view_name(), Some("work"));
        // Terminal state: exactly one buffer visible, both at rest
        assert!(f.is_visible(ActiveBuffer::A));
        assert!(!f.is_visible(ActiveBuffer::B));
    }

    #[test]
    fn test_hover_routed_to_shown_view() {
        let mut f = flow();
        f.set_active_view(view("home"));
        run_to_idle(&mut f);
        // "x" at content (0,0) is lattice (0, 2) on a 3x3 grid
        let idx = f.field(ActiveBuffer::A).grid().cell_index(0, 2);
        assert_eq!(f.set_hovered_index(Some(idx)), Some("home".into()));
        assert_eq!(f.set_hovered_index(None), None);
    }

    #[test]
    fn test_hover_targets_incoming_buffer_mid_transition() {
        let mut f = flow();
        f.set_active_view(view("home"));
        run_to_idle(&mut f);
        f.set_active_view(view("about"));
        // The incoming view answers hover even before the flip
        let idx = f.field(ActiveBuffer::B).grid().cell_index(0, 2);
        assert_eq!(f.set_hovered_index(Some(idx)), Some("about".into()));
    }
}
