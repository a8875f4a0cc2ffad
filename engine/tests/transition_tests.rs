//! Transition Tests - Two-Buffer View Crossfade
//!
//! End-to-end tests for the staggered wave transitions across the two grid
//! buffers: exact endpoints, parallel in/out halves and cancellation of
//! in-flight transitions.

use pagegrid_engine::grid::{
    ActiveBuffer, ContentItem, GridConfig, TransitionState, ViewDefinition, ViewFlow,
};
use pagegrid_engine::render::CellInstance;

fn view(name: &str) -> ViewDefinition {
    ViewDefinition::new(
        name,
        vec![ContentItem::Text {
            x: 0,
            y: 0,
            value: "X".into(),
            padding_left: 0.0,
            link: Some(name.to_string()),
            text_color: None,
        }],
    )
}

fn flow() -> ViewFlow {
    ViewFlow::new(GridConfig::new(5, 4, 5.0, 4.0), 77)
}

fn run_to_idle(flow: &mut ViewFlow) {
    for _ in 0..300 {
        flow.advance(0.016);
        if flow.state() == TransitionState::Idle {
            return;
        }
    }
    panic!("transition never settled: {:?}", flow.state());
}

fn scales(flow: &ViewFlow, buffer: ActiveBuffer) -> Vec<f32> {
    let grid = *flow.field(buffer).grid();
    let mut instances = vec![CellInstance::default(); grid.total() as usize];
    flow.field(buffer).write_instances(&mut instances);
    // Uniform scale lives on the diagonal of the model matrix
    instances.iter().map(|i| i.model[0][0]).collect()
}

// ============================================================================
// Endpoint Tests
// ============================================================================

#[test]
fn test_cells_start_invisible_and_end_at_rest() {
    let mut f = flow();
    assert!(scales(&f, ActiveBuffer::A).iter().all(|&s| s == 0.0));

    f.set_active_view(view("home"));
    run_to_idle(&mut f);

    // Every cell lands exactly at scale 1 and depth 0, no residue
    let mut instances = vec![CellInstance::default(); 20];
    f.field(ActiveBuffer::A).write_instances(&mut instances);
    for instance in &instances {
        assert_eq!(instance.model[0][0], 1.0);
        assert_eq!(instance.model[3][2], 0.0);
    }
}

#[test]
fn test_wave_moves_cells_at_different_times() {
    let mut f = flow();
    f.set_active_view(view("home"));
    // Mid-transition the staggered phases spread the per-cell progress
    for _ in 0..20 {
        f.advance(0.016);
    }
    let s = scales(&f, ActiveBuffer::A);
    let min = s.iter().cloned().fold(f32::INFINITY, f32::min);
    let max = s.iter().cloned().fold(0.0, f32::max);
    assert!(max - min > 0.05, "no stagger: all cells at {max}");
}

// ============================================================================
// Crossfade Tests
// ============================================================================

#[test]
fn test_swap_animates_both_buffers_in_parallel() {
    let mut f = flow();
    f.set_active_view(view("home"));
    run_to_idle(&mut f);

    f.set_active_view(view("about"));
    assert_eq!(f.state(), TransitionState::Both);
    for _ in 0..20 {
        f.advance(0.016);
    }

    // Outgoing buffer shrinks while the incoming one grows
    let outgoing = scales(&f, ActiveBuffer::A);
    let incoming = scales(&f, ActiveBuffer::B);
    assert!(outgoing.iter().any(|&s| s < 1.0 && s > 0.0));
    assert!(incoming.iter().any(|&s| s > 0.0 && s < 1.0));

    run_to_idle(&mut f);
    assert!(scales(&f, ActiveBuffer::A).iter().all(|&s| s == 0.0));
    assert!(scales(&f, ActiveBuffer::B).iter().all(|&s| s == 1.0));
}

#[test]
fn test_both_halves_may_finish_in_one_tick() {
    let mut f = flow();
    f.set_active_view(view("home"));
    run_to_idle(&mut f);

    f.set_active_view(view("about"));
    // One giant step pushes both halves past their duration together
    f.advance(10.0);
    assert_eq!(f.state(), TransitionState::Idle);
    assert_eq!(f.active(), ActiveBuffer::B);
}

#[test]
fn test_rapid_navigation_never_stacks_transitions() {
    let mut f = flow();
    f.set_active_view(view("home"));
    f.advance(0.1);
    f.set_active_view(view("about"));
    f.advance(0.1);
    f.set_active_view(view("work"));
    f.advance(0.1);
    f.set_active_view(view("contact"));

    run_to_idle(&mut f);
    assert_eq!(f.current_view_name(), Some("contact"));
    // Exactly one buffer visible at rest
    let visible = [ActiveBuffer::A, ActiveBuffer::B]
        .iter()
        .filter(|&&b| f.is_visible(b))
        .count();
    assert_eq!(visible, 1);
    assert!(scales(&f, f.active()).iter().all(|&s| s == 1.0));
}
