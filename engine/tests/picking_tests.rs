//! Picking Tests - Id Encoding and the Single-Pixel Frustum
//!
//! GPU-free end-to-end tests of the picking math: the id color encoding must
//! be collision-free over a realistic lattice, and the cropped frustum for a
//! pointer over a known cell must contain exactly that cell's rest-pose
//! center.

use glam::Vec4Swizzles;

use pagegrid_engine::camera::{pixel_frustum, PerspectiveCamera};
use pagegrid_engine::grid::GridConfig;
use pagegrid_engine::render::{build_pick_instances, decode_cell_id, encode_cell_id};

// ============================================================================
// Id Encoding Tests
// ============================================================================

#[test]
fn test_ids_unique_over_lattice() {
    let grid = GridConfig::new(30, 18, 21.0, 12.6);
    let instances = build_pick_instances(&grid);
    let mut seen = std::collections::HashSet::new();
    for (i, instance) in instances.iter().enumerate() {
        assert!(seen.insert(instance.id_color), "collision at {i}");
        assert_eq!(decode_cell_id(instance.id_color), Some(i as u32));
    }
    assert!(!seen.contains(&[0, 0, 0, 0]), "background id assigned");
}

#[test]
fn test_decode_rejects_background() {
    assert_eq!(decode_cell_id([0, 0, 0, 0]), None);
    assert_eq!(decode_cell_id(encode_cell_id(539)), Some(539));
}

// ============================================================================
// Pixel Frustum Tests
// ============================================================================

fn camera(aspect: f32) -> PerspectiveCamera {
    // Rest pose of the page camera
    PerspectiveCamera::new(45.0_f32.to_radians(), aspect, 0.1, 100.0)
}

/// Project a world point to surface pixels through the camera.
fn project_to_pixels(
    camera: &PerspectiveCamera,
    w: u32,
    h: u32,
    point: glam::Vec3,
) -> (f32, f32) {
    let clip = camera.view_projection() * point.extend(1.0);
    let ndc = clip.xyz() / clip.w;
    (
        (ndc.x + 1.0) * 0.5 * w as f32,
        (1.0 - ndc.y) * 0.5 * h as f32,
    )
}

/// Whether `point` falls inside the cropped frustum.
fn frustum_contains(camera: &PerspectiveCamera, proj: glam::Mat4, point: glam::Vec3) -> bool {
    let clip = proj * camera.view_matrix() * point.extend(1.0);
    let ndc = clip.xyz() / clip.w;
    ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0
}

#[test]
fn test_pointer_over_cell_crops_to_that_cell() {
    let (w, h) = (800, 600);
    let camera = camera(w as f32 / h as f32);
    let grid = GridConfig::new(30, 18, 21.0, 12.6);

    // Aim the pointer at the rest-pose center of an off-center cell
    let (cx, cy) = grid.cell_center(20, 5);
    let center = glam::Vec3::new(cx, cy, 0.0);
    let (px, py) = project_to_pixels(&camera, w, h, center);
    // Aim at the pixel center so the point sits inside the one-pixel window
    // rather than on its boundary
    let proj = pixel_frustum(&camera, w, h, px - 0.5, py - 0.5).unwrap();

    assert!(frustum_contains(&camera, proj, center), "target cell missed");

    // A cell three steps away is far outside the one-pixel frustum
    let (fx, fy) = grid.cell_center(23, 5);
    assert!(!frustum_contains(&camera, proj, glam::Vec3::new(fx, fy, 0.0)));
    let (gx, gy) = grid.cell_center(20, 8);
    assert!(!frustum_contains(&camera, proj, glam::Vec3::new(gx, gy, 0.0)));
}

#[test]
fn test_pointer_outside_surface_misses_grid() {
    let (w, h) = (800, 600);
    let camera = camera(w as f32 / h as f32);
    let grid = GridConfig::new(30, 18, 21.0, 12.6);

    let proj = pixel_frustum(&camera, w, h, -50.0, -50.0).unwrap();
    for i in 0..grid.total() {
        let (x, y) = grid.cell_coords(i);
        let (cx, cy) = grid.cell_center(x, y);
        assert!(
            !frustum_contains(&camera, proj, glam::Vec3::new(cx, cy, 0.0)),
            "cell {i} visible from offscreen pointer"
        );
    }
}

#[test]
fn test_degenerate_surface_short_circuits() {
    let camera = camera(1.0);
    assert!(pixel_frustum(&camera, 0, 0, 0.0, 0.0).is_none());
}
