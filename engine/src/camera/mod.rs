//! Camera Module
//!
//! Perspective and orthographic cameras plus the single-pixel sub-frustum
//! used by GPU picking. This module is window-system agnostic - it only
//! deals with camera state and math.
//!
//! All projections use wgpu clip-space conventions (right-handed view,
//! depth 0..1).

use glam::{Mat4, Vec3, Vec4};

/// Perspective camera defined by position, look-at target and a symmetric
/// vertical field of view.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    pub target: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl PerspectiveCamera {
    pub fn new(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 16.0),
            target: Vec3::ZERO,
            fov_y,
            aspect,
            near,
            far,
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Ease the camera position toward a target point, frame-rate
    /// independent enough for UI motion (`k` around 3).
    pub fn ease_toward(&mut self, target: Vec3, dt: f32, k: f32) {
        self.position += (target - self.position) * (dt * k).min(1.0);
    }
}

/// Orthographic camera, the flat-projection sibling of
/// [`PerspectiveCamera`] with the same view conventions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OrthographicCamera {
    pub position: Vec3,
    pub target: Vec3,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
    pub top: f32,
    pub near: f32,
    pub far: f32,
}

impl OrthographicCamera {
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}

/// Off-center perspective projection (right-handed, depth 0..1).
///
/// The general form of `Mat4::perspective_rh`: the near plane rectangle is
/// given explicitly, which is what lets picking crop the frustum down to a
/// single pixel.
pub fn frustum_projection(
    left: f32,
    right: f32,
    bottom: f32,
    top: f32,
    near: f32,
    far: f32,
) -> Mat4 {
    let rcp_width = 1.0 / (right - left);
    let rcp_height = 1.0 / (top - bottom);
    let r = far / (near - far);
    Mat4::from_cols(
        Vec4::new(2.0 * near * rcp_width, 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 * near * rcp_height, 0.0, 0.0),
        Vec4::new(
            (right + left) * rcp_width,
            (top + bottom) * rcp_height,
            r,
            -1.0,
        ),
        Vec4::new(0.0, 0.0, near * far / (near - far), 0.0),
    )
}

/// Crop a camera's full frustum to the 1x1-pixel sub-frustum under a pointer
/// position, by linear interpolation of the near-plane rectangle.
///
/// `pointer` is in surface pixels with y growing downward (window
/// convention). Returns `None` when the surface is degenerate — picking
/// must short-circuit to "no hit" rather than divide by zero. A pointer
/// outside the surface yields a frustum that contains no grid geometry, so
/// it decodes to "no hit" without special-casing.
pub fn pixel_frustum(
    camera: &PerspectiveCamera,
    surface_width: u32,
    surface_height: u32,
    pointer_x: f32,
    pointer_y: f32,
) -> Option<Mat4> {
    if surface_width == 0 || surface_height == 0 {
        return None;
    }
    let w = surface_width as f32;
    let h = surface_height as f32;

    let top = (camera.fov_y * 0.5).tan() * camera.near;
    let bottom = -top;
    let left = camera.aspect * bottom;
    let right = camera.aspect * top;

    // Flip y: pixel row 0 is the top of the surface, frustum top is +y
    let px = pointer_x;
    let py = h - pointer_y - 1.0;

    let sub_left = left + px * (right - left) / w;
    let sub_bottom = bottom + py * (top - bottom) / h;
    let sub_width = (right - left) / w;
    let sub_height = (top - bottom) / h;

    Some(frustum_projection(
        sub_left,
        sub_left + sub_width,
        sub_bottom,
        sub_bottom + sub_height,
        camera.near,
        camera.far,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frustum_matches_symmetric_perspective() {
        // The off-center projection with a symmetric rectangle must equal
        // the canonical perspective matrix.
        let fov_y = 45.0_f32.to_radians();
        let aspect = 16.0 / 9.0;
        let (near, far) = (0.1, 100.0);
        let top = (fov_y * 0.5).tan() * near;
        let right = top * aspect;

        let a = frustum_projection(-right, right, -top, top, near, far);
        let b = Mat4::perspective_rh(fov_y, aspect, near, far);
        for (x, y) in a.to_cols_array().iter().zip(b.to_cols_array().iter()) {
            assert!((x - y).abs() < 1e-5, "{a:?} != {b:?}");
        }
    }

    #[test]
    fn test_pixel_frustum_contains_center_ray() {
        // The sub-frustum for the surface center pixel must project a point
        // straight ahead of the camera into clip space.
        let camera = PerspectiveCamera::new(45.0_f32.to_radians(), 1.0, 0.1, 100.0);
        let proj = pixel_frustum(&camera, 101, 101, 50.0, 50.0).unwrap();
        let view = camera.view_matrix();
        let ahead = camera.position + (camera.target - camera.position).normalize() * 10.0;
        let clip = proj * view * ahead.extend(1.0);
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        assert!(ndc_x.abs() <= 1.5, "center ray missed: {ndc_x}");
        assert!(ndc_y.abs() <= 1.5, "center ray missed: {ndc_y}");
    }

    #[test]
    fn test_pixel_frustum_excludes_offscreen_points() {
        // A pointer far outside the surface produces a frustum that no
        // on-grid point falls into.
        let camera = PerspectiveCamera::new(45.0_f32.to_radians(), 1.0, 0.1, 100.0);
        let proj = pixel_frustum(&camera, 100, 100, -2000.0, -2000.0).unwrap();
        let view = camera.view_matrix();
        let clip = proj * view * Vec3::ZERO.extend(1.0);
        let ndc_x = clip.x / clip.w;
        let ndc_y = clip.y / clip.w;
        assert!(
            ndc_x.abs() > 1.0 || ndc_y.abs() > 1.0,
            "origin unexpectedly visible"
        );
    }

    #[test]
    fn test_degenerate_surface_yields_none() {
        let camera = PerspectiveCamera::new(45.0_f32.to_radians(), 1.0, 0.1, 100.0);
        assert!(pixel_frustum(&camera, 0, 100, 10.0, 10.0).is_none());
        assert!(pixel_frustum(&camera, 100, 0, 10.0, 10.0).is_none());
    }

    #[test]
    fn test_orthographic_preserves_lateral_offsets() {
        // Points at different depths on the same lateral offset project to
        // the same NDC position under the flat projection.
        let camera = OrthographicCamera {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            left: -2.0,
            right: 2.0,
            bottom: -2.0,
            top: 2.0,
            near: 0.1,
            far: 100.0,
        };
        let vp = camera.view_projection();
        let near_pt = vp * Vec3::new(1.0, 1.0, 5.0).extend(1.0);
        let far_pt = vp * Vec3::new(1.0, 1.0, -5.0).extend(1.0);
        assert!((near_pt.x / near_pt.w - far_pt.x / far_pt.w).abs() < 1e-6);
        assert!((near_pt.y / near_pt.w - far_pt.y / far_pt.w).abs() < 1e-6);
        assert!((near_pt.x / near_pt.w - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_ease_toward_converges() {
        let mut camera = PerspectiveCamera::new(1.0, 1.0, 0.1, 100.0);
        let target = Vec3::new(3.0, -2.0, 10.0);
        for _ in 0..500 {
            camera.ease_toward(target, 0.016, 3.0);
        }
        assert!((camera.position - target).length() < 1e-3);
    }
}
