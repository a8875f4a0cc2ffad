//! Shadow Mapping
//!
//! A single point light renders the grid into an offscreen depth
//! target; the color pass samples that target through one combined matrix
//! mapping world space straight to shadow-map UV + depth. That matrix is the
//! only shadow state the rest of the renderer needs.

use glam::{Mat4, Vec3, Vec4};

/// Shadow map resolution (square).
pub const DEPTH_TEXTURE_SIZE: u32 = 1024;

/// Light parameters for the shadow pass.
///
/// Recomputed only when the parameters change, then broadcast to every grid
/// buffer. Change detection compares the resulting matrices, so re-entrant
/// external updates that land on the same values cost nothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowSettings {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Light frustum field of view in degrees
    pub fov_deg: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 5.0, 5.0),
            look_at: Vec3::ZERO,
            fov_deg: 150.0,
            near: 0.5,
            far: 30.0,
        }
    }
}

impl ShadowSettings {
    /// View matrix of the light's camera.
    pub fn light_view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }

    /// Symmetric perspective projection of the light's camera (square
    /// shadow map, aspect 1).
    pub fn light_projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_deg.to_radians(), 1.0, self.near, self.far)
    }

    /// The combined world -> shadow-map texture matrix:
    /// `bias * projection * view`.
    ///
    /// The bias maps clip-space XY from [-1, 1] to texture [0, 1] with V
    /// flipped (texture rows grow downward); clip-space depth is already
    /// 0..1 under wgpu conventions and passes through.
    pub fn texture_matrix(&self) -> Mat4 {
        shadow_bias_matrix() * self.light_projection_matrix() * self.light_view_matrix()
    }
}

/// Clip-space to texture-space bias matrix for shadow lookups.
pub fn shadow_bias_matrix() -> Mat4 {
    Mat4::from_cols(
        Vec4::new(0.5, 0.0, 0.0, 0.0),
        Vec4::new(0.0, -0.5, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(0.5, 0.5, 0.0, 1.0),
    )
}

/// True when two shadow matrices differ beyond floating-point noise.
/// Used to decide whether to re-broadcast to the grid buffers.
pub fn matrices_differ(a: &Mat4, b: &Mat4) -> bool {
    !a.abs_diff_eq(*b, 1e-6)
}

/// The offscreen depth target the light renders into.
pub struct ShadowTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    /// Comparison sampler for `textureSampleCompareLevel` in the color pass
    pub sampler: wgpu::Sampler,
}

impl ShadowTarget {
    pub fn new(device: &wgpu::Device) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Shadow Depth Texture"),
            size: wgpu::Extent3d {
                width: DEPTH_TEXTURE_SIZE,
                height: DEPTH_TEXTURE_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Shadow Comparison Sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });
        Self {
            texture,
            view,
            sampler,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texture_matrix_idempotent() {
        let settings = ShadowSettings::default();
        let a = settings.texture_matrix();
        let b = settings.texture_matrix();
        assert!(!matrices_differ(&a, &b));
    }

    #[test]
    fn test_texture_matrix_tracks_parameters() {
        let a = ShadowSettings::default().texture_matrix();
        let moved = ShadowSettings {
            position: Vec3::new(1.0, 5.0, 5.0),
            ..Default::default()
        };
        assert!(matrices_differ(&a, &moved.texture_matrix()));
    }

    #[test]
    fn test_look_at_target_maps_to_texture_center() {
        // The point the light looks at sits on the frustum axis, so it must
        // land at UV (0.5, 0.5) with depth inside (0, 1).
        let settings = ShadowSettings::default();
        let m = settings.texture_matrix();
        let p = m * settings.look_at.extend(1.0);
        let uvw = p / p.w;
        assert!((uvw.x - 0.5).abs() < 1e-4);
        assert!((uvw.y - 0.5).abs() < 1e-4);
        assert!(uvw.z > 0.0 && uvw.z < 1.0);
    }

    #[test]
    fn test_bias_maps_clip_corners_to_uv() {
        let bias = shadow_bias_matrix();
        let bottom_left = bias * Vec4::new(-1.0, -1.0, 0.0, 1.0);
        assert!((bottom_left.x - 0.0).abs() < 1e-6);
        assert!((bottom_left.y - 1.0).abs() < 1e-6);
        let top_right = bias * Vec4::new(1.0, 1.0, 0.5, 1.0);
        assert!((top_right.x - 1.0).abs() < 1e-6);
        assert!((top_right.y - 0.0).abs() < 1e-6);
        assert!((top_right.z - 0.5).abs() < 1e-6);
    }
}
