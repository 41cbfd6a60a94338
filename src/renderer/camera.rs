//! Third-person follow camera

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

use super::vertex::colors;

/// Camera position relative to the followed target
pub const OFFSET: Vec3 = Vec3::new(0.0, 5.0, 10.0);
/// The camera aims this far above the target's feet
pub const LOOK_HEIGHT: f32 = 2.0;
/// Fraction of the remaining distance covered per 60 Hz frame
pub const LERP: f32 = 0.1;
/// Exponential-squared fog density
pub const FOG_DENSITY: f32 = 0.02;

const REFERENCE_FPS: f32 = 60.0;

/// Uniform block shared with `shader.wgsl`
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub fog_color: [f32; 4],
    /// x = density, y = 1 when enabled
    pub fog: [f32; 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct FollowCamera {
    pub position: Vec3,
    pub look_at: Vec3,
    /// Vertical field of view in radians
    pub fov_y: f32,
    pub near: f32,
    pub far: f32,
}

impl FollowCamera {
    /// Camera already settled behind `target`
    pub fn new(target: Vec3) -> Self {
        Self {
            position: target + OFFSET,
            look_at: target + Vec3::Y * LOOK_HEIGHT,
            fov_y: 75f32.to_radians(),
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Jump straight to the resting pose (restart, reduced motion)
    pub fn snap(&mut self, target: Vec3) {
        self.position = target + OFFSET;
        self.look_at = target + Vec3::Y * LOOK_HEIGHT;
    }

    /// Ease toward the resting pose. The blend is normalised so that a
    /// 60 Hz frame covers `LERP` of the gap regardless of the real rate.
    pub fn update(&mut self, target: Vec3, dt: f32) {
        let frames = (dt * REFERENCE_FPS).max(0.0);
        let t = 1.0 - (1.0 - LERP).powf(frames);
        self.position = self.position.lerp(target + OFFSET, t);
        // Only the position is smoothed; the aim tracks the target exactly
        self.look_at = target + Vec3::Y * LOOK_HEIGHT;
    }

    pub fn view_proj(&self, aspect: f32) -> Mat4 {
        let aspect = if aspect.is_finite() && aspect > 0.0 { aspect } else { 1.0 };
        let proj = Mat4::perspective_rh(self.fov_y, aspect, self.near, self.far);
        let view = Mat4::look_at_rh(self.position, self.look_at, Vec3::Y);
        proj * view
    }

    pub fn uniform(&self, aspect: f32, fog: bool) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj(aspect).to_cols_array_2d(),
            camera_pos: self.position.extend(1.0).to_array(),
            fog_color: colors::BACKGROUND,
            fog: [FOG_DENSITY, if fog { 1.0 } else { 0.0 }, 0.0, 0.0],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_settled() {
        let target = Vec3::new(3.0, 0.0, -4.0);
        let cam = FollowCamera::new(target);
        assert_eq!(cam.position, target + OFFSET);
        assert_eq!(cam.look_at, Vec3::new(3.0, 2.0, -4.0));
    }

    #[test]
    fn test_one_frame_covers_lerp() {
        let mut cam = FollowCamera::new(Vec3::ZERO);
        cam.update(Vec3::new(10.0, 0.0, 0.0), 1.0 / 60.0);
        assert!((cam.position.x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_converges_on_target() {
        let mut cam = FollowCamera::new(Vec3::ZERO);
        let target = Vec3::new(-20.0, 0.0, 15.0);
        for _ in 0..300 {
            cam.update(target, 1.0 / 60.0);
        }
        assert!(cam.position.distance(target + OFFSET) < 1e-3);
    }

    #[test]
    fn test_zero_dt_holds_position() {
        let mut cam = FollowCamera::new(Vec3::ZERO);
        cam.update(Vec3::new(5.0, 0.0, 5.0), 0.0);
        assert_eq!(cam.position, OFFSET);
    }

    #[test]
    fn test_look_point_projects_to_center() {
        let cam = FollowCamera::new(Vec3::new(7.0, 0.0, 2.0));
        let clip = cam.view_proj(16.0 / 9.0) * cam.look_at.extend(1.0);
        let ndc = clip.truncate() / clip.w;
        assert!(ndc.x.abs() < 1e-4);
        assert!(ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn test_uniform_fog_flag() {
        let cam = FollowCamera::new(Vec3::ZERO);
        assert_eq!(cam.uniform(1.0, true).fog[1], 1.0);
        assert_eq!(cam.uniform(1.0, false).fog[1], 0.0);
        assert_eq!(cam.uniform(1.0, true).fog[0], FOG_DENSITY);
    }
}
