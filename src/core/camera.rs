//! First-person camera for heightfield rendering

use crate::core::types::{Vec2, Vec3};

/// Maximum pitch magnitude in radians (just under 90 degrees).
/// The projection degenerates when looking straight up or down.
pub const MAX_PITCH: f32 = 1.55;

/// Minimum and maximum horizontal field of view in radians
pub const MIN_FOV: f32 = 0.1;
pub const MAX_FOV: f32 = 3.0;

/// Camera with position, orientation, and field of view.
///
/// World coordinates are x/y on the ground plane with z up; `yaw` rotates in
/// the ground plane and `pitch` tilts the view vertically. Pure state: the
/// camera has no behavior beyond clamping its own fields.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    /// World position (z is height above the ground plane)
    pub position: Vec3,
    /// Heading in radians, counter-clockwise in the ground plane
    pub yaw: f32,
    /// Vertical tilt in radians, clamped to [`MAX_PITCH`]
    pub pitch: f32,
    /// Horizontal field of view in radians
    pub fov: f32,
}

impl Camera {
    /// Create a new camera at the given position, looking along +x.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            yaw: 0.0,
            pitch: 0.0,
            fov: std::f32::consts::FRAC_PI_3,
        }
    }

    /// Set the full camera pose. Pitch is clamped, yaw is taken as-is.
    pub fn set_pose(&mut self, x: f32, y: f32, z: f32, yaw: f32, pitch: f32) {
        self.position = Vec3::new(x, y, z);
        self.yaw = yaw;
        self.pitch = pitch.clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Set the pose from the host boundary encoding (milliradian angles).
    pub fn set_pose_millirad(&mut self, x: f32, y: f32, z: f32, yaw_mrad: i32, pitch_mrad: i32) {
        self.set_pose(x, y, z, yaw_mrad as f32 / 1000.0, pitch_mrad as f32 / 1000.0);
    }

    /// Set the horizontal field of view, clamped to a sane range.
    pub fn set_fov(&mut self, fov: f32) {
        self.fov = fov.clamp(MIN_FOV, MAX_FOV);
    }

    /// Unit forward direction projected onto the ground plane.
    pub fn forward(&self) -> Vec2 {
        Vec2::new(self.yaw.cos(), self.yaw.sin())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 50.0))
    }
}
