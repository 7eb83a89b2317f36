use glam::Vec3;

use crate::controller::input::InputState;
use crate::model::Camera;

/// Orbits the camera around a target and eases it toward the orbit position
pub struct CameraRig {
    /// Added on top of the orbit height for a top-down bias
    pub camera_height: f32,
    /// The eye never drops below target.y + this
    pub min_height_offset: f32,
    /// Fraction of the remaining distance covered per tick
    pub smoothing: f32,
}

impl Default for CameraRig {
    fn default() -> Self {
        Self::new()
    }
}

impl CameraRig {
    pub fn new() -> Self {
        Self {
            camera_height: 20.0,
            min_height_offset: 10.0,
            smoothing: 0.1,
        }
    }

    /// Point on the orbit sphere around `target`
    pub fn desired_position(&self, target: Vec3, angle_x: f32, angle_y: f32, distance: f32) -> Vec3 {
        let x = target.x + angle_y.sin() * angle_x.cos() * distance;
        let y = target.y + self.camera_height + angle_x.sin() * distance;
        let z = target.z + angle_y.cos() * angle_x.cos() * distance;
        Vec3::new(x, y.max(target.y + self.min_height_offset), z)
    }

    /// One smoothing step toward the orbit position, then re-aim at the target.
    /// The step is per tick, not scaled by frame time.
    pub fn update(&self, camera: &mut Camera, target: Vec3, input: &InputState) {
        let desired = self.desired_position(target, input.angle_x, input.angle_y, input.distance_target);
        camera.eye += (desired - camera.eye) * self.smoothing;
        camera.look_at(target);
    }
}
