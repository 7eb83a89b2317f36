use glam::{Mat4, Vec2, Vec3, Vec4};

/// Half-line used for click picking
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

/// Perspective look-at camera
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 25.0, 30.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 75f32.to_radians(),
            aspect: width as f32 / height.max(1) as f32,
            z_near: 0.1,
            z_far: 200.0,
        }
    }

    pub fn look_at(&mut self, target: Vec3) {
        self.target = target;
    }

    /// Normalized view direction
    pub fn forward(&self) -> Vec3 {
        (self.target - self.eye).normalize_or_zero()
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or_zero()
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }

    /// Ray from the eye through a point in normalized device coordinates
    /// (x right, y up, both in [-1, 1])
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inverse = self.view_proj().inverse();
        let unproject = |z: f32| {
            let p = inverse * Vec4::new(ndc.x, ndc.y, z, 1.0);
            p.truncate() / p.w
        };
        let near = unproject(0.0);
        let far = unproject(1.0);
        Ray {
            origin: self.eye,
            direction: (far - near).normalize_or_zero(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_ray_follows_view_direction() {
        let mut camera = Camera::new(800, 600);
        camera.eye = Vec3::new(0.0, 10.0, 10.0);
        camera.look_at(Vec3::ZERO);
        let ray = camera.ray_from_ndc(Vec2::ZERO);
        assert!((ray.direction - camera.forward()).length() < 1e-4);
        assert_eq!(ray.origin, camera.eye);
    }

    #[test]
    fn right_is_horizontal_for_level_up_vector() {
        let mut camera = Camera::new(800, 600);
        camera.eye = Vec3::new(0.0, 5.0, -10.0);
        camera.look_at(Vec3::ZERO);
        let right = camera.right();
        assert!(right.y.abs() < 1e-6);
        // Looking toward +Z, right-handed: right points to -X
        assert!(right.x < -0.99);
    }

    #[test]
    fn ndc_edges_diverge_from_center() {
        let mut camera = Camera::new(800, 600);
        camera.eye = Vec3::new(0.0, 20.0, 0.1);
        camera.look_at(Vec3::ZERO);
        let left = camera.ray_from_ndc(Vec2::new(-1.0, 0.0));
        let right = camera.ray_from_ndc(Vec2::new(1.0, 0.0));
        assert!(left.direction.x < 0.0);
        assert!(right.direction.x > 0.0);
    }
}
