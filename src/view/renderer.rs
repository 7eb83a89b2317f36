use crate::model::{Camera, Scene};

/// Draws a scene from a camera. The frame loop owns the one in use.
pub trait Renderer {
    fn render(&mut self, scene: &Scene, camera: &Camera);
    fn set_size(&mut self, width: u32, height: u32);
    fn set_pixel_ratio(&mut self, ratio: f32);
}

/// Renderer that draws nothing; used for headless runs
#[derive(Debug, Default)]
pub struct NullRenderer {
    pub frames: u64,
    pub size: (u32, u32),
    pub pixel_ratio: f32,
}

impl Renderer for NullRenderer {
    fn render(&mut self, _scene: &Scene, _camera: &Camera) {
        self.frames += 1;
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }
}
