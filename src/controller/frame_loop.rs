use std::cell::{Cell, RefCell};
use std::rc::Rc;

use glam::Vec3;

use crate::controller::camera_rig::CameraRig;
use crate::controller::clock::Clock;
use crate::controller::input::{InputState, MouseButton};
use crate::controller::interaction::{InteractionController, ZoneClick};
use crate::controller::physics::{BodyId, PhysicsWorld, RigidBody};
use crate::model::scene::{PLAYER_MASS, PLAYER_RADIUS, PLAYER_START};
use crate::model::{Camera, Scene};
use crate::view::Renderer;

/// Tunables for the per-frame update
#[derive(Debug, Clone)]
pub struct FrameLoopSettings {
    /// Ground speed contributed by each held direction key
    pub force: f32,
    pub fixed_step: f32,
    pub max_sub_steps: u32,
    pub max_pixel_ratio: f32,
}

impl Default for FrameLoopSettings {
    fn default() -> Self {
        Self {
            force: 5.0,
            fixed_step: 1.0 / 60.0,
            max_sub_steps: 3,
            max_pixel_ratio: 2.0,
        }
    }
}

/// Shared cancellation flag for the loop
#[derive(Debug, Clone, Default)]
pub struct LoopHandle {
    cancelled: Rc<Cell<bool>>,
}

impl LoopHandle {
    pub fn cancel(&self) {
        self.cancelled.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

/// Ground-plane velocity for the held keys, relative to where the camera looks.
/// Keys add up without renormalization, so diagonals are faster.
pub fn movement_velocity(camera: &Camera, input: &InputState, force: f32) -> Vec3 {
    let direction = camera.forward();
    let right = camera.right();
    let forward_dir = Vec3::new(direction.x, 0.0, direction.z).normalize_or_zero();
    let right_dir = Vec3::new(right.x, 0.0, right.z).normalize_or_zero();

    let mut movement = Vec3::ZERO;
    if input.forward {
        movement += forward_dir * force;
    }
    if input.backward {
        movement -= forward_dir * force;
    }
    if input.left {
        movement -= right_dir * force;
    }
    if input.right {
        movement += right_dir * force;
    }
    movement
}

/// Application state and per-frame update
pub struct FrameLoop<C: Clock> {
    pub input: Rc<RefCell<InputState>>,
    pub physics: PhysicsWorld,
    pub player: BodyId,
    pub scene: Scene,
    pub camera: Camera,
    pub camera_rig: CameraRig,
    pub interaction: InteractionController,
    pub settings: FrameLoopSettings,
    /// Canvas size in CSS pixels, used for click mapping
    pub viewport: (u32, u32),
    clock: C,
    previous_time: f64,
    now: f64,
    frames: u64,
    handle: LoopHandle,
}

impl<C: Clock> FrameLoop<C> {
    pub fn new(scene: Scene, clock: C, width: u32, height: u32) -> Self {
        let mut physics = PhysicsWorld::new();
        physics.add_body(RigidBody::ground());
        let player = physics.add_body(RigidBody::sphere(PLAYER_RADIUS, PLAYER_MASS, PLAYER_START));

        Self {
            input: Rc::new(RefCell::new(InputState::new())),
            physics,
            player,
            scene,
            camera: Camera::new(width, height),
            camera_rig: CameraRig::new(),
            interaction: InteractionController::new(),
            settings: FrameLoopSettings::default(),
            viewport: (width, height),
            clock,
            previous_time: 0.0,
            now: 0.0,
            frames: 0,
            handle: LoopHandle::default(),
        }
    }

    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Clock reading at the start of the latest tick
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn player_body(&self) -> &RigidBody {
        self.physics.body(self.player)
    }

    /// One frame: input → physics → avatar sync → camera → render
    pub fn tick(&mut self, renderer: &mut dyn Renderer) {
        let now = self.clock.elapsed_time();
        let delta = now - self.previous_time;
        self.previous_time = now;
        self.now = now;

        let movement = movement_velocity(&self.camera, &self.input.borrow(), self.settings.force);
        {
            let body = self.physics.body_mut(self.player);
            body.velocity.x = movement.x;
            body.velocity.z = movement.z;
        }

        self.physics
            .step(self.settings.fixed_step, delta as f32, self.settings.max_sub_steps);
        tracing::trace!(delta, sub_steps = self.physics.last_sub_steps(), "physics stepped");

        let body = self.physics.body(self.player);
        self.scene.avatar.position = body.position;
        self.scene.avatar.quaternion = body.quaternion;

        self.scene.animate_zones(now);

        self.camera_rig
            .update(&mut self.camera, self.scene.avatar.position, &self.input.borrow());

        renderer.render(&self.scene, &self.camera);
        self.frames += 1;
    }

    /// Tick until the loop handle is cancelled. `yield_fn` runs between frames
    /// and stands in for the display's scheduling.
    pub fn run(&mut self, renderer: &mut dyn Renderer, mut yield_fn: impl FnMut(&mut Self)) {
        while !self.handle.is_cancelled() {
            self.tick(renderer);
            yield_fn(self);
        }
        tracing::info!(frames = self.frames, "frame loop stopped");
    }

    pub fn resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32, renderer: &mut dyn Renderer) {
        tracing::debug!(width, height, device_pixel_ratio, "resize");
        self.viewport = (width, height);
        self.camera.set_aspect(width, height);
        renderer.set_size(width, height);
        renderer.set_pixel_ratio(device_pixel_ratio.min(self.settings.max_pixel_ratio));
    }

    pub fn click(&mut self, button: MouseButton, x: f32, y: f32) -> Option<ZoneClick> {
        let input = self.input.borrow();
        self.interaction.on_click(
            button,
            x,
            y,
            self.viewport,
            &input,
            &self.camera,
            &mut self.scene.zones,
            self.now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera_facing(direction: Vec3) -> Camera {
        let mut camera = Camera::new(800, 600);
        camera.eye = Vec3::new(0.0, 10.0, 0.0) - direction * 10.0;
        camera.look_at(Vec3::ZERO);
        camera
    }

    #[test]
    fn forward_follows_the_view_on_the_ground_plane() {
        let camera = camera_facing(Vec3::Z);
        let mut input = InputState::new();
        input.forward = true;
        let v = movement_velocity(&camera, &input, 5.0);
        assert!(v.x.abs() < 1e-5);
        assert!((v.z - 5.0).abs() < 1e-5);
        assert_eq!(v.y, 0.0);
    }

    #[test]
    fn diagonal_is_not_renormalized() {
        let camera = camera_facing(Vec3::Z);
        let mut input = InputState::new();
        input.forward = true;
        input.right = true;
        let v = movement_velocity(&camera, &input, 5.0);
        assert!((v.length() - 5.0 * 2f32.sqrt()).abs() < 1e-4);
    }

    #[test]
    fn opposite_keys_cancel() {
        let camera = camera_facing(Vec3::X);
        let mut input = InputState::new();
        input.left = true;
        input.right = true;
        assert!(movement_velocity(&camera, &input, 5.0).length() < 1e-5);
    }

    #[test]
    fn cancelled_handle_is_shared() {
        let handle = LoopHandle::default();
        let other = handle.clone();
        other.cancel();
        assert!(handle.is_cancelled());
    }
}
