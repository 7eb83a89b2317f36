use glam::{Quat, Vec3};

use folio3d::controller::input::{DISTANCE_MAX, DISTANCE_MIN};
use folio3d::controller::{FrameLoop, InputEvent, MouseButton, SteppedClock};
use folio3d::model::{Camera, Scene};
use folio3d::view::{NullRenderer, Renderer};

const STEP: f64 = 1.0 / 60.0;

/// Keeps what it was asked to draw so ticks can be inspected afterwards
#[derive(Default)]
struct RecordingRenderer {
    frames: Vec<(Vec3, Quat, Vec3)>,
    size: (u32, u32),
    pixel_ratio: f32,
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, scene: &Scene, camera: &Camera) {
        self.frames
            .push((scene.avatar.position, scene.avatar.quaternion, camera.eye));
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.size = (width, height);
    }

    fn set_pixel_ratio(&mut self, ratio: f32) {
        self.pixel_ratio = ratio;
    }
}

fn new_loop() -> FrameLoop<SteppedClock> {
    FrameLoop::new(Scene::portfolio(), SteppedClock::new(STEP), 800, 600)
}

fn face(frame_loop: &mut FrameLoop<SteppedClock>, direction: Vec3) {
    frame_loop.camera.eye = Vec3::new(0.0, 10.0, 0.0);
    frame_loop.camera.look_at(Vec3::new(0.0, 10.0, 0.0) + direction * 10.0);
}

/// Straight above the projects zone, so the view center lands on it
fn look_down(frame_loop: &mut FrameLoop<SteppedClock>) {
    frame_loop.camera.eye = Vec3::new(0.0, 30.0, 0.01);
    frame_loop.camera.look_at(Vec3::ZERO);
}

#[test]
fn forward_key_moves_along_the_view() {
    let mut frame_loop = new_loop();
    face(&mut frame_loop, Vec3::Z);
    frame_loop
        .input
        .borrow_mut()
        .process_event(&InputEvent::KeyDown("KeyW".into()));

    frame_loop.tick(&mut NullRenderer::default());

    let velocity = frame_loop.player_body().velocity;
    assert!(velocity.x.abs() < 1e-4, "vx = {}", velocity.x);
    assert!((velocity.z - 5.0).abs() < 1e-4, "vz = {}", velocity.z);
}

#[test]
fn forward_with_the_initial_camera_heads_toward_negative_z() {
    // angle_y = 0 puts the eye on the +Z side of the avatar, so the view looks toward -Z
    let mut frame_loop = new_loop();
    frame_loop
        .input
        .borrow_mut()
        .process_event(&InputEvent::KeyDown("ArrowUp".into()));

    frame_loop.tick(&mut NullRenderer::default());

    let velocity = frame_loop.player_body().velocity;
    assert!((velocity.z + 5.0).abs() < 1e-3, "vz = {}", velocity.z);
}

#[test]
fn diagonal_keys_move_faster() {
    let mut frame_loop = new_loop();
    face(&mut frame_loop, Vec3::Z);
    {
        let mut input = frame_loop.input.borrow_mut();
        input.process_event(&InputEvent::KeyDown("KeyW".into()));
        input.process_event(&InputEvent::KeyDown("KeyD".into()));
    }

    frame_loop.tick(&mut NullRenderer::default());

    let velocity = frame_loop.player_body().velocity;
    let ground_speed = Vec3::new(velocity.x, 0.0, velocity.z).length();
    assert!((ground_speed - 5.0 * 2f32.sqrt()).abs() < 1e-3);
}

#[test]
fn avatar_matches_the_body_after_every_tick() {
    let mut frame_loop = new_loop();
    frame_loop
        .input
        .borrow_mut()
        .process_event(&InputEvent::KeyDown("KeyA".into()));

    let mut renderer = RecordingRenderer::default();
    for _ in 0..90 {
        frame_loop.tick(&mut renderer);
        let body = frame_loop.player_body();
        assert_eq!(frame_loop.scene.avatar.position, body.position);
        assert_eq!(frame_loop.scene.avatar.quaternion, body.quaternion);
    }

    // What reached the renderer is the synced pose
    let (last_position, last_rotation, _) = renderer.frames[renderer.frames.len() - 1];
    assert_eq!(last_position, frame_loop.player_body().position);
    assert_eq!(last_rotation, frame_loop.player_body().quaternion);
}

#[test]
fn avatar_lands_on_the_floor_and_rolls() {
    let mut frame_loop = new_loop();
    face(&mut frame_loop, Vec3::Z);
    let mut renderer = NullRenderer::default();

    // Let it fall first
    for _ in 0..120 {
        frame_loop.tick(&mut renderer);
    }
    let radius = frame_loop.scene.avatar.radius;
    assert!((frame_loop.scene.avatar.position.y - radius).abs() < 0.02);

    frame_loop
        .input
        .borrow_mut()
        .process_event(&InputEvent::KeyDown("KeyS".into()));
    let before = frame_loop.scene.avatar.quaternion;
    for _ in 0..30 {
        frame_loop.tick(&mut renderer);
    }
    assert_ne!(frame_loop.scene.avatar.quaternion, before);
}

#[test]
fn releasing_focus_stops_movement() {
    let mut frame_loop = new_loop();
    face(&mut frame_loop, Vec3::X);
    frame_loop
        .input
        .borrow_mut()
        .process_event(&InputEvent::KeyDown("KeyW".into()));
    frame_loop.tick(&mut NullRenderer::default());

    frame_loop.input.borrow_mut().process_event(&InputEvent::FocusLost);
    frame_loop.tick(&mut NullRenderer::default());

    let velocity = frame_loop.player_body().velocity;
    assert_eq!((velocity.x, velocity.z), (0.0, 0.0));
}

#[test]
fn wheel_zoom_is_clamped() {
    let frame_loop = new_loop();
    let mut input = frame_loop.input.borrow_mut();

    input.process_event(&InputEvent::MouseWheel { delta_y: 10_000.0 });
    assert_eq!(input.distance_target, DISTANCE_MAX);

    input.process_event(&InputEvent::MouseWheel { delta_y: -10_000.0 });
    assert_eq!(input.distance_target, DISTANCE_MIN);
}

#[test]
fn zooming_out_moves_the_settled_camera_away() {
    let mut frame_loop = new_loop();
    let mut renderer = NullRenderer::default();
    frame_loop
        .input
        .borrow_mut()
        .process_event(&InputEvent::MouseWheel { delta_y: 500.0 });
    assert!((frame_loop.input.borrow().distance_target - 25.0).abs() < 1e-4);

    for _ in 0..300 {
        frame_loop.tick(&mut renderer);
    }
    let input = frame_loop.input.borrow();
    let desired = frame_loop.camera_rig.desired_position(
        frame_loop.scene.avatar.position,
        input.angle_x,
        input.angle_y,
        input.distance_target,
    );
    // At the initial zoom the eye trails by about 4 units along +Z
    let offset = frame_loop.camera.eye - frame_loop.scene.avatar.position;
    assert!(offset.z > 6.0, "offset {offset}");
    assert!((frame_loop.camera.eye - desired).length() < 0.05);
}

#[test]
fn scene_time_follows_the_loop_clock() {
    let mut frame_loop = new_loop();
    let mut renderer = NullRenderer::default();
    for _ in 0..7 {
        frame_loop.tick(&mut renderer);
        assert_eq!(frame_loop.scene.time, frame_loop.now());
    }
    assert!((frame_loop.scene.time - 7.0 * STEP).abs() < 1e-9);
}

#[test]
fn camera_settles_on_the_orbit_position() {
    let mut frame_loop = new_loop();
    let mut renderer = NullRenderer::default();
    for _ in 0..300 {
        frame_loop.tick(&mut renderer);
    }

    let input = frame_loop.input.borrow();
    let desired = frame_loop.camera_rig.desired_position(
        frame_loop.scene.avatar.position,
        input.angle_x,
        input.angle_y,
        input.distance_target,
    );
    assert!((frame_loop.camera.eye - desired).length() < 0.05);
    assert_eq!(frame_loop.camera.target, frame_loop.scene.avatar.position);
}

#[test]
fn click_on_empty_space_does_nothing() {
    let mut frame_loop = new_loop();
    look_down(&mut frame_loop);

    assert!(frame_loop.click(MouseButton::Left, 0.0, 0.0).is_none());
    assert!(frame_loop.scene.zones.iter().all(|z| !z.is_highlighted()));
    assert!(frame_loop.interaction.last_click.is_none());
}

#[test]
fn click_on_a_zone_highlights_it_until_the_animation_ends() {
    let mut frame_loop = new_loop();
    look_down(&mut frame_loop);

    let hit = frame_loop
        .click(MouseButton::Left, 400.0, 300.0)
        .expect("view center is on the projects zone");
    assert_eq!(hit.tag, "projects");
    assert_eq!(hit.message, "Check out the projects I've built!");
    assert!(frame_loop.scene.zones[hit.index].is_highlighted());

    let mut renderer = NullRenderer::default();
    for _ in 0..60 {
        frame_loop.tick(&mut renderer);
    }
    assert!(!frame_loop.scene.zones[hit.index].is_highlighted());
}

#[test]
fn right_clicks_and_drags_do_not_pick() {
    let mut frame_loop = new_loop();
    look_down(&mut frame_loop);

    assert!(frame_loop.click(MouseButton::Right, 400.0, 300.0).is_none());

    frame_loop.input.borrow_mut().process_event(&InputEvent::MouseDown {
        button: MouseButton::Left,
        x: 400.0,
        y: 300.0,
    });
    assert!(frame_loop.click(MouseButton::Left, 400.0, 300.0).is_none());
}

#[test]
fn run_stops_once_cancelled() {
    let mut frame_loop = new_loop();
    let handle = frame_loop.handle();
    let mut renderer = RecordingRenderer::default();

    frame_loop.run(&mut renderer, |frame_loop| {
        if frame_loop.frames() == 5 {
            handle.cancel();
        }
    });

    assert_eq!(renderer.frames.len(), 5);
    assert_eq!(frame_loop.frames(), 5);
}

#[test]
fn resize_caps_the_pixel_ratio() {
    let mut frame_loop = new_loop();
    let mut renderer = RecordingRenderer::default();

    frame_loop.resize(1024, 768, 3.0, &mut renderer);
    assert_eq!(renderer.size, (1024, 768));
    assert_eq!(renderer.pixel_ratio, 2.0);
    assert!((frame_loop.camera.aspect - 1024.0 / 768.0).abs() < 1e-6);
    assert_eq!(frame_loop.viewport, (1024, 768));

    frame_loop.resize(640, 480, 1.5, &mut renderer);
    assert_eq!(renderer.pixel_ratio, 1.5);
}
