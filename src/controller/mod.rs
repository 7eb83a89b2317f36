// CONTROLLER: Input, interaction, physics, and update loop
pub mod animation;
pub mod camera_rig;
pub mod clock;
pub mod frame_loop;
pub mod input;
pub mod interaction;
pub mod physics;

pub use camera_rig::CameraRig;
pub use clock::{Clock, SteppedClock};
pub use frame_loop::{FrameLoop, FrameLoopSettings, LoopHandle};
pub use input::{InputEvent, InputState, MouseButton};
pub use interaction::{InteractionController, ZoneClick};
pub use physics::{PhysicsWorld, RigidBody};
