// MODEL: Scene content, camera, and zones
pub mod camera;
pub mod scene;
pub mod zone;

pub use camera::{Camera, Ray};
pub use scene::{Avatar, Block, Scene};
pub use zone::{message_for_tag, Zone};
