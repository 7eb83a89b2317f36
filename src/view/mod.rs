// VIEW: Rendering and graphics
pub mod gpu_init;
pub mod render;
pub mod renderer;

pub use gpu_init::GpuContext;
pub use render::SceneRenderer;
pub use renderer::{NullRenderer, Renderer};
