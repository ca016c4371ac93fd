mod frame;
mod readback;
#[allow(clippy::module_inception)]
mod renderer;

pub use frame::FrameTarget;
pub use renderer::Renderer;
