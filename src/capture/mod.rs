mod orchestrator;
mod render_point;
mod sink;

pub use orchestrator::{FrameOrchestrator, MarkSlot, RenderState, TickPlan};
pub use render_point::RenderPoint;
pub use sink::{FrameSink, PngSink};
