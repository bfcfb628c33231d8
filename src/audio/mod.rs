pub mod frame;
pub mod processor;

pub use frame::{AudioFrame, FramePool};
pub use processor::{BufferFlags, StreamProcessor, Transform};
