pub mod command;
pub mod passthrough;
pub mod recorder;
pub mod session;

use crate::audio::frame::AudioFrame;
use crate::error::EngineError;

pub use command::{Command, Payload};
pub use passthrough::PassthroughEngine;
pub use recorder::RecordingEngine;
pub use session::{EngineSession, SessionState};

/// The DSP core the element drives. Only reached through the session lock.
pub trait EffectEngine: Send + 'static {
    /// Deliver one configuration or parameter command.
    fn command(&mut self, command: &Command) -> Result<(), EngineError>;

    /// Render `input` into `output`. The session sizes `output` to match `input`,
    /// but direct callers may not, so implementations must not assume it.
    fn process(&mut self, input: &AudioFrame, output: &mut AudioFrame);
}

impl<E: EffectEngine + ?Sized> EffectEngine for Box<E> {
    fn command(&mut self, command: &Command) -> Result<(), EngineError> {
        (**self).command(command)
    }

    fn process(&mut self, input: &AudioFrame, output: &mut AudioFrame) {
        (**self).process(input, output);
    }
}
