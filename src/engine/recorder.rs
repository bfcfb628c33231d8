use crossbeam::channel::{Receiver, Sender, unbounded};

use crate::audio::frame::AudioFrame;
use crate::engine::{Command, EffectEngine};
use crate::error::EngineError;

/// Engine that accepts every command and forwards a copy to a channel.
/// Audio is left untouched.
pub struct RecordingEngine {
    tx: Sender<Command>,
}

impl RecordingEngine {
    pub fn new() -> (Self, Receiver<Command>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl EffectEngine for RecordingEngine {
    fn command(&mut self, command: &Command) -> Result<(), EngineError> {
        // a dropped receiver just means nobody is listening anymore
        let _ = self.tx.send(*command);
        Ok(())
    }

    fn process(&mut self, _input: &AudioFrame, _output: &mut AudioFrame) {}
}
