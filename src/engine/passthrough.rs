use log::trace;
use std::collections::BTreeMap;

use crate::audio::frame::AudioFrame;
use crate::engine::{Command, EffectEngine, Payload};
use crate::error::EngineError;

/// Engine stand-in for hosts built without the DSP core: honours the command
/// protocol, remembers the last value per opcode and copies audio through.
#[derive(Debug, Default)]
pub struct PassthroughEngine {
    initialized: bool,
    sample_rate: Option<u32>,
    enabled: bool,
    params: BTreeMap<i32, Payload>,
    frames_processed: u64,
}

impl PassthroughEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn sample_rate(&self) -> Option<u32> {
        self.sample_rate
    }

    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn param(&self, opcode: i32) -> Option<&Payload> {
        self.params.get(&opcode)
    }

    pub const fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}

impl EffectEngine for PassthroughEngine {
    fn command(&mut self, command: &Command) -> Result<(), EngineError> {
        trace!("passthrough engine <- {command}");
        match command {
            Command::Init => {
                self.initialized = true;
                self.sample_rate = None;
            }
            Command::SetConfig { sample_rate } => {
                if !self.initialized {
                    return Err(EngineError::new(command.code(), "SET_CONFIG before INIT"));
                }
                self.sample_rate = Some(*sample_rate);
            }
            Command::Reset => self.frames_processed = 0,
            Command::Enable => self.enabled = true,
            Command::SetParam { opcode, payload } => {
                self.params.insert(*opcode, *payload);
            }
        }
        Ok(())
    }

    fn process(&mut self, input: &AudioFrame, output: &mut AudioFrame) {
        for (dst, src) in output.samples_mut().iter_mut().zip(input.samples()) {
            *dst = *src;
        }
        self.frames_processed += input.frame_count() as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_configuration_and_params() {
        let mut engine = PassthroughEngine::new();
        assert!(
            engine
                .command(&Command::SetConfig { sample_rate: 44100 })
                .is_err()
        );

        engine.command(&Command::Init).unwrap();
        engine
            .command(&Command::SetConfig { sample_rate: 44100 })
            .unwrap();
        engine.command(&Command::Enable).unwrap();
        engine
            .command(&Command::SetParam {
                opcode: 128,
                payload: Payload::Int16(8),
            })
            .unwrap();

        assert_eq!(engine.sample_rate(), Some(44100));
        assert!(engine.is_enabled());
        assert_eq!(engine.param(128), Some(&Payload::Int16(8)));
    }

    #[test]
    fn copies_audio_and_resets_counter() {
        let mut engine = PassthroughEngine::new();
        let input = AudioFrame::from_interleaved(vec![0.1, 0.2, 0.3, 0.4]).unwrap();
        let mut output = AudioFrame::with_frames(2);
        engine.process(&input, &mut output);
        assert_eq!(output.samples(), input.samples());
        assert_eq!(engine.frames_processed(), 2);

        engine.command(&Command::Reset).unwrap();
        assert_eq!(engine.frames_processed(), 0);
    }

    #[test]
    fn mismatched_frames_copy_the_overlap() {
        let mut engine = PassthroughEngine::new();
        let input = AudioFrame::from_interleaved(vec![0.1, 0.2, 0.3, 0.4]).unwrap();

        let mut short = AudioFrame::with_frames(1);
        engine.process(&input, &mut short);
        assert_eq!(short.samples(), &[0.1, 0.2]);

        let mut long = AudioFrame::with_frames(3);
        engine.process(&input, &mut long);
        assert_eq!(long.samples(), &[0.1, 0.2, 0.3, 0.4, 0.0, 0.0]);
    }
}
